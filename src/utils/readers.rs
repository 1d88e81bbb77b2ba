use super::Result;
use crate::hmm::{Alignment, Profile};
use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// Opens a plain or gzip-compressed (`.gz`, `.gzip`) input file
pub fn open_input_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

pub fn fasta_records(path: &Path) -> Result<impl Iterator<Item = Result<FastaRecord>>> {
    let reader = fasta::Reader::new(open_input_reader(path)?);
    let path_str = path.display().to_string();
    Ok(reader.records().map(move |result| {
        let record =
            result.map_err(|e| format!("FASTA parsing error in {}: {}", path_str, e))?;
        Ok(FastaRecord {
            id: record.id().to_string(),
            seq: record.seq().to_vec(),
        })
    }))
}

pub fn read_alignment(path: &Path) -> Result<Alignment> {
    let sequences = fasta_records(path)?
        .map(|record| record.map(|r| r.seq))
        .collect::<Result<Vec<_>>>()?;
    if sequences.is_empty() {
        return Err(format!("No sequences found in {}", path.display()));
    }
    log::debug!(
        "Read {} aligned sequences from {}",
        sequences.len(),
        path.display()
    );
    Alignment::new(sequences).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn read_profile(path: &Path) -> Result<Profile> {
    let reader = open_input_reader(path)?;
    let profile = Profile::from_reader(reader).map_err(|e| format!("{}: {}", path.display(), e))?;
    log::debug!(
        "Loaded model with {} positions from {}",
        profile.num_positions(),
        path.display()
    );
    Ok(profile)
}
