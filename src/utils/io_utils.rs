use crate::utils::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffered writer to `path`, or to stdout when no path is given
pub fn create_output_writer(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write + Send>>> {
    let inner: Box<dyn Write + Send> = match path {
        Some(path) => Box::new(
            File::create(path)
                .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?,
        ),
        None => Box::new(io::stdout()),
    };
    Ok(BufWriter::new(inner))
}
