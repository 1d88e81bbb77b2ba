use super::alphabet::{is_alignment_symbol, GAP};
use super::{HmmState, ProfileError};

/// Training alignment: a non-empty set of sequences sharing one column count
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    sequences: Vec<Vec<u8>>,
}

/// Per-column state labels of one training sequence; `None` marks a gap in an
/// unmarked column, which contributes no state.
pub type StatePath = Vec<Option<HmmState>>;

impl Alignment {
    pub fn new(sequences: Vec<Vec<u8>>) -> Result<Self, ProfileError> {
        let width = match sequences.first() {
            Some(first) => first.len(),
            None => {
                return Err(ProfileError::MalformedAlignment(
                    "alignment contains no sequences".to_string(),
                ))
            }
        };

        for (seq_index, seq) in sequences.iter().enumerate() {
            if seq.len() != width {
                return Err(ProfileError::MalformedAlignment(format!(
                    "sequence {} has {} columns, expected {}",
                    seq_index + 1,
                    seq.len(),
                    width
                )));
            }
            if let Some(column) = seq.iter().position(|&s| !is_alignment_symbol(s)) {
                log::debug!("Sequence {} has an invalid symbol", seq_index + 1);
                return Err(ProfileError::UnknownSymbol {
                    symbol: seq[column] as char,
                    position: column,
                });
            }
        }

        Ok(Self { sequences })
    }

    pub fn sequences(&self) -> &[Vec<u8>] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn width(&self) -> usize {
        self.sequences[0].len()
    }
}

/// Marks the columns whose gap fraction is strictly below `alpha`. Marked
/// columns become Match/Delete positions of the model, the rest Insert.
pub fn mark_columns(alignment: &Alignment, alpha: f32) -> Vec<bool> {
    let mut gap_counts = vec![0usize; alignment.width()];
    for seq in alignment.sequences() {
        for (column, &symbol) in seq.iter().enumerate() {
            if symbol == GAP {
                gap_counts[column] += 1;
            }
        }
    }

    let num_sequences = alignment.num_sequences() as f32;
    gap_counts
        .into_iter()
        .map(|count| (count as f32 / num_sequences) < alpha)
        .collect()
}

/// Number of model positions implied by a column marking, including the
/// silent begin position 0
pub fn model_length(marked: &[bool]) -> usize {
    marked.iter().filter(|&&m| m).count() + 1
}

/// Labels every column of `seq` and appends the Match sentinel standing for
/// the transition into the end state.
pub fn state_path(seq: &[u8], marked: &[bool]) -> StatePath {
    debug_assert_eq!(seq.len(), marked.len());
    seq.iter()
        .zip(marked)
        .map(|(&symbol, &is_marked)| match (is_marked, symbol == GAP) {
            (true, true) => Some(HmmState::Delete),
            (true, false) => Some(HmmState::Match),
            (false, true) => None,
            (false, false) => Some(HmmState::Insert),
        })
        .chain(std::iter::once(Some(HmmState::Match)))
        .collect()
}
