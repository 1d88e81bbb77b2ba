//! Viterbi alignment of a query sequence against a profile.
//!
//! The lattice has one row per (position, state) pair, `3 * N + 1` rows in
//! total: row `i` is position `i / 3` in state `i % 3`, and the final row is
//! the silent end state. Column `j` means the first `j` query residues have
//! been consumed. Rows 0 and 1 (begin state and the nonexistent Delete 0) and
//! column 0 are boundary cells, all at negative infinity except the origin.

use super::alphabet::amino_acid_index;
use super::state::states_to_string;
use super::{HmmState, Profile, ProfileError};

/// Added to probabilities before taking logarithms so zero entries stay finite
pub const EPSILON: f32 = 1e-20;

/// Predecessor states in the order they are compared; the first best wins ties
const PREDECESSOR_ORDER: [HmmState; 3] = [HmmState::Insert, HmmState::Delete, HmmState::Match];

#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiAlignment {
    /// Query residues, with `-` for every Delete state
    pub aligned: String,
    pub states: Vec<HmmState>,
    /// Log-probability of the best path
    pub score: f32,
}

impl ViterbiAlignment {
    pub fn state_string(&self) -> String {
        states_to_string(&self.states)
    }
}

/// Log-probability of the best path of `query` through `profile`
pub fn score_query(profile: &Profile, query: &[u8]) -> Result<f32, ProfileError> {
    let encoded = encode_query(query)?;
    let score = Lattice::fill(profile, &encoded)?.final_score();
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ProfileError::NoViablePath)
    }
}

/// Best path of `query` through `profile` together with the aligned query
pub fn align_query(profile: &Profile, query: &[u8]) -> Result<ViterbiAlignment, ProfileError> {
    let encoded = encode_query(query)?;
    let lattice = Lattice::fill(profile, &encoded)?;

    let score = lattice.final_score();
    if !score.is_finite() {
        return Err(ProfileError::NoViablePath);
    }

    let states = lattice.traceback();
    let mut residues = query.iter();
    let mut aligned = String::with_capacity(states.len());
    for state in &states {
        if state.emits() {
            let residue = residues.next().ok_or(ProfileError::NoViablePath)?;
            aligned.push(*residue as char);
        } else {
            aligned.push('-');
        }
    }
    if residues.next().is_some() {
        return Err(ProfileError::NoViablePath);
    }

    log::trace!(
        "Aligned {} residues over {} states, score {:.3}",
        query.len(),
        states.len(),
        score
    );

    Ok(ViterbiAlignment {
        aligned,
        states,
        score,
    })
}

fn encode_query(query: &[u8]) -> Result<Vec<usize>, ProfileError> {
    if query.is_empty() {
        return Err(ProfileError::EmptyQuery);
    }
    query
        .iter()
        .enumerate()
        .map(|(position, &symbol)| {
            amino_acid_index(symbol).ok_or(ProfileError::UnknownSymbol {
                symbol: symbol as char,
                position,
            })
        })
        .collect()
}

struct Lattice {
    num_cols: usize,
    scores: Vec<f32>,
    backpointers: Vec<(usize, usize)>,
}

impl Lattice {
    fn fill(profile: &Profile, query: &[usize]) -> Result<Self, ProfileError> {
        let end_row = 3 * profile.num_positions();
        let num_cols = query.len() + 1;
        let num_cells = (end_row + 1) * num_cols;

        let mut lattice = Lattice {
            num_cols,
            scores: vec![f32::NEG_INFINITY; num_cells],
            backpointers: vec![(0, 0); num_cells],
        };
        lattice.scores[0] = 0.0;

        for row in 2..=end_row {
            let position = row / 3;
            let state = HmmState::from_ordinal(row % 3);
            let is_end = row == end_row;

            // Insert states loop on their own position, the others advance from the previous one
            let pred_position = match state {
                HmmState::Insert => position,
                _ => position - 1,
            };
            let emissions = match state {
                HmmState::Match if !is_end => Some(profile.match_emissions(position).ok_or(
                    ProfileError::UndefinedEmission {
                        state,
                        position,
                    },
                )?),
                HmmState::Insert => Some(profile.insert_emissions(position)),
                _ => None,
            };
            let col_offset = usize::from(emissions.is_some());

            let log_transitions = PREDECESSOR_ORDER.map(|pred_state| {
                (profile.transition(pred_position, pred_state, state) + EPSILON).ln()
            });

            for col in 1..num_cols {
                let emission = emissions.map_or(0.0, |row| (row[query[col - 1]] + EPSILON).ln());
                let pred_col = col - col_offset;

                let mut best_score = f32::NEG_INFINITY;
                let mut best_cell = (0, 0);
                for (pred_state, log_transition) in PREDECESSOR_ORDER.iter().zip(log_transitions) {
                    let pred_row = 3 * pred_position + pred_state.ordinal();
                    let candidate = lattice.score(pred_row, pred_col) + log_transition;
                    if candidate > best_score {
                        best_score = candidate;
                        best_cell = (pred_row, pred_col);
                    }
                }

                let index = lattice.index(row, col);
                lattice.scores[index] = emission + best_score;
                lattice.backpointers[index] = best_cell;
            }
        }

        Ok(lattice)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.num_cols + col
    }

    #[inline]
    fn score(&self, row: usize, col: usize) -> f32 {
        self.scores[self.index(row, col)]
    }

    fn final_score(&self) -> f32 {
        self.scores[self.scores.len() - 1]
    }

    /// States of the best path, excluding the silent begin and end states
    fn traceback(&self) -> Vec<HmmState> {
        let mut states = Vec::new();
        let (mut row, mut col) = self.backpointers[self.backpointers.len() - 1];
        while row != 0 && col != 0 {
            states.push(HmmState::from_ordinal(row % 3));
            (row, col) = self.backpointers[self.index(row, col)];
        }
        states.reverse();
        states
    }
}
