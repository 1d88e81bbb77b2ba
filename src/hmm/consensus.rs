use super::alphabet::amino_acid_symbol;
use super::state::states_to_string;
use super::{HmmState, Profile, ProfileError};
use crate::utils::{argmax, argmax_by};

pub const DEFAULT_MAX_INSERT_RUN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusParams {
    /// Longest stretch of consecutive Insert states before Insert stops being a candidate
    pub max_insert_run: usize,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            max_insert_run: DEFAULT_MAX_INSERT_RUN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consensus {
    /// Most probable residue of every Match and Insert state, `-` for Delete
    pub sequence: String,
    pub states: Vec<HmmState>,
}

impl Consensus {
    pub fn state_string(&self) -> String {
        states_to_string(&self.states)
    }
}

/// Greedy walk from the begin state following the most probable transition.
///
/// Staying in an Insert state is weighted by `p^k`, `k` being the length of
/// the current Insert run, so long runs become progressively less attractive.
/// Every Match and Delete advances one position and the walk stops once it
/// leaves the last position.
pub fn generate_consensus(
    profile: &Profile,
    params: &ConsensusParams,
) -> Result<Consensus, ProfileError> {
    if params.max_insert_run == 0 {
        return Err(ProfileError::InvalidParameter(
            "max insert run must be at least 1".to_string(),
        ));
    }

    let num_positions = profile.num_positions();
    let mut position = 0;
    let mut state = HmmState::Match;
    let mut insert_run = 0usize;
    let mut sequence = String::new();
    let mut states = Vec::new();

    while position < num_positions {
        let block = profile.transitions(position).block(state);
        let next = argmax_by(block.len(), |index| {
            let probability = block[index];
            if index != HmmState::Insert.ordinal() {
                probability
            } else if insert_run >= params.max_insert_run {
                0.0
            } else {
                probability.powi(insert_run.max(1) as i32)
            }
        });
        state = HmmState::from_ordinal(next);

        if state == HmmState::Insert {
            insert_run += 1;
        } else {
            insert_run = 0;
            position += 1;
        }
        if position == num_positions {
            break;
        }

        let symbol = match state {
            HmmState::Match => {
                let emissions = profile.match_emissions(position).ok_or(
                    ProfileError::UndefinedEmission {
                        state,
                        position,
                    },
                )?;
                amino_acid_symbol(argmax(emissions)) as char
            }
            HmmState::Insert => amino_acid_symbol(argmax(profile.insert_emissions(position))) as char,
            HmmState::Delete => '-',
        };
        sequence.push(symbol);
        states.push(state);
    }

    log::debug!(
        "Consensus of {} states over {} positions",
        states.len(),
        num_positions
    );

    Ok(Consensus { sequence, states })
}
