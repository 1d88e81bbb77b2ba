use super::alignment::{mark_columns, model_length, state_path, Alignment};
use super::alphabet::{amino_acid_index, ALPHABET_SIZE};
use super::profile::{EmissionRow, Profile, TransitionRow};
use super::{HmmState, ProfileError};
use crate::utils::{normalize_in_place, round_to_decimals};

/// Laplace pseudocount added to every count before training
pub const DEFAULT_PSEUDOCOUNT: f32 = 1.0;

/// Precision of the model text format
pub const MODEL_DECIMALS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildParams {
    /// Columns with a gap fraction below `alpha` become Match/Delete positions
    pub alpha: f32,
    pub pseudocount: f32,
    /// Round probabilities after normalization so the in-memory model equals
    /// its serialized form. Rounded rows no longer sum to exactly one.
    pub round_decimals: Option<u32>,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            pseudocount: DEFAULT_PSEUDOCOUNT,
            round_decimals: None,
        }
    }
}

impl BuildParams {
    pub fn with_alpha(alpha: f32) -> Self {
        Self {
            alpha,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ProfileError::InvalidParameter(format!(
                "alpha must be between 0 and 1, got {}",
                self.alpha
            )));
        }
        if !self.pseudocount.is_finite() || self.pseudocount < 0.0 {
            return Err(ProfileError::InvalidParameter(format!(
                "pseudocount must be a non-negative number, got {}",
                self.pseudocount
            )));
        }
        Ok(())
    }
}

/// Estimates a profile from a training alignment: marks columns, labels each
/// sequence with its state path, counts transitions and emissions and
/// normalizes the counts into probabilities.
pub fn build_profile(alignment: &Alignment, params: &BuildParams) -> Result<Profile, ProfileError> {
    params.validate()?;

    let marked = mark_columns(alignment, params.alpha);
    let num_positions = model_length(&marked);
    log::debug!(
        "{} of {} columns marked at alpha={}, model has {} positions",
        num_positions - 1,
        alignment.width(),
        params.alpha,
        num_positions
    );

    let mut counts = ProfileCounts::new(num_positions, params.pseudocount);
    for seq in alignment.sequences() {
        counts.add_sequence(seq, &marked)?;
    }
    counts.into_profile(params.round_decimals)
}

struct ProfileCounts {
    transitions: Vec<TransitionRow>,
    match_emissions: Vec<Option<EmissionRow>>,
    insert_emissions: Vec<EmissionRow>,
}

impl ProfileCounts {
    fn new(num_positions: usize, pseudocount: f32) -> Self {
        // The last position only ever transitions into the end state
        let mut transitions: Vec<TransitionRow> = (0..num_positions)
            .map(|position| {
                let initial = if position + 1 < num_positions {
                    pseudocount
                } else {
                    0.0
                };
                TransitionRow::filled(initial)
            })
            .collect();
        transitions[0].block_mut(HmmState::Delete).fill(0.0);

        let match_emissions = (0..num_positions)
            .map(|position| (position != 0).then_some([pseudocount; ALPHABET_SIZE]))
            .collect();

        Self {
            transitions,
            match_emissions,
            insert_emissions: vec![[pseudocount; ALPHABET_SIZE]; num_positions],
        }
    }

    fn add_sequence(&mut self, seq: &[u8], marked: &[bool]) -> Result<(), ProfileError> {
        let path = state_path(seq, marked);

        let (first_column, first_state) = path
            .iter()
            .enumerate()
            .find_map(|(column, state)| state.map(|s| (column, s)))
            .ok_or(ProfileError::IncompleteStatePath { column: 0 })?;

        // Position 0 behaves as a Match state preceding the first labelled column
        if first_state == HmmState::Insert {
            self.count_insert(0, seq[first_column]);
        }
        self.transitions[0].increment(HmmState::Match, first_state);

        let mut position = 0;
        for column in first_column..seq.len() {
            if marked[column] {
                position += 1;
            }
            let state = match path[column] {
                Some(state) => state,
                None => continue,
            };

            match state {
                HmmState::Match if position != 0 => self.count_match(position, seq[column]),
                HmmState::Insert => self.count_insert(position, seq[column]),
                _ => {}
            }

            let next_state = path[column + 1..]
                .iter()
                .flatten()
                .next()
                .copied()
                .ok_or(ProfileError::IncompleteStatePath { column })?;
            self.transitions[position].increment(state, next_state);
        }

        Ok(())
    }

    fn count_match(&mut self, position: usize, symbol: u8) {
        if let (Some(index), Some(row)) = (
            amino_acid_index(symbol),
            self.match_emissions[position].as_mut(),
        ) {
            row[index] += 1.0;
        }
    }

    fn count_insert(&mut self, position: usize, symbol: u8) {
        if let Some(index) = amino_acid_index(symbol) {
            self.insert_emissions[position][index] += 1.0;
        }
    }

    fn into_profile(mut self, round_decimals: Option<u32>) -> Result<Profile, ProfileError> {
        for row in self.transitions.iter_mut() {
            for state in HmmState::ALL {
                normalize_in_place(row.block_mut(state));
            }
        }

        for (position, row) in self.match_emissions.iter_mut().enumerate() {
            if let Some(row) = row {
                if normalize_in_place(row) == 0.0 {
                    return Err(ProfileError::UndefinedEmission {
                        state: HmmState::Match,
                        position,
                    });
                }
            }
        }

        for (position, row) in self.insert_emissions.iter_mut().enumerate() {
            if normalize_in_place(row) == 0.0 {
                return Err(ProfileError::UndefinedEmission {
                    state: HmmState::Insert,
                    position,
                });
            }
        }

        if let Some(decimals) = round_decimals {
            let values = self
                .transitions
                .iter_mut()
                .flat_map(|row| row.values_mut().iter_mut())
                .chain(self.match_emissions.iter_mut().flatten().flatten())
                .chain(self.insert_emissions.iter_mut().flatten());
            for value in values {
                *value = round_to_decimals(*value, decimals);
            }
        }

        Profile::new(self.transitions, self.match_emissions, self.insert_emissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f32 = 1e-5;

    fn alignment(seqs: &[&str]) -> Alignment {
        Alignment::new(seqs.iter().map(|s| s.as_bytes().to_vec()).collect()).unwrap()
    }

    fn assert_block(profile: &Profile, position: usize, origin: HmmState, expected: [f32; 3]) {
        let block = profile.transitions(position).block(origin);
        for (observed, expected) in block.iter().zip(expected) {
            assert_abs_diff_eq!(*observed, expected, epsilon = TOLERANCE);
        }
    }

    fn match_prob(profile: &Profile, position: usize, symbol: u8) -> f32 {
        profile.match_emissions(position).unwrap()[amino_acid_index(symbol).unwrap()]
    }

    fn insert_prob(profile: &Profile, position: usize, symbol: u8) -> f32 {
        profile.insert_emissions(position)[amino_acid_index(symbol).unwrap()]
    }

    fn assert_normalized(profile: &Profile) {
        for row in profile.transition_rows() {
            for state in HmmState::ALL {
                let block = row.block(state);
                let sum: f32 = block.iter().sum();
                if sum != 0.0 {
                    assert_abs_diff_eq!(sum, 1.0, epsilon = TOLERANCE);
                } else {
                    assert!(block.iter().all(|&p| p == 0.0));
                }
            }
        }
        for row in profile.match_emission_rows().iter().flatten() {
            assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = TOLERANCE);
        }
        for row in profile.insert_emission_rows() {
            assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn test_build_fully_marked_profile() {
        let profile = build_profile(&alignment(&["AC-D", "A-CD"]), &BuildParams::with_alpha(0.6)).unwrap();
        use HmmState::*;

        assert_eq!(profile.num_positions(), 5);
        assert_block(&profile, 0, Match, [0.6, 0.2, 0.2]);
        assert_block(&profile, 0, Delete, [0.0, 0.0, 0.0]);
        assert_block(&profile, 0, Insert, [1.0 / 3.0; 3]);
        assert_block(&profile, 1, Match, [0.4, 0.4, 0.2]);
        assert_block(&profile, 2, Match, [0.25, 0.5, 0.25]);
        assert_block(&profile, 2, Delete, [0.5, 0.25, 0.25]);
        assert_block(&profile, 3, Match, [0.5, 0.25, 0.25]);
        assert_block(&profile, 3, Delete, [0.5, 0.25, 0.25]);
        assert_block(&profile, 4, Match, [1.0, 0.0, 0.0]);
        assert_block(&profile, 4, Delete, [0.0, 0.0, 0.0]);
        assert_block(&profile, 4, Insert, [0.0, 0.0, 0.0]);

        assert!(profile.match_emissions(0).is_none());
        assert_abs_diff_eq!(match_prob(&profile, 1, b'A'), 3.0 / 22.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 1, b'C'), 1.0 / 22.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 2, b'C'), 2.0 / 21.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 3, b'C'), 2.0 / 21.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 4, b'D'), 3.0 / 22.0, epsilon = TOLERANCE);
        for position in 0..5 {
            assert_abs_diff_eq!(insert_prob(&profile, position, b'W'), 0.05, epsilon = TOLERANCE);
        }
        assert_normalized(&profile);
    }

    #[test]
    fn test_build_profile_with_insert_columns() {
        let profile = build_profile(&alignment(&["AC-D", "A-CD"]), &BuildParams::with_alpha(0.5)).unwrap();
        use HmmState::*;

        assert_eq!(profile.num_positions(), 3);
        assert_block(&profile, 0, Match, [0.6, 0.2, 0.2]);
        assert_block(&profile, 1, Match, [0.2, 0.2, 0.6]);
        assert_block(&profile, 1, Delete, [1.0 / 3.0; 3]);
        assert_block(&profile, 1, Insert, [0.6, 0.2, 0.2]);
        assert_block(&profile, 2, Match, [1.0, 0.0, 0.0]);

        assert_abs_diff_eq!(insert_prob(&profile, 1, b'C'), 3.0 / 22.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(insert_prob(&profile, 0, b'C'), 0.05, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 2, b'D'), 3.0 / 22.0, epsilon = TOLERANCE);
        assert_normalized(&profile);
    }

    #[test]
    fn test_leading_insert_counts_at_begin_position() {
        let profile = build_profile(&alignment(&["CA", "-A"]), &BuildParams::with_alpha(0.5)).unwrap();
        use HmmState::*;

        assert_eq!(profile.num_positions(), 2);
        // Counted once for the begin transition and once when walking the columns
        assert_abs_diff_eq!(insert_prob(&profile, 0, b'C'), 3.0 / 22.0, epsilon = TOLERANCE);
        assert_block(&profile, 0, Match, [0.4, 0.2, 0.4]);
        assert_block(&profile, 0, Insert, [0.5, 0.25, 0.25]);
        assert_block(&profile, 1, Match, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_residues_are_not_emitted() {
        let profile = build_profile(&alignment(&["AX", "AC"]), &BuildParams::with_alpha(0.5)).unwrap();
        assert_abs_diff_eq!(match_prob(&profile, 2, b'C'), 2.0 / 21.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(match_prob(&profile, 2, b'A'), 1.0 / 21.0, epsilon = TOLERANCE);
        assert_block(&profile, 1, HmmState::Match, [0.6, 0.2, 0.2]);
    }

    #[test]
    fn test_missing_pseudocounts_leave_undefined_emissions() {
        let params = BuildParams {
            alpha: 0.5,
            pseudocount: 0.0,
            round_decimals: None,
        };
        let result = build_profile(&alignment(&["CA", "-A"]), &params);
        assert_eq!(
            result,
            Err(ProfileError::UndefinedEmission {
                state: HmmState::Insert,
                position: 1
            })
        );
    }

    #[test]
    fn test_reject_invalid_parameters() {
        let aln = alignment(&["AC", "AD"]);
        for alpha in [-0.1, 1.5, f32::NAN] {
            assert!(matches!(
                build_profile(&aln, &BuildParams::with_alpha(alpha)),
                Err(ProfileError::InvalidParameter(_))
            ));
        }
        let params = BuildParams {
            pseudocount: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            build_profile(&aln, &params),
            Err(ProfileError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_profile_is_normalized() {
        let aln = alignment(&["AC-D", "A-CD"]);
        for alpha in [0.5, 0.6] {
            let profile = build_profile(&aln, &BuildParams::with_alpha(alpha)).unwrap();
            assert_normalized(&profile);
        }
        let profile = build_profile(&alignment(&["CA", "-A", "CX"]), &BuildParams::default()).unwrap();
        assert_normalized(&profile);
    }

    #[test]
    fn test_rounding_keeps_three_decimals() {
        let params = BuildParams {
            round_decimals: Some(MODEL_DECIMALS),
            ..BuildParams::with_alpha(0.6)
        };
        let profile = build_profile(&alignment(&["AC-D", "A-CD"]), &params).unwrap();
        assert_eq!(match_prob(&profile, 1, b'A'), round_to_decimals(3.0 / 22.0, 3));
        assert_eq!(profile.transition(0, HmmState::Insert, HmmState::Match), 0.333);
        assert_eq!(profile.transition(1, HmmState::Match, HmmState::Delete), 0.4);
    }

    #[test]
    fn test_empty_columns_build_begin_only_model() {
        let profile = build_profile(&alignment(&["--", "--"]), &BuildParams::with_alpha(0.5)).unwrap();
        assert_eq!(profile.num_positions(), 1);
        assert_block(&profile, 0, HmmState::Match, [1.0, 0.0, 0.0]);
        assert_normalized(&profile);
    }

    #[test]
    fn test_random_alignments_are_normalized() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..25 {
            let width = rng.random_range(1..30);
            let num_seqs = rng.random_range(1..8);
            let seqs = (0..num_seqs)
                .map(|_| {
                    (0..width)
                        .map(|_| {
                            if rng.random_bool(0.3) {
                                b'-'
                            } else {
                                b"ACDEFGHIKLMNPQRSTVWYX"[rng.random_range(0..21)]
                            }
                        })
                        .collect()
                })
                .collect();
            let aln = Alignment::new(seqs).unwrap();
            let alpha = rng.random_range(0.0..=1.0);
            let profile = build_profile(&aln, &BuildParams::with_alpha(alpha)).unwrap();
            assert_eq!(
                profile.num_positions(),
                model_length(&mark_columns(&aln, alpha))
            );
            assert_normalized(&profile);
        }
    }
}
