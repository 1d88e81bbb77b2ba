use std::ops::Range;

pub const NUM_STATES: usize = 3;

/// Width of one transition matrix row: every origin state to every destination state
pub const TRANSITION_ROW_LEN: usize = NUM_STATES * NUM_STATES;

/// State of a model position. The discriminants are the offsets used by the
/// transition matrix and the Viterbi lattice, so the declaration order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmmState {
    Match = 0,
    Delete = 1,
    Insert = 2,
}

impl HmmState {
    pub const ALL: [HmmState; NUM_STATES] = [HmmState::Match, HmmState::Delete, HmmState::Insert];

    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_ordinal(ordinal: usize) -> HmmState {
        Self::ALL[ordinal % NUM_STATES]
    }

    /// Columns of a transition row holding the outgoing probabilities of `self`
    #[inline]
    pub const fn transition_block(self) -> Range<usize> {
        let start = NUM_STATES * self.ordinal();
        start..start + NUM_STATES
    }

    /// Column of a transition row holding `origin -> destination`
    #[inline]
    pub const fn destination_offset(origin: HmmState, destination: HmmState) -> usize {
        NUM_STATES * origin.ordinal() + destination.ordinal()
    }

    /// Match and Insert states emit a residue, Delete states are silent
    #[inline]
    pub fn emits(self) -> bool {
        self != HmmState::Delete
    }

    pub fn letter(self) -> char {
        match self {
            HmmState::Match => 'M',
            HmmState::Delete => 'D',
            HmmState::Insert => 'I',
        }
    }
}

/// Renders a state path as its `M`/`D`/`I` letters
pub fn states_to_string(states: &[HmmState]) -> String {
    states.iter().map(|state| state.letter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_match_matrix_layout() {
        assert_eq!(HmmState::Match.ordinal(), 0);
        assert_eq!(HmmState::Delete.ordinal(), 1);
        assert_eq!(HmmState::Insert.ordinal(), 2);
        for state in HmmState::ALL {
            assert_eq!(HmmState::from_ordinal(state.ordinal()), state);
        }
    }

    #[test]
    fn test_transition_blocks_partition_the_row() {
        assert_eq!(HmmState::Match.transition_block(), 0..3);
        assert_eq!(HmmState::Delete.transition_block(), 3..6);
        assert_eq!(HmmState::Insert.transition_block(), 6..9);
    }

    #[test]
    fn test_destination_offsets_are_destination_fastest() {
        use HmmState::*;
        assert_eq!(HmmState::destination_offset(Match, Match), 0);
        assert_eq!(HmmState::destination_offset(Match, Insert), 2);
        assert_eq!(HmmState::destination_offset(Delete, Match), 3);
        assert_eq!(HmmState::destination_offset(Insert, Delete), 7);
        assert_eq!(HmmState::destination_offset(Insert, Insert), 8);
        for origin in HmmState::ALL {
            for destination in HmmState::ALL {
                let offset = HmmState::destination_offset(origin, destination);
                assert!(origin.transition_block().contains(&offset));
            }
        }
    }

    #[test]
    fn test_states_to_string() {
        use HmmState::*;
        assert_eq!(states_to_string(&[Match, Delete, Insert]), "MDI");
        assert_eq!(states_to_string(&[Match, Insert, Insert, Match]), "MIIM");
        assert_eq!(states_to_string(&[]), "");
    }
}
