use super::alphabet::ALPHABET_SIZE;
use super::state::TRANSITION_ROW_LEN;
use super::{HmmState, ProfileError};

/// Emission probabilities of one state over the amino acid alphabet
pub type EmissionRow = [f32; ALPHABET_SIZE];

/// Outgoing transitions of the three states at one model position, stored
/// origin-major and destination-fastest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRow([f32; TRANSITION_ROW_LEN]);

impl TransitionRow {
    pub fn filled(value: f32) -> Self {
        Self([value; TRANSITION_ROW_LEN])
    }

    #[inline]
    pub fn get(&self, origin: HmmState, destination: HmmState) -> f32 {
        self.0[HmmState::destination_offset(origin, destination)]
    }

    #[inline]
    pub fn block(&self, origin: HmmState) -> &[f32] {
        &self.0[origin.transition_block()]
    }

    pub fn block_mut(&mut self, origin: HmmState) -> &mut [f32] {
        &mut self.0[origin.transition_block()]
    }

    pub fn increment(&mut self, origin: HmmState, destination: HmmState) {
        self.0[HmmState::destination_offset(origin, destination)] += 1.0;
    }

    pub fn values(&self) -> &[f32; TRANSITION_ROW_LEN] {
        &self.0
    }

    pub fn values_mut(&mut self) -> &mut [f32; TRANSITION_ROW_LEN] {
        &mut self.0
    }
}

impl From<[f32; TRANSITION_ROW_LEN]> for TransitionRow {
    fn from(values: [f32; TRANSITION_ROW_LEN]) -> Self {
        Self(values)
    }
}

/// Profile HMM with `N` model positions. Position 0 is the silent begin
/// state: it has no Match emissions and no Delete state.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    transitions: Vec<TransitionRow>,
    match_emissions: Vec<Option<EmissionRow>>,
    insert_emissions: Vec<EmissionRow>,
}

impl Profile {
    pub fn new(
        transitions: Vec<TransitionRow>,
        match_emissions: Vec<Option<EmissionRow>>,
        insert_emissions: Vec<EmissionRow>,
    ) -> Result<Self, ProfileError> {
        let num_positions = transitions.len();
        if num_positions == 0 {
            return Err(ProfileError::InconsistentProfile(
                "a profile needs at least one position".to_string(),
            ));
        }
        if match_emissions.len() != num_positions || insert_emissions.len() != num_positions {
            return Err(ProfileError::InconsistentProfile(format!(
                "{} transition rows, {} match emission rows and {} insert emission rows",
                num_positions,
                match_emissions.len(),
                insert_emissions.len()
            )));
        }
        if match_emissions[0].is_some() {
            return Err(ProfileError::InconsistentProfile(
                "the begin state cannot emit".to_string(),
            ));
        }
        if let Some(position) = match_emissions.iter().skip(1).position(|row| row.is_none()) {
            return Err(ProfileError::InconsistentProfile(format!(
                "match emissions of position {} are undefined",
                position + 1
            )));
        }
        if transitions[0].block(HmmState::Delete).iter().any(|&p| p != 0.0) {
            return Err(ProfileError::InconsistentProfile(
                "position 0 has no delete state".to_string(),
            ));
        }

        let all_values = transitions
            .iter()
            .flat_map(|row| row.values().iter())
            .chain(match_emissions.iter().flatten().flat_map(|row| row.iter()))
            .chain(insert_emissions.iter().flat_map(|row| row.iter()));
        for &value in all_values {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::InconsistentProfile(format!(
                    "invalid probability {}",
                    value
                )));
            }
        }

        Ok(Self {
            transitions,
            match_emissions,
            insert_emissions,
        })
    }

    /// Model length `N`, counting the begin position
    pub fn num_positions(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self, position: usize) -> &TransitionRow {
        &self.transitions[position]
    }

    #[inline]
    pub fn transition(&self, position: usize, origin: HmmState, destination: HmmState) -> f32 {
        self.transitions[position].get(origin, destination)
    }

    /// `None` only for position 0
    pub fn match_emissions(&self, position: usize) -> Option<&EmissionRow> {
        self.match_emissions[position].as_ref()
    }

    pub fn insert_emissions(&self, position: usize) -> &EmissionRow {
        &self.insert_emissions[position]
    }

    pub fn transition_rows(&self) -> &[TransitionRow] {
        &self.transitions
    }

    pub fn match_emission_rows(&self) -> &[Option<EmissionRow>] {
        &self.match_emissions
    }

    pub fn insert_emission_rows(&self) -> &[EmissionRow] {
        &self.insert_emissions
    }
}
