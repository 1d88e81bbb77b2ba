pub mod alignment;
pub mod alphabet;
mod builder;
mod consensus;
mod error;
mod model_format;
pub mod profile;
pub mod state;
mod viterbi;

pub use alignment::{mark_columns, model_length, state_path, Alignment, StatePath};
pub use builder::{build_profile, BuildParams, DEFAULT_PSEUDOCOUNT, MODEL_DECIMALS};
pub use consensus::{generate_consensus, Consensus, ConsensusParams, DEFAULT_MAX_INSERT_RUN};
pub use error::ProfileError;
pub use profile::{EmissionRow, Profile, TransitionRow};
pub use state::{states_to_string, HmmState};
pub use viterbi::{align_query, score_query, ViterbiAlignment, EPSILON};
