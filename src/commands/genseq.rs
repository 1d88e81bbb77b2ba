use crate::cli::GenseqArgs;
use crate::hmm::{generate_consensus, ConsensusParams};
use crate::utils::{create_output_writer, read_profile, Result};
use std::io::Write;

pub fn genseq(args: GenseqArgs) -> Result<()> {
    let profile = read_profile(&args.model_path)?;
    let params = ConsensusParams {
        max_insert_run: args.max_insert_run,
    };
    let consensus = generate_consensus(&profile, &params).map_err(|e| e.to_string())?;
    log::info!(
        "Consensus of {} states from a model with {} positions",
        consensus.states.len(),
        profile.num_positions()
    );

    let mut writer = create_output_writer(args.output_path.as_deref())?;
    writeln!(writer, "{}", consensus.sequence)
        .and_then(|_| writeln!(writer, "{}", consensus.state_string()))
        .and_then(|_| writer.flush())
        .map_err(|e| format!("Failed to write consensus: {}", e))
}
