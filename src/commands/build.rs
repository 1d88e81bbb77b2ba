use crate::cli::BuildArgs;
use crate::hmm::{build_profile, BuildParams};
use crate::utils::{create_output_writer, read_alignment, Result};
use std::io::Write;

pub fn build(args: BuildArgs) -> Result<()> {
    let alignment = read_alignment(&args.alignment_path)?;
    log::info!(
        "Alignment has {} sequences of {} columns",
        alignment.num_sequences(),
        alignment.width()
    );

    let params = BuildParams {
        alpha: args.alpha,
        pseudocount: args.pseudocount,
        ..Default::default()
    };
    let profile = build_profile(&alignment, &params).map_err(|e| e.to_string())?;
    log::info!("Built model with {} positions", profile.num_positions());

    let mut writer = create_output_writer(args.output_path.as_deref())?;
    profile
        .write_model(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| format!("Failed to write model: {}", e))
}
