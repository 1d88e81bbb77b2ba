use crate::cli::AlignArgs;
use crate::hmm::{align_query, score_query, Profile, ProfileError, ViterbiAlignment};
use crate::utils::{create_output_writer, fasta_records, read_profile, FastaRecord, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{
    collections::BTreeMap,
    io::Write,
    path::Path,
    thread::{self},
};

const CHANNEL_BUFFER_SIZE: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
enum QueryOutcome {
    Alignment(ViterbiAlignment),
    Score(f32),
}

/// Input index, query id and outcome of one aligned query
type QueryResult = (usize, String, std::result::Result<QueryOutcome, ProfileError>);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct AlignSummary {
    aligned: usize,
    failed: usize,
}

pub fn align(args: AlignArgs) -> Result<()> {
    let profile = read_profile(&args.model_path)?;
    let writer = create_output_writer(args.output_path.as_deref())?;
    let score_only = args.score_only;

    let (sender_query, receiver_query) = bounded(CHANNEL_BUFFER_SIZE);
    let queries_path = args.queries_path.clone();
    let query_stream_thread =
        thread::spawn(move || stream_queries_into_channel(&queries_path, sender_query));

    let (sender_result, receiver_result) = bounded(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || write_results(writer, receiver_result));

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads)?;
    pool.install(|| {
        receiver_query
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, (index, record)| {
                process_query(&profile, index, record, score_only, s)
            });
    });

    drop(sender_result);
    let summary = writer_thread
        .join()
        .map_err(|_| "Writer thread panicked".to_string())??;
    log::trace!("Writer thread finished");
    let num_queries = query_stream_thread
        .join()
        .map_err(|_| "Query stream thread panicked".to_string())??;
    log::trace!("Query stream thread finished");

    log::info!(
        "Aligned {} of {} queries",
        summary.aligned,
        num_queries
    );
    if num_queries == 0 {
        log::warn!("No query sequences found in {}", args.queries_path.display());
    }
    if summary.failed > 0 {
        return Err(format!(
            "{} of {} queries could not be aligned",
            summary.failed, num_queries
        ));
    }
    Ok(())
}

/// Sends every query with its input index and returns the number of queries read
fn stream_queries_into_channel(
    path: &Path,
    sender: Sender<(usize, FastaRecord)>,
) -> Result<usize> {
    let mut num_queries = 0;
    for record in fasta_records(path)? {
        let record = record?;
        sender
            .send((num_queries, record))
            .map_err(|e| format!("Failed to send query to the aligners: {}", e))?;
        num_queries += 1;
    }
    Ok(num_queries)
}

fn process_query(
    profile: &Profile,
    index: usize,
    record: FastaRecord,
    score_only: bool,
    sender_result: &Sender<QueryResult>,
) {
    let outcome = if score_only {
        score_query(profile, &record.seq).map(QueryOutcome::Score)
    } else {
        align_query(profile, &record.seq).map(QueryOutcome::Alignment)
    };
    if let Err(e) = sender_result.send((index, record.id, outcome)) {
        log::error!("Failed to send query result to writer thread: {}", e);
    }
}

/// Writes results in input order, buffering the ones that arrive early
fn write_results<W: Write>(mut writer: W, receiver: Receiver<QueryResult>) -> Result<AlignSummary> {
    let mut pending = BTreeMap::new();
    let mut next_index = 0;
    let mut summary = AlignSummary::default();

    for (index, id, outcome) in receiver {
        pending.insert(index, (id, outcome));
        while let Some((id, outcome)) = pending.remove(&next_index) {
            next_index += 1;
            match outcome {
                Ok(outcome) => {
                    write_outcome(&mut writer, &id, &outcome)
                        .map_err(|e| format!("Failed to write result of {}: {}", id, e))?;
                    summary.aligned += 1;
                }
                Err(e) => {
                    log::error!("Error aligning query {}: {}", id, e);
                    summary.failed += 1;
                }
            }
        }
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;
    Ok(summary)
}

fn write_outcome<W: Write>(writer: &mut W, id: &str, outcome: &QueryOutcome) -> std::io::Result<()> {
    match outcome {
        QueryOutcome::Score(score) => writeln!(writer, "{}\t{:.3}", id, score),
        QueryOutcome::Alignment(alignment) => {
            writeln!(writer, ">{} score={:.3}", id, alignment.score)?;
            writeln!(writer, "{}", alignment.aligned)?;
            writeln!(writer, "{}", alignment.state_string())
        }
    }
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("profhmm-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
