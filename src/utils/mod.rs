mod io_utils;
mod math;
mod readers;

pub use io_utils::create_output_writer;
pub use math::{argmax, argmax_by, normalize_in_place, round_to_decimals};
pub use readers::{fasta_records, open_input_reader, read_alignment, read_profile, FastaRecord};

pub type Result<T> = std::result::Result<T, String>;

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}
