use crate::hmm::{DEFAULT_MAX_INSERT_RUN, DEFAULT_PSEUDOCOUNT};
use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="profhmm",
          version=&**FULL_VERSION,
          about="Profile HMM builder, aligner and consensus generator",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(global = true)]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Build a profile HMM from a multiple sequence alignment")]
    Build(BuildArgs),
    #[clap(about = "Align query sequences to a profile HMM")]
    Align(AlignArgs),
    #[clap(about = "Generate the consensus sequence of a profile HMM")]
    Genseq(GenseqArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("build")))]
#[command(arg_required_else_help(true))]
pub struct BuildArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "alignment")]
    #[clap(help = "Multiple sequence alignment in FASTA format (optionally gzipped)")]
    #[clap(value_name = "ALIGNMENT")]
    #[arg(value_parser = check_file_exists)]
    pub alignment_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "alpha")]
    #[clap(help = "Columns with a gap fraction below this threshold become match positions")]
    #[clap(value_name = "ALPHA")]
    #[arg(value_parser = ensure_unit_float)]
    pub alpha: f32,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output model path [default: stdout]")]
    #[clap(value_name = "MODEL")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "pseudocount")]
    #[clap(value_name = "PSEUDOCOUNT")]
    #[clap(help = "Pseudocount added to every transition and emission count")]
    #[clap(default_value_t = DEFAULT_PSEUDOCOUNT)]
    #[arg(value_parser = ensure_non_negative_float)]
    pub pseudocount: f32,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("align")))]
#[command(arg_required_else_help(true))]
pub struct AlignArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "model")]
    #[clap(help = "Profile HMM file written by the build command")]
    #[clap(value_name = "MODEL")]
    #[arg(value_parser = check_file_exists)]
    pub model_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'q')]
    #[clap(long = "queries")]
    #[clap(help = "Query sequences in FASTA format (optionally gzipped)")]
    #[clap(value_name = "QUERIES")]
    #[arg(value_parser = check_file_exists)]
    pub queries_path: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output path [default: stdout]")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(short = 's')]
    #[clap(long = "score")]
    #[clap(help = "Only report the log-probability of the best path")]
    pub score_only: bool,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("genseq")))]
#[command(arg_required_else_help(true))]
pub struct GenseqArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "model")]
    #[clap(help = "Profile HMM file written by the build command")]
    #[clap(value_name = "MODEL")]
    #[arg(value_parser = check_file_exists)]
    pub model_path: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output path [default: stdout]")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-insert-run")]
    #[clap(value_name = "MAX_INSERT_RUN")]
    #[clap(help = "Maximum number of consecutive insert states in the consensus")]
    #[clap(default_value_t = DEFAULT_MAX_INSERT_RUN)]
    #[arg(value_parser = positive_count)]
    pub max_insert_run: usize,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn positive_count(s: &str) -> Result<usize> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if count >= 1 {
        Ok(count)
    } else {
        Err("Count must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_unit_float(s: &str) -> Result<f32> {
    let value = s
        .parse::<f32>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn ensure_non_negative_float(s: &str) -> Result<f32> {
    let value = s
        .parse::<f32>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !value.is_finite() || value < 0.0 {
        Err(format!("The value must be a non-negative number, got: {}", value))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_float_bounds() {
        assert_eq!(ensure_unit_float("0.5"), Ok(0.5));
        assert_eq!(ensure_unit_float("1"), Ok(1.0));
        assert!(ensure_unit_float("1.01").is_err());
        assert!(ensure_unit_float("-0.1").is_err());
        assert!(ensure_unit_float("NaN").is_err());
        assert!(ensure_unit_float("half").is_err());
    }

    #[test]
    fn test_non_negative_float_bounds() {
        assert_eq!(ensure_non_negative_float("0"), Ok(0.0));
        assert_eq!(ensure_non_negative_float("2.5"), Ok(2.5));
        assert!(ensure_non_negative_float("-1").is_err());
        assert!(ensure_non_negative_float("inf").is_err());
    }

    #[test]
    fn test_counts_must_be_positive() {
        assert_eq!(threads_in_range("4"), Ok(4));
        assert!(threads_in_range("0").is_err());
        assert_eq!(positive_count("100"), Ok(100));
        assert!(positive_count("0").is_err());
        assert!(positive_count("-3").is_err());
    }

    #[test]
    fn test_prefix_path_requires_existing_parent() {
        assert_eq!(check_prefix_path("model.txt"), Ok(PathBuf::from("model.txt")));
        assert!(check_prefix_path("/nonexistent/dir/model.txt").is_err());
    }

    #[test]
    fn test_parse_genseq_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let model = dir.path().join("model.txt");
        std::fs::write(&model, "").unwrap();

        let cli = Cli::try_parse_from(["profhmm", "-vv", "genseq", "-m", model.to_str().unwrap()])
            .unwrap();
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Command::Genseq(args) => {
                assert_eq!(args.max_insert_run, DEFAULT_MAX_INSERT_RUN);
                assert!(args.output_path.is_none());
            }
            _ => panic!("expected the genseq command"),
        }
    }

    #[test]
    fn test_parse_build_arguments() {
        let dir = tempfile::TempDir::new().unwrap();
        let aln = dir.path().join("aln.fa");
        std::fs::write(&aln, ">a\nAC\n").unwrap();

        let cli = Cli::try_parse_from([
            "profhmm",
            "build",
            "-i",
            aln.to_str().unwrap(),
            "-a",
            "0.4",
            "--pseudocount",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.alpha, 0.4);
                assert_eq!(args.pseudocount, 0.5);
                assert!(args.output_path.is_none());
            }
            _ => panic!("expected the build command"),
        }

        assert!(Cli::try_parse_from(["profhmm", "build", "-i", aln.to_str().unwrap(), "-a", "2"]).is_err());
    }
}
