//! Configuration resolution from CLI args

use crate::cli::{Args, ParallelizeBy};
use crate::error::CliError;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `--input-dir` is not given
pub const INPUT_DIR_ENV: &str = "AOC_INPUT_DIR";
/// Input directory used when neither the flag nor the environment names one
pub const DEFAULT_INPUT_DIR: &str = "~/.cache/aoc_solver/inputs";

/// Resolved runtime configuration
#[derive(Debug)]
pub struct Config {
    /// Year filter (None = all years)
    pub year_filter: Option<u16>,
    /// Day filter (None = all days)
    pub day_filter: Option<u8>,
    /// Part filter (None = all parts)
    pub part_filter: Option<u8>,
    /// Tags to filter solvers
    pub tags: Vec<String>,
    /// Input directory path
    pub input_dir: PathBuf,
    /// Explicit input file for a single year/day
    pub input_file: Option<PathBuf>,
    /// Number of threads for parallel execution
    pub thread_count: usize,
    /// Parallelization level
    pub parallelize_by: ParallelizeBy,
    /// Quiet mode
    pub quiet: bool,
    /// `-v` count
    pub verbosity: u8,
}

impl Config {
    /// Build config from CLI args, reading `AOC_INPUT_DIR` from the environment
    pub fn from_args(args: Args) -> Result<Self, CliError> {
        Self::resolve(args, std::env::var_os(INPUT_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(args: Args, env_input_dir: Option<PathBuf>) -> Result<Self, CliError> {
        if args.input.is_some() && (args.year.is_none() || args.day.is_none()) {
            return Err(CliError::Config(
                "--input requires both --year and --day".to_string(),
            ));
        }
        if args.threads == Some(0) {
            return Err(CliError::Config("--threads must be at least 1".to_string()));
        }

        let input_dir = args
            .input_dir
            .or(env_input_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));

        Ok(Config {
            year_filter: args.year,
            day_filter: args.day,
            part_filter: args.part,
            tags: args.tags,
            input_dir: expand_tilde(&input_dir),
            input_file: args.input.as_deref().map(expand_tilde),
            thread_count: args.threads.unwrap_or_else(num_cpus),
            parallelize_by: args.parallelize_by,
            quiet: args.quiet,
            verbosity: args.verbose,
        })
    }

    /// Default log filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str()
        && (path_str.starts_with("~/") || path_str == "~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path_str.get(2..).unwrap_or_default());
    }
    path.to_path_buf()
}

/// Get number of CPUs
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("aoc").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_input_dir_precedence() {
        let config = Config::resolve(
            args(&["--input-dir", "/from/flag"]),
            Some(PathBuf::from("/from/env")),
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/from/flag"));

        let config = Config::resolve(args(&[]), Some(PathBuf::from("/from/env"))).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/from/env"));

        let config = Config::resolve(args(&[]), None).unwrap();
        assert!(config.input_dir.ends_with(".cache/aoc_solver/inputs"));
    }

    #[test]
    fn test_input_file_requires_year_and_day() {
        assert!(matches!(
            Config::resolve(args(&["--input", "in.txt", "--year", "2023"]), None),
            Err(CliError::Config(_))
        ));

        let config =
            Config::resolve(args(&["-i", "in.txt", "-y", "2023", "-d", "20"]), None).unwrap();
        assert_eq!(config.input_file, Some(PathBuf::from("in.txt")));
    }

    #[test]
    fn test_thread_count() {
        assert!(Config::resolve(args(&["--threads", "0"]), None).is_err());
        let config = Config::resolve(args(&["--threads", "3"]), None).unwrap();
        assert_eq!(config.thread_count, 3);
        assert!(Config::resolve(args(&[]), None).unwrap().thread_count >= 1);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/inputs")), home.join("inputs"));
        }
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Config::resolve(args(&[]), None).unwrap().log_level(), "warn");
        assert_eq!(Config::resolve(args(&["-vv"]), None).unwrap().log_level(), "debug");
    }
}
