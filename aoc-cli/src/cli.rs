//! CLI argument parsing using clap

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Parallelization level for solver execution
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum ParallelizeBy {
    /// No parallelization; execute all solvers sequentially in order
    Sequential,
    /// Parallelize across year/day combinations; parts share one parse (default)
    #[default]
    Day,
    /// Parallelize across all year/day/part combinations; each part parses its own input
    Part,
}

/// Advent of Code solver runner
#[derive(Parser, Debug)]
#[command(name = "aoc", about = "Run Advent of Code solvers", version)]
pub struct Args {
    /// Year to run (runs all years if omitted)
    #[arg(short, long)]
    pub year: Option<u16>,

    /// Day to run (runs all days if omitted)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=25))]
    pub day: Option<u8>,

    /// Part to run (runs all parts if omitted)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub part: Option<u8>,

    /// Tags to filter solvers (comma-separated, all must match)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Directory holding `{year}_day{day:02}.txt` inputs
    /// [default: $AOC_INPUT_DIR or ~/.cache/aoc_solver/inputs]
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Read this file instead of the input directory (requires --year and --day)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of threads for parallel execution
    #[arg(long)]
    pub threads: Option<usize>,

    /// Parallelization level: sequential, day, or part
    #[arg(long, value_enum, default_value = "day")]
    pub parallelize_by: ParallelizeBy,

    /// Quiet mode - only output answers
    #[arg(short, long)]
    pub quiet: bool,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["aoc"]).unwrap();
        assert_eq!(args.parallelize_by, ParallelizeBy::Day);
        assert!(args.tags.is_empty());
        assert_eq!(args.verbose, 0);
        assert!(args.input_dir.is_none());
    }

    #[test]
    fn test_filters_and_flags() {
        let args = Args::try_parse_from([
            "aoc",
            "-y",
            "2023",
            "-d",
            "20",
            "--tags",
            "pulse,lcm",
            "--parallelize-by",
            "part",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.year, Some(2023));
        assert_eq!(args.day, Some(20));
        assert_eq!(args.tags, ["pulse", "lcm"]);
        assert_eq!(args.parallelize_by, ParallelizeBy::Part);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_rejects_out_of_range_day() {
        assert!(Args::try_parse_from(["aoc", "--day", "26"]).is_err());
        assert!(Args::try_parse_from(["aoc", "--part", "3"]).is_err());
    }
}
