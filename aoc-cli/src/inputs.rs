//! Puzzle inputs read from a local directory

use crate::error::InputError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-based store of puzzle inputs
///
/// Directory structure: `{input_dir}/{year}_day{day:02}.txt`
pub struct InputStore {
    input_dir: PathBuf,
    /// Single file that replaces the directory lookup
    single: Option<PathBuf>,
}

impl InputStore {
    pub fn new(input_dir: PathBuf) -> Self {
        Self {
            input_dir,
            single: None,
        }
    }

    /// Serve every request from `path`
    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.single = Some(path);
        self
    }

    /// Get the input path for a specific year/day
    pub fn input_path(&self, year: u16, day: u8) -> PathBuf {
        match &self.single {
            Some(path) => path.clone(),
            None => self.input_dir.join(format!("{}_day{:02}.txt", year, day)),
        }
    }

    /// Check if the input file exists
    pub fn contains(&self, year: u16, day: u8) -> bool {
        self.input_path(year, day).is_file()
    }

    /// Read the input for a year/day
    pub fn read(&self, year: u16, day: u8) -> Result<String, InputError> {
        let path = self.input_path(year, day);
        fs::read_to_string(&path).map_err(|e| read_error(year, day, &path, e))
    }
}

fn read_error(year: u16, day: u8, path: &Path, err: io::Error) -> InputError {
    if err.kind() == io::ErrorKind::NotFound {
        InputError::Missing {
            year,
            day,
            path: path.to_path_buf(),
        }
    } else {
        InputError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
