//! Logger setup
//!
//! The terminal surface owns the tty (raw mode, alternate screen), so while it
//! is up log records go to a file instead of stderr.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target, WriteStyle};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Where log records are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Appended to this file
    File(PathBuf),
}

impl LogOutput {
    /// Stderr for headless runs, `log_file` when the terminal surface is drawn
    pub fn choose(headless: bool, log_file: &Path) -> Self {
        if headless {
            LogOutput::Stderr
        } else {
            LogOutput::File(log_file.to_path_buf())
        }
    }

    /// Configured builder; opening the log file is the only failure
    pub fn builder(&self) -> io::Result<Builder> {
        let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
        if let LogOutput::File(path) = self {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.write_style(WriteStyle::Never);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_terminal_runs_log_to_file() {
        let path = Path::new("run.log");
        assert_eq!(LogOutput::choose(true, path), LogOutput::Stderr);
        assert_eq!(LogOutput::choose(false, path), LogOutput::File(path.to_path_buf()));
    }

    #[test]
    fn test_file_output_receives_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = LogOutput::File(path.clone()).builder().unwrap().build();
        logger.log(
            &log::Record::builder()
                .args(format_args!("generation 3 finished"))
                .level(log::Level::Error)
                .target("flappy_neuro")
                .build(),
        );
        logger.flush();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("generation 3 finished"));
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = LogOutput::File(dir.path().join("missing").join("run.log"));
        assert!(output.builder().is_err());
    }
}
