//! Command line errors
use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub struct CliError {
    pub kind: ErrorKind,
}

impl std::error::Error for CliError {}

#[derive(Debug)]
pub enum ErrorKind {
    /// A source unit failed to compile.
    Jack { path: PathBuf, err: jack::JackError },
    Io(std::io::Error),
    Config(serde_yaml::Error),
    /// Path is neither a `.jack` file nor a directory.
    NotSource(PathBuf),
}

impl CliError {
    pub fn jack(path: impl Into<PathBuf>, err: jack::JackError) -> Self {
        Self {
            kind: ErrorKind::Jack { path: path.into(), err },
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jack { path, err } => write!(f, "{}: {err}", path.display()),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::NotSource(path) => write!(f, "{} is not a .jack file or a directory", path.display()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
