//! Error enum
use std::fmt;
use std::path::PathBuf;

use crate::lang::{LanguagePair, Subset};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Http(reqwest::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    Custom(String),

    /// Detection found zero or several source/target codes.
    AmbiguousLanguagePair {
        sources: Vec<String>,
        targets: Vec<String>,
    },
    /// File whose language suffix is neither side of its own pair.
    UnexpectedLanguage(PathBuf),
    /// Language code that does not parse as a language tag.
    UnknownLang(String),
    /// Only one of the two files of a subset exists.
    AsymmetricSubsetFiles {
        subset: Subset,
        present: PathBuf,
        missing: PathBuf,
    },
    OutputAlreadyExists(PathBuf),
    UnsupportedBackend(String),
    SessionNotOpen,
    UnknownLanguagePair(LanguagePair),
    /// External tool exited with a non-zero status (`None` when killed by a signal).
    StageExecution {
        program: String,
        status: Option<i32>,
    },
    Spawn {
        program: String,
        source: std::io::Error,
    },
    RetriesExhausted {
        attempts: u32,
        last_failure: String,
    },
    QeResponse(String),
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Serde(e) => write!(f, "json error: {e}"),
            Error::Http(e) => write!(f, "http error: {e}"),
            Error::Glob(e) => write!(f, "glob error: {e}"),
            Error::GlobPattern(e) => write!(f, "glob pattern error: {e}"),
            Error::Custom(s) => write!(f, "{s}"),
            Error::AmbiguousLanguagePair { sources, targets } => write!(
                f,
                "could not infer a single language pair (sources: {sources:?}, targets: {targets:?})"
            ),
            Error::UnexpectedLanguage(path) => write!(
                f,
                "{path:?}: language suffix matches neither side of the pair"
            ),
            Error::UnknownLang(code) => write!(f, "unknown language code {code:?}"),
            Error::AsymmetricSubsetFiles {
                subset,
                present,
                missing,
            } => write!(f, "[{subset}] {present:?} exists but {missing:?} does not"),
            Error::OutputAlreadyExists(path) => {
                write!(f, "output directory {path:?} already exists")
            }
            Error::UnsupportedBackend(name) => {
                write!(f, "unsupported quality estimation backend {name:?}")
            }
            Error::SessionNotOpen => write!(
                f,
                "quality estimation session is not open, acquire the estimator first"
            ),
            Error::UnknownLanguagePair(pair) => {
                write!(f, "no vocab model configured for {pair}")
            }
            Error::StageExecution { program, status } => match status {
                Some(code) => write!(f, "{program} exited with status {code}"),
                None => write!(f, "{program} was terminated by a signal"),
            },
            Error::Spawn { program, source } => write!(f, "could not run {program}: {source}"),
            Error::RetriesExhausted {
                attempts,
                last_failure,
            } => write!(
                f,
                "gave up after {attempts} attempts (last failure: {last_failure})"
            ),
            Error::QeResponse(s) => write!(f, "invalid quality estimation response: {s}"),
            Error::InvalidConfig(s) => write!(f, "invalid configuration: {s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Http(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
