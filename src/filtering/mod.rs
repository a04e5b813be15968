/*! Quality estimation

Sentence pairs go through a [QualityEstimator] which decides, for each of them,
whether it is kept or discarded. Source and target lines are always kept or discarded together.

Estimators:
- [KeepAll] keeps everything,
- [PerLine] wraps a per-pair predicate,
- [NetworkedEstimator] queries a remote scoring service in batches.

Estimators that hold a resource are used through an [Acquired] guard.
!*/
use std::{fmt, str::FromStr};

use crate::error::Error;

mod estimator;
pub mod networked;
mod retry;

pub use estimator::{Acquired, KeepAll, PerLine, QualityEstimator};
pub use networked::NetworkedEstimator;
pub use retry::RetryPolicy;

/// Selectable estimator backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QeBackend {
    /// Remote scoring service (`mf`).
    ModelFront,
    /// Keep every pair (`keep-all`).
    KeepAll,
}

impl QeBackend {
    /// Name used as the default output directory.
    pub fn name(&self) -> &'static str {
        match self {
            QeBackend::ModelFront => "mf",
            QeBackend::KeepAll => "keep-all",
        }
    }
}

impl fmt::Display for QeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QeBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mf" => Ok(QeBackend::ModelFront),
            "keep-all" => Ok(QeBackend::KeepAll),
            other => Err(Error::UnsupportedBackend(other.to_string())),
        }
    }
}
