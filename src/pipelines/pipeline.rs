//! Pipeline trait.
use crate::error::Error;

/// Implemented by runnable pipelines, generic over what a run returns
/// (output locations, statistics...).
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
