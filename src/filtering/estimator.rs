//! Quality estimation trait and simple estimators.
use std::ops::{Deref, DerefMut};

use log::debug;

use crate::error::Error;

/// Decides whether sentence pairs are worth keeping.
///
/// Estimators holding a resource (a network session for example) must be
/// acquired before use and released afterwards, which [Acquired] takes care of.
pub trait QualityEstimator {
    /// Keep (`true`) or discard (`false`) a single pair.
    fn check(&mut self, source: &str, target: &str) -> Result<bool, Error>;

    /// Check aligned slices, returning one decision per pair in input order.
    fn check_batch(&mut self, sources: &[String], targets: &[String]) -> Result<Vec<bool>, Error> {
        sources
            .iter()
            .zip(targets)
            .map(|(source, target)| self.check(source, target))
            .collect()
    }

    fn acquire(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Must be idempotent.
    fn release(&mut self) {}
}

impl<Q: QualityEstimator + ?Sized> QualityEstimator for Box<Q> {
    fn check(&mut self, source: &str, target: &str) -> Result<bool, Error> {
        (**self).check(source, target)
    }

    fn check_batch(&mut self, sources: &[String], targets: &[String]) -> Result<Vec<bool>, Error> {
        (**self).check_batch(sources, targets)
    }

    fn acquire(&mut self) -> Result<(), Error> {
        (**self).acquire()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Scoped estimator acquisition.
///
/// The estimator is acquired on creation and released when the guard is dropped,
/// be it on success, on error propagation or on panic.
pub struct Acquired<'a, Q: QualityEstimator + ?Sized> {
    inner: &'a mut Q,
}

impl<'a, Q: QualityEstimator + ?Sized> Acquired<'a, Q> {
    pub fn new(inner: &'a mut Q) -> Result<Self, Error> {
        inner.acquire()?;
        debug!("quality estimator acquired");
        Ok(Self { inner })
    }
}

impl<Q: QualityEstimator + ?Sized> Deref for Acquired<'_, Q> {
    type Target = Q;

    fn deref(&self) -> &Q {
        self.inner
    }
}

impl<Q: QualityEstimator + ?Sized> DerefMut for Acquired<'_, Q> {
    fn deref_mut(&mut self) -> &mut Q {
        self.inner
    }
}

impl<Q: QualityEstimator + ?Sized> Drop for Acquired<'_, Q> {
    fn drop(&mut self) {
        self.inner.release();
        debug!("quality estimator released");
    }
}

/// Keeps every pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepAll;

impl QualityEstimator for KeepAll {
    fn check(&mut self, _source: &str, _target: &str) -> Result<bool, Error> {
        Ok(true)
    }
}

/// Per-line estimator backed by a closure.
pub struct PerLine<F> {
    predicate: F,
}

impl<F> PerLine<F>
where
    F: FnMut(&str, &str) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> QualityEstimator for PerLine<F>
where
    F: FnMut(&str, &str) -> bool,
{
    fn check(&mut self, source: &str, target: &str) -> Result<bool, Error> {
        Ok((self.predicate)(source, target))
    }
}
