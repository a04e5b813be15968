/*! Quality filtering stage

Reads each subset in batches, asks a [QualityEstimator] for decisions and writes
kept pairs only, keeping source and target outputs aligned.
!*/
use std::{
    fs::File,
    io::{BufWriter, Write},
};

use log::{info, warn};

use crate::error::Error;
use crate::filtering::QualityEstimator;
use crate::io::{ParallelReader, SubsetFiles};
use crate::lang::Subset;

use super::stage::Stage;

pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Log progress every `PROGRESS_EVERY` batches.
const PROGRESS_EVERY: usize = 100;

/// Counts for one subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub kept: usize,
}

/// Filtering stage. The estimator is expected to be acquired already.
pub struct Filter<'a, Q: QualityEstimator + ?Sized> {
    estimator: &'a mut Q,
    batch_size: usize,
    stats: Vec<(Subset, FilterStats)>,
}

impl<'a, Q: QualityEstimator + ?Sized> Filter<'a, Q> {
    pub fn new(estimator: &'a mut Q, batch_size: usize) -> Self {
        Self {
            estimator,
            batch_size,
            stats: Vec::new(),
        }
    }

    /// Per-subset counts of processed subsets.
    pub fn stats(&self) -> &[(Subset, FilterStats)] {
        &self.stats
    }
}

impl<Q: QualityEstimator + ?Sized> Stage for Filter<'_, Q> {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn process(&mut self, input: &SubsetFiles, output: &SubsetFiles) -> Result<(), Error> {
        let subset = input.subset;
        if subset == Subset::Test {
            warn!("[{}] Be careful! Filtering some instances from test!", subset);
        }
        info!(
            "[{}] writing filtered to {:?} and {:?}",
            subset, output.source, output.target
        );

        let reader = ParallelReader::from_paths(&input.source, &input.target, self.batch_size)?;
        let mut source_out = BufWriter::new(File::create(&output.source)?);
        let mut target_out = BufWriter::new(File::create(&output.target)?);
        let mut stats = FilterStats::default();

        for (idx, batch) in reader.enumerate() {
            let batch = batch?;
            let decisions = self
                .estimator
                .check_batch(&batch.sources, &batch.targets)?;
            if decisions.len() != batch.len() {
                return Err(Error::QeResponse(format!(
                    "got {} decisions for {} pairs",
                    decisions.len(),
                    batch.len()
                )));
            }

            for ((source, target), keep) in batch.pairs().zip(decisions) {
                if keep {
                    writeln!(source_out, "{}", source)?;
                    writeln!(target_out, "{}", target)?;
                    stats.kept += 1;
                }
            }
            stats.total += batch.len();

            if (idx + 1) % PROGRESS_EVERY == 0 {
                info!("[{}] {}/{} pairs kept so far", subset, stats.kept, stats.total);
            }
        }

        source_out.flush()?;
        target_out.flush()?;
        info!("[{}] kept {}/{} pairs", subset, stats.kept, stats.total);
        self.stats.push((subset, stats));
        Ok(())
    }
}
