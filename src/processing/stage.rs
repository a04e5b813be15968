//! Per-subset stage driver.
use std::path::Path;

use log::{debug, info};

use crate::error::Error;
use crate::io::{CorpusDir, SubsetFiles};
use crate::lang::{LanguagePair, Subset};

/// A directory-to-directory processing step.
pub trait Stage {
    fn name(&self) -> &'static str;

    /// Process a subset whose input files both exist.
    fn process(&mut self, input: &SubsetFiles, output: &SubsetFiles) -> Result<(), Error>;

    /// Called once every subset has been processed, with the subsets that were present.
    fn finish(
        &mut self,
        _input: &CorpusDir,
        _output: &CorpusDir,
        _present: &[Subset],
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Runs a [Stage] from an input directory into a new output directory.
///
/// The output directory must not exist beforehand: stages never write into existing results.
#[derive(Debug, Clone)]
pub struct StageRunner {
    input: CorpusDir,
    output: CorpusDir,
}

impl StageRunner {
    pub fn new(input: &Path, output: &Path, pair: &LanguagePair) -> Self {
        Self {
            input: CorpusDir::new(input, pair),
            output: CorpusDir::new(output, pair),
        }
    }

    pub fn input(&self) -> &CorpusDir {
        &self.input
    }

    pub fn output(&self) -> &CorpusDir {
        &self.output
    }

    /// Run `stage` on every present subset, returning the processed ones.
    ///
    /// Subsets with no files are skipped, subsets with a single file are an error.
    pub fn run<S: Stage + ?Sized>(&self, stage: &mut S) -> Result<Vec<Subset>, Error> {
        let output_root = self.output.root();
        if output_root.exists() {
            return Err(Error::OutputAlreadyExists(output_root.to_path_buf()));
        }
        info!(
            "[{}] {:?} -> {:?}",
            stage.name(),
            self.input.root(),
            output_root
        );
        std::fs::create_dir_all(output_root)?;

        let mut present = Vec::with_capacity(Subset::ALL.len());
        for subset in Subset::ALL {
            if !self.input.presence(subset)? {
                debug!("[{}] [{}] nothing to do", stage.name(), subset);
                continue;
            }
            stage.process(&self.input.files(subset), &self.output.files(subset))?;
            present.push(subset);
        }

        stage.finish(&self.input, &self.output, &present)?;
        info!("[{}] done ({} subsets)", stage.name(), present.len());
        Ok(present)
    }
}
