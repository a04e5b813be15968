//! Parallel corpus preprocessing pipeline
//!
//! Prepares a directory of `{subset}.{source}-{target}.{lang}` files for translation model training.
//!
//! # Processing
//! 1. The language pair is detected from filenames, and the vocab model is resolved.
//! 1. (optional) Pairs go through a quality estimator, and only accepted ones are kept.
//! 1. Each file is normalized, tokenized and BPE-encoded.
//! 1. (optional) Pairs with unbalanced or out-of-bounds lengths are removed.
//! 1. Subsets are binarized into the final dataset.
//!
//! Each stage writes into a new directory, which becomes the next stage's input.
use log::{info, warn};

use crate::error::Error;
use crate::filtering::{Acquired, QualityEstimator};
use crate::lang::{self, LanguagePair};
use crate::processing::{Binarize, Clean, Filter, Prep, StageRunner, DEFAULT_BATCH_SIZE};
use crate::vocab::VocabModel;

use super::config::{Directories, PreprocessConfig};
use super::pipeline::Pipeline;

pub struct Preprocess {
    config: PreprocessConfig,
}

impl Preprocess {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Run with a caller-provided estimator instead of the configured one.
    ///
    /// `estimator` and `config.qe` go together: quality filtering happens when both are set
    /// (`config.qe` gives the output directory and batch size), and is skipped when neither is.
    /// The estimator is acquired before filtering and released right after, whatever the outcome.
    pub fn run_with(&self, estimator: Option<&mut dyn QualityEstimator>) -> Result<Directories, Error> {
        match (&estimator, &self.config.qe) {
            (Some(_), None) => {
                return Err(Error::InvalidConfig(
                    "an estimator was given without quality filter settings".to_string(),
                ))
            }
            (None, Some(qe)) => {
                return Err(Error::InvalidConfig(format!(
                    "quality filtering with {} is configured but no estimator was given",
                    qe.backend
                )))
            }
            _ => (),
        }
        let dirs = Directories::resolve(&self.config)?;
        let pair = lang::detect(&dirs.input)?;
        info!("detected language pair {}", pair);

        let vocab = self.config.vocab.resolve(&self.config.registry, &pair)?;
        info!("using vocab model {:?}", vocab.root());
        vocab.check(&pair);

        if let Some(estimator) = estimator {
            self.filter(&dirs, &pair, estimator)?;
        }
        self.prep(&dirs, &pair, &vocab)?;
        if self.config.clean.is_some() {
            self.clean(&dirs, &pair)?;
        }
        self.binarize(&dirs, &pair, &vocab)?;

        info!("dataset written to {:?}", dirs.bin);
        Ok(dirs)
    }

    fn filter(
        &self,
        dirs: &Directories,
        pair: &LanguagePair,
        estimator: &mut dyn QualityEstimator,
    ) -> Result<(), Error> {
        let batch_size = self
            .config
            .qe
            .as_ref()
            .map_or(DEFAULT_BATCH_SIZE, |qe| qe.batch_size);

        let mut estimator = Acquired::new(estimator)?;
        let mut filter = Filter::new(&mut *estimator, batch_size);
        StageRunner::new(&dirs.input, &dirs.qe, pair).run(&mut filter)?;
        Ok(())
    }

    fn prep(&self, dirs: &Directories, pair: &LanguagePair, vocab: &VocabModel) -> Result<(), Error> {
        let mut prep = Prep::new(
            pair,
            vocab,
            &self.config.tools,
            self.config.prep.clone(),
            self.config.exit_policy,
        );
        StageRunner::new(&dirs.qe, &dirs.prep, pair).run(&mut prep)?;
        Ok(())
    }

    fn clean(&self, dirs: &Directories, pair: &LanguagePair) -> Result<(), Error> {
        let options = match &self.config.clean {
            Some(options) => options.clone(),
            None => return Ok(()),
        };
        let mut clean = Clean::new(pair, &self.config.tools, options, self.config.exit_policy);
        StageRunner::new(&dirs.prep, &dirs.clean, pair).run(&mut clean)?;
        Ok(())
    }

    fn binarize(&self, dirs: &Directories, pair: &LanguagePair, vocab: &VocabModel) -> Result<(), Error> {
        if self.config.bin_workers == 0 {
            warn!("0 binarization workers requested, using 1");
        }
        let mut binarize = Binarize::new(
            pair,
            vocab,
            &self.config.tools,
            self.config.bin_workers.max(1),
            self.config.exit_policy,
        );
        StageRunner::new(&dirs.clean, &dirs.bin, pair).run(&mut binarize)?;
        Ok(())
    }
}

impl Pipeline<Directories> for Preprocess {
    /// Run with the configured estimator, if any.
    fn run(&self) -> Result<Directories, Error> {
        match &self.config.qe {
            Some(qe) => {
                // language pair is needed to build the estimator
                let pair = lang::detect(&self.config.input_dir)?;
                let mut estimator = qe.estimator(&pair)?;
                self.run_with(Some(estimator.as_mut()))
            }
            None => self.run_with(None),
        }
    }
}
