//! Ratio and length based cleaning stage.
use std::path::Path;

use log::{info, warn};

use crate::error::Error;
use crate::io::SubsetFiles;
use crate::lang::{LanguagePair, Subset};

use super::command::{CommandPipeline, ExitPolicy, Invocation};
use super::stage::Stage;
use super::tools::Toolchain;

/// Bounds passed to the cleaner.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    /// Maximum length ratio between source and target sentences.
    pub ratio: f64,
    /// Minimum sentence length (in tokens).
    pub min_len: usize,
    /// Maximum sentence length (in tokens).
    pub max_len: usize,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            ratio: 1.5,
            min_len: 1,
            max_len: 250,
        }
    }
}

/// Runs the cleaner jointly on the source/target stem of each subset.
pub struct Clean<'a> {
    pair: LanguagePair,
    tools: &'a Toolchain,
    options: CleanOptions,
    exit_policy: ExitPolicy,
}

impl<'a> Clean<'a> {
    pub fn new(
        pair: &LanguagePair,
        tools: &'a Toolchain,
        options: CleanOptions,
        exit_policy: ExitPolicy,
    ) -> Self {
        Self {
            pair: pair.clone(),
            tools,
            options,
            exit_policy,
        }
    }

    /// `clean -ratio R <in-stem> SRC TGT <out-stem> MIN MAX`
    pub fn command(&self, input_stem: &Path, output_stem: &Path) -> Invocation {
        Invocation::new(&self.tools.clean_script)
            .arg("-ratio")
            .arg(self.options.ratio.to_string())
            .arg(input_stem)
            .args([self.pair.source(), self.pair.target()])
            .arg(output_stem)
            .arg(self.options.min_len.to_string())
            .arg(self.options.max_len.to_string())
    }
}

impl Stage for Clean<'_> {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn process(&mut self, input: &SubsetFiles, output: &SubsetFiles) -> Result<(), Error> {
        info!(
            "[{}] writing cleaned to {:?} and {:?}",
            input.subset, output.source, output.target
        );
        if input.subset == Subset::Test {
            warn!("[{}] Be careful! Filtering some instances from test!", input.subset);
        }

        CommandPipeline::from(self.command(&input.stem, &output.stem)).run(self.exit_policy)
    }
}
