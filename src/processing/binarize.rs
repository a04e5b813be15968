//! Binarization stage.
//!
//! Unlike the other stages, the binarizer runs once, over every present subset.
use log::{info, warn};

use crate::error::Error;
use crate::io::{CorpusDir, SubsetFiles};
use crate::lang::{LanguagePair, Subset};
use crate::vocab::VocabModel;

use super::command::{CommandPipeline, ExitPolicy, Invocation};
use super::stage::Stage;
use super::tools::Toolchain;

pub struct Binarize<'a> {
    pair: LanguagePair,
    vocab: &'a VocabModel,
    tools: &'a Toolchain,
    num_workers: usize,
    exit_policy: ExitPolicy,
}

impl<'a> Binarize<'a> {
    pub fn new(
        pair: &LanguagePair,
        vocab: &'a VocabModel,
        tools: &'a Toolchain,
        num_workers: usize,
        exit_policy: ExitPolicy,
    ) -> Self {
        Self {
            pair: pair.clone(),
            vocab,
            tools,
            num_workers,
            exit_policy,
        }
    }

    pub fn command(&self, input: &CorpusDir, output: &CorpusDir, present: &[Subset]) -> Invocation {
        let (source, target) = (self.pair.source(), self.pair.target());
        present
            .iter()
            .fold(Invocation::new(&self.tools.fairseq_preprocess), |inv, subset| {
                inv.arg(format!("--{}pref", subset))
                    .arg(input.files(*subset).stem)
            })
            .args(["--source-lang", source, "--target-lang", target])
            .arg("--srcdict")
            .arg(self.vocab.dict(source))
            .arg("--tgtdict")
            .arg(self.vocab.dict(target))
            .arg("--destdir")
            .arg(output.root())
            .arg("--workers")
            .arg(self.num_workers.to_string())
            .arg("--multiple-files")
    }
}

impl Stage for Binarize<'_> {
    fn name(&self) -> &'static str {
        "binarize"
    }

    /// Nothing to do per subset.
    fn process(&mut self, _input: &SubsetFiles, _output: &SubsetFiles) -> Result<(), Error> {
        Ok(())
    }

    fn finish(&mut self, input: &CorpusDir, output: &CorpusDir, present: &[Subset]) -> Result<(), Error> {
        if present.is_empty() {
            warn!("no subset found in {:?}, nothing to binarize", input.root());
            return Ok(());
        }
        info!("binarizing {:?} into {:?}", present, output.root());
        CommandPipeline::from(self.command(input, output, present)).run(self.exit_policy)
    }
}
