/*! Tokenization and subword encoding stage

Each file of a subset (source, then target) goes through
`normalize | tokenize | apply BPE`, independently from the other.
!*/
use std::path::Path;

use log::info;

use crate::error::Error;
use crate::io::SubsetFiles;
use crate::lang::LanguagePair;
use crate::vocab::VocabModel;

use super::command::{CommandPipeline, ExitPolicy, Invocation};
use super::stage::Stage;
use super::tools::Toolchain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepOptions {
    /// Worker count passed to the normalizer and tokenizer.
    pub num_workers: usize,
    /// Normalize quotes/commas and numbers, and do not escape special characters.
    pub extended_normalization: bool,
}

impl Default for PrepOptions {
    fn default() -> Self {
        Self {
            num_workers: 1,
            extended_normalization: false,
        }
    }
}

pub struct Prep<'a> {
    pair: LanguagePair,
    vocab: &'a VocabModel,
    tools: &'a Toolchain,
    options: PrepOptions,
    exit_policy: ExitPolicy,
}

impl<'a> Prep<'a> {
    pub fn new(
        pair: &LanguagePair,
        vocab: &'a VocabModel,
        tools: &'a Toolchain,
        options: PrepOptions,
        exit_policy: ExitPolicy,
    ) -> Self {
        Self {
            pair: pair.clone(),
            vocab,
            tools,
            options,
            exit_policy,
        }
    }

    /// Build the command chain processing `input` (in `lang`) into `output`.
    pub fn commands(&self, lang: &str, input: &Path, output: &Path) -> CommandPipeline {
        let workers = self.options.num_workers.to_string();
        let extended = self.options.extended_normalization;

        let normalize = Invocation::new(&self.tools.sacremoses)
            .args(["-l", lang, "-j", workers.as_str(), "--quiet", "normalize"])
            .arg_if(extended, "--normalize-quote-commas")
            .arg_if(extended, "--normalize-numbers")
            .args(["--replace-unicode-puncts", "--remove-control-chars"]);

        let tokenize = Invocation::new(&self.tools.sacremoses)
            .args(["-l", lang, "-j", workers.as_str(), "tokenize"])
            .arg_if(extended, "-x")
            .arg("--aggressive-dash-splits");

        let apply_bpe = Invocation::new(&self.tools.fast)
            .arg("applybpe_stream")
            .arg(self.vocab.bpecodes(lang))
            .arg(self.vocab.dict(lang));

        CommandPipeline::new(vec![normalize, tokenize, apply_bpe])
            .stdin(input)
            .stdout(output)
    }
}

impl Stage for Prep<'_> {
    fn name(&self) -> &'static str {
        "prep"
    }

    fn process(&mut self, input: &SubsetFiles, output: &SubsetFiles) -> Result<(), Error> {
        for (lang, src, dst) in [
            (self.pair.source(), &input.source, &output.source),
            (self.pair.target(), &input.target, &output.target),
        ] {
            info!("[{}] writing preprocessed to {:?}...", input.subset, dst);
            self.commands(lang, src, dst).run(self.exit_policy)?;
        }
        Ok(())
    }
}
