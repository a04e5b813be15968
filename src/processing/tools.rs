//! Locations of the external tools.
use std::path::PathBuf;

/// Programs invoked by the stages. Bare names are looked up in `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Normalizer and tokenizer.
    pub sacremoses: PathBuf,
    /// BPE applier (`fast applybpe_stream`).
    pub fast: PathBuf,
    /// Ratio/length based corpus cleaner.
    pub clean_script: PathBuf,
    /// Binarizer.
    pub fairseq_preprocess: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            sacremoses: PathBuf::from("sacremoses"),
            fast: PathBuf::from("fast"),
            clean_script: PathBuf::from("mosesdecoder/scripts/training/clean-corpus-n.perl"),
            fairseq_preprocess: PathBuf::from("fairseq-preprocess"),
        }
    }
}
