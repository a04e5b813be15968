/*! Corpus directory layout

A corpus directory holds, for each [Subset], a source-language and a target-language file
named `{subset}.{source}-{target}.{lang}`. Both files share the `{subset}.{source}-{target}` stem,
which is what the cleaning and binarizing tools expect as input.
!*/
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Error;
use crate::lang::{LanguagePair, Subset};

/// Paths of one subset in a corpus directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetFiles {
    pub subset: Subset,
    pub stem: PathBuf,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// A directory following the corpus naming convention for a given [LanguagePair].
#[derive(Debug, Clone)]
pub struct CorpusDir {
    root: PathBuf,
    pair: LanguagePair,
}

impl CorpusDir {
    pub fn new(root: &Path, pair: &LanguagePair) -> Self {
        Self {
            root: root.to_path_buf(),
            pair: pair.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    /// Get the paths of `subset`, whether they exist or not.
    pub fn files(&self, subset: Subset) -> SubsetFiles {
        let stem = format!("{}.{}", subset, self.pair);
        SubsetFiles {
            subset,
            stem: self.root.join(&stem),
            source: self.root.join(format!("{}.{}", stem, self.pair.source())),
            target: self.root.join(format!("{}.{}", stem, self.pair.target())),
        }
    }

    /// Check whether `subset` is present.
    ///
    /// Returns `Ok(true)` if both files exist, `Ok(false)` if neither does,
    /// and fails if only one of them is there.
    pub fn presence(&self, subset: Subset) -> Result<bool, Error> {
        let files = self.files(subset);
        match (files.source.exists(), files.target.exists()) {
            (true, true) => Ok(true),
            (false, false) => {
                debug!("[{}] no files in {:?}", subset, self.root);
                Ok(false)
            }
            (true, false) => Err(Error::AsymmetricSubsetFiles {
                subset,
                present: files.source,
                missing: files.target,
            }),
            (false, true) => Err(Error::AsymmetricSubsetFiles {
                subset,
                present: files.target,
                missing: files.source,
            }),
        }
    }
}
