/*! Vocab models

A vocab model is a directory holding, for each language, a BPE code table (`bpecodes.{lang}`)
and a dictionary (`dict.{lang}.txt`).

Models are looked up by language pair in a [VocabRegistry], which is either the builtin
one or loaded from a JSON file:
```json
[{"source": "en", "target": "de", "path": "/pretrained/wmt19.en-de.joined-dict.single_model"}]
```
!*/
use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::Error;
use crate::lang::LanguagePair;

/// Resolved vocab model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabModel {
    root: PathBuf,
}

impl VocabModel {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subword code table of `lang`.
    pub fn bpecodes(&self, lang: &str) -> PathBuf {
        self.root.join(format!("bpecodes.{}", lang))
    }

    /// Dictionary of `lang`.
    pub fn dict(&self, lang: &str) -> PathBuf {
        self.root.join(format!("dict.{}.txt", lang))
    }

    /// Warn about missing files for `pair`. Does not fail since tools will complain anyway.
    pub fn check(&self, pair: &LanguagePair) -> bool {
        let mut complete = true;
        for lang in [pair.source(), pair.target()] {
            for path in [self.bpecodes(lang), self.dict(lang)] {
                if !path.is_file() {
                    warn!("vocab model file {:?} not found", path);
                    complete = false;
                }
            }
        }
        complete
    }
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    source: String,
    target: String,
    path: PathBuf,
}

/// Language pair to vocab model lookup table.
#[derive(Debug, Clone, Default)]
pub struct VocabRegistry {
    models: HashMap<LanguagePair, PathBuf>,
}

impl VocabRegistry {
    /// Table of the pretrained WMT19 models.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (source, target, path) in [
            ("en", "de", "/pretrained/wmt19.en-de.joined-dict.single_model"),
            ("de", "en", "/pretrained/wmt19.de-en.joined-dict.single_model"),
            ("en", "ru", "/pretrained/wmt19.en-ru.single_model"),
            ("ru", "en", "/pretrained/wmt19.ru-en.single_model"),
        ] {
            if let Ok(pair) = LanguagePair::new(source, target) {
                registry.insert(pair, Path::new(path));
            }
        }
        registry
    }

    /// Load a table from a JSON file (list of `{source, target, path}` objects).
    pub fn from_json(path: &Path) -> Result<Self, Error> {
        debug!("loading vocab table from {:?}", path);
        let entries: Vec<RegistryEntry> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let mut registry = Self::default();
        for entry in entries {
            let pair = LanguagePair::new(&entry.source, &entry.target)?;
            registry.insert(pair, &entry.path);
        }
        Ok(registry)
    }

    /// Add or replace the model of `pair`.
    pub fn insert(&mut self, pair: LanguagePair, path: &Path) {
        self.models.insert(pair, path.to_path_buf());
    }

    pub fn lookup(&self, pair: &LanguagePair) -> Option<VocabModel> {
        self.models.get(pair).map(|p| VocabModel::new(p))
    }

    pub fn resolve(&self, pair: &LanguagePair) -> Result<VocabModel, Error> {
        self.lookup(pair)
            .ok_or_else(|| Error::UnknownLanguagePair(pair.clone()))
    }
}
