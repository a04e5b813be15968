//! Language pairs and subsets.
//!
//! Corpus files follow the `{subset}.{source}-{target}.{lang}` naming convention,
//! and a corpus directory is expected to hold files for a single language pair.
//! [detect] infers that pair by looking at filenames only.
use std::{
    collections::BTreeSet,
    fmt,
    path::Path,
    str::FromStr,
};

use log::{debug, warn};
use oxilangtag::LanguageTag;

use crate::error::Error;

/// Corpus partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subset {
    Train,
    Valid,
    Test,
}

impl Subset {
    /// Every subset, in processing order.
    pub const ALL: [Subset; 3] = [Subset::Train, Subset::Valid, Subset::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Valid => "valid",
            Subset::Test => "test",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Subset::Train),
            "valid" => Ok(Subset::Valid),
            "test" => Ok(Subset::Test),
            other => Err(Error::Custom(format!("unknown subset {other:?}"))),
        }
    }
}

/// Translation direction of a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguagePair {
    source: String,
    target: String,
}

impl LanguagePair {
    /// Build a pair. Fails on empty or blank codes.
    pub fn new(source: &str, target: &str) -> Result<Self, Error> {
        Ok(Self {
            source: check_code(source)?,
            target: check_code(target)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Codes are free-form tokens: anything but an empty or blank one is accepted.
/// Codes that are not well-formed language tags only get a warning.
fn check_code(code: &str) -> Result<String, Error> {
    if code.is_empty() || code.contains(char::is_whitespace) {
        return Err(Error::UnknownLang(code.to_string()));
    }
    if LanguageTag::parse(code).is_err() {
        warn!("{:?} is not a well-formed language tag", code);
    }
    Ok(code.to_string())
}

/// Infer the single (source, target) pair used by files in `dir`.
///
/// Files whose subset token is not `train`, `valid` or `test` are skipped with a warning.
/// Fails if a file's language suffix is not one of its own pair, or if the directory
/// does not hold exactly one source code and one target code.
pub fn detect(dir: &Path) -> Result<LanguagePair, Error> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| Error::Custom(format!("invalid directory name: {:?}", dir)))?;
    let pattern = format!("{}/*.*-*.*", glob::Pattern::escape(dir_str));
    debug!("searching for {}", pattern);

    let mut sources = BTreeSet::new();
    let mut targets = BTreeSet::new();

    for path in glob::glob(&pattern)? {
        let path = path?;
        if !path.is_file() {
            continue;
        }
        if let Some((source, target)) = pair_from_filename(&path)? {
            sources.insert(source);
            targets.insert(target);
        }
    }

    if sources.len() == 1 && targets.len() == 1 {
        if let (Some(source), Some(target)) = (sources.first(), targets.first()) {
            return LanguagePair::new(source, target);
        }
    }
    Err(Error::AmbiguousLanguagePair {
        sources: sources.into_iter().collect(),
        targets: targets.into_iter().collect(),
    })
}

/// Extract `(source, target)` from a corpus filename.
///
/// Returns `Ok(None)` for names that should be ignored.
fn pair_from_filename(path: &Path) -> Result<Option<(String, String)>, Error> {
    let filename = match path.file_name().and_then(|f| f.to_str()) {
        Some(f) => f,
        None => {
            warn!("skipping non utf-8 filename {:?}", path);
            return Ok(None);
        }
    };

    let parts: Vec<&str> = filename.split('.').collect();
    let (subset, pair, lang) = match parts.as_slice() {
        [subset, pair, lang] => (*subset, *pair, *lang),
        _ => {
            warn!("{:?} does not look like a corpus file, ignoring", filename);
            return Ok(None);
        }
    };

    if subset.parse::<Subset>().is_err() {
        warn!(
            "found possible subset {:?} that is not `train`, `valid` or `test`, ignoring",
            subset
        );
        return Ok(None);
    }

    let (source, target) = match pair.split_once('-') {
        Some(p) => p,
        None => {
            warn!("{:?} has no language pair, ignoring", filename);
            return Ok(None);
        }
    };

    if lang != source && lang != target {
        return Err(Error::UnexpectedLanguage(path.to_path_buf()));
    }

    Ok(Some((source.to_string(), target.to_string())))
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    #[test]
    fn single_pair() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "train.en-de.en",
                "train.en-de.de",
                "valid.en-de.en",
                "valid.en-de.de",
            ],
        );

        let pair = detect(dir.path()).unwrap();
        assert_eq!(pair.source(), "en");
        assert_eq!(pair.target(), "de");
        assert_eq!(pair.to_string(), "en-de");
    }

    #[test]
    fn two_pairs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["train.en-de.en", "train.en-ru.ru"]);

        match detect(dir.path()) {
            Err(Error::AmbiguousLanguagePair { sources, targets }) => {
                assert_eq!(sources, vec!["en".to_string()]);
                assert_eq!(targets, vec!["de".to_string(), "ru".to_string()]);
            }
            other => panic!("expected ambiguous pair, got {:?}", other),
        }
    }

    #[test]
    fn empty_dir() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            detect(dir.path()),
            Err(Error::AmbiguousLanguagePair { .. })
        ));
    }

    #[test_log::test]
    fn unknown_subset_ignored() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &["train.en-de.en", "train.en-de.de", "dev.fr-es.fr"],
        );

        let pair = detect(dir.path()).unwrap();
        assert_eq!(pair, LanguagePair::new("en", "de").unwrap());
    }

    #[test]
    fn only_unknown_subsets() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["dev.en-de.en", "dev.en-de.de"]);

        assert!(matches!(
            detect(dir.path()),
            Err(Error::AmbiguousLanguagePair { .. })
        ));
    }

    #[test]
    fn language_outside_pair() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["train.en-de.en", "train.en-de.fr"]);

        assert!(matches!(
            detect(dir.path()),
            Err(Error::UnexpectedLanguage(_))
        ));
    }

    #[test]
    fn directories_are_ignored() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["test.en-ru.en", "test.en-ru.ru"]);
        std::fs::create_dir(dir.path().join("train.de-en.de")).unwrap();

        let pair = detect(dir.path()).unwrap();
        assert_eq!(pair, LanguagePair::new("en", "ru").unwrap());
    }

    #[test_log::test]
    fn free_form_codes() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["train.en-zh_cn.en", "train.en-zh_cn.zh_cn"]);

        let pair = detect(dir.path()).unwrap();
        assert_eq!(pair.source(), "en");
        assert_eq!(pair.target(), "zh_cn");
    }

    #[test]
    fn empty_code() {
        assert!(matches!(
            LanguagePair::new("", "de"),
            Err(Error::UnknownLang(_))
        ));
    }

    #[test]
    fn subset_roundtrip() {
        for subset in Subset::ALL {
            assert_eq!(subset.as_str().parse::<Subset>().unwrap(), subset);
        }
        assert!("dev".parse::<Subset>().is_err());
    }
}
