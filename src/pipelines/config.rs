/*! Preprocessing configuration

[PreprocessConfig] holds everything the orchestrator needs. It is plain data:
the CLI fills it, library users can build it directly.
!*/
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::error::Error;
use crate::filtering::{
    networked::{HttpConnector, DEFAULT_ENDPOINT},
    KeepAll, NetworkedEstimator, QeBackend, QualityEstimator, RetryPolicy,
};
use crate::lang::LanguagePair;
use crate::processing::{CleanOptions, ExitPolicy, PrepOptions, Toolchain, DEFAULT_BATCH_SIZE};
use crate::vocab::{VocabModel, VocabRegistry};

/// Default name of the prep output directory.
pub const PREP_DIR_NAME: &str = "FSQ";
/// Prep output directory name used with the broken-up sacremoses CLI.
pub const PREP_DIR_NAME_BROKEN_UP: &str = "prep";
pub const CLEAN_DIR_NAME: &str = "clean";
pub const BIN_DIR_NAME: &str = "bin";

/// How to find the vocab model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabSelector {
    /// Look the detected language pair up in the registry.
    Auto,
    Path(PathBuf),
}

impl FromStr for VocabSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(VocabSelector::Auto),
            "" => Err(Error::InvalidConfig("empty vocab model path".to_string())),
            path => Ok(VocabSelector::Path(PathBuf::from(path))),
        }
    }
}

impl VocabSelector {
    pub fn resolve(&self, registry: &VocabRegistry, pair: &LanguagePair) -> Result<VocabModel, Error> {
        match self {
            VocabSelector::Auto => registry.resolve(pair),
            VocabSelector::Path(path) => Ok(VocabModel::new(path)),
        }
    }
}

/// Quality estimation settings.
#[derive(Debug, Clone)]
pub struct QeConfig {
    pub backend: QeBackend,
    /// Risk threshold, in percent.
    pub threshold: u8,
    pub token: Option<String>,
    pub endpoint: String,
    pub batch_size: usize,
    pub retry: RetryPolicy,
    pub timeout: Option<Duration>,
}

impl QeConfig {
    pub fn new(backend: QeBackend) -> Self {
        Self {
            backend,
            threshold: 50,
            token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }

    /// Build the selected estimator for `pair`. It still has to be acquired.
    pub fn estimator(&self, pair: &LanguagePair) -> Result<Box<dyn QualityEstimator>, Error> {
        match self.backend {
            QeBackend::KeepAll => Ok(Box::new(KeepAll)),
            QeBackend::ModelFront => {
                let mut connector = HttpConnector::default();
                if let Some(timeout) = self.timeout {
                    connector = connector.timeout(timeout);
                }
                let estimator = NetworkedEstimator::with_endpoint(
                    &self.endpoint,
                    pair,
                    self.threshold,
                    self.token.as_deref(),
                )?
                .retry(self.retry.clone())
                .connector(connector);
                Ok(Box::new(estimator))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub input_dir: PathBuf,

    pub qe: Option<QeConfig>,
    pub qe_dir: Option<PathBuf>,

    pub prep_dir: Option<PathBuf>,
    /// Name of the prep directory when `prep_dir` is not set.
    pub prep_dir_name: String,
    pub prep: PrepOptions,
    pub vocab: VocabSelector,
    pub registry: VocabRegistry,

    /// `None` disables cleaning.
    pub clean: Option<CleanOptions>,
    pub clean_dir: Option<PathBuf>,

    pub bin_dir: Option<PathBuf>,
    pub bin_workers: usize,

    pub tools: Toolchain,
    pub exit_policy: ExitPolicy,
}

impl PreprocessConfig {
    /// Default configuration: no quality filtering, cleaning enabled, automatic vocab model.
    pub fn new(input_dir: &Path) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            qe: None,
            qe_dir: None,
            prep_dir: None,
            prep_dir_name: PREP_DIR_NAME.to_string(),
            prep: PrepOptions::default(),
            vocab: VocabSelector::Auto,
            registry: VocabRegistry::builtin(),
            clean: Some(CleanOptions::default()),
            clean_dir: None,
            bin_dir: None,
            bin_workers: 1,
            tools: Toolchain::default(),
            exit_policy: ExitPolicy::Check,
        }
    }
}

/// Output directories of each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub input: PathBuf,
    /// Filter output, equal to `input` without quality filtering.
    pub qe: PathBuf,
    pub prep: PathBuf,
    /// Clean output, equal to `prep` when cleaning is disabled.
    pub clean: PathBuf,
    pub bin: PathBuf,
}

impl Directories {
    /// Resolve defaults, each directory being nested in the previous stage's one.
    pub fn resolve(config: &PreprocessConfig) -> Result<Self, Error> {
        let input = config.input_dir.clone();

        let qe = match (&config.qe, &config.qe_dir) {
            (None, Some(_)) => {
                return Err(Error::InvalidConfig(
                    "a quality filter directory was given without a quality filter".to_string(),
                ))
            }
            (None, None) => input.clone(),
            (Some(_), Some(dir)) => dir.clone(),
            (Some(qe), None) => input.join(qe.backend.name()),
        };

        let prep = config
            .prep_dir
            .clone()
            .unwrap_or_else(|| qe.join(&config.prep_dir_name));

        let clean = match (&config.clean, &config.clean_dir) {
            (None, Some(_)) => {
                return Err(Error::InvalidConfig(
                    "a clean directory was given while cleaning is disabled".to_string(),
                ))
            }
            (None, None) => prep.clone(),
            (Some(_), Some(dir)) => dir.clone(),
            (Some(_), None) => prep.join(CLEAN_DIR_NAME),
        };

        let bin = config
            .bin_dir
            .clone()
            .unwrap_or_else(|| clean.join(BIN_DIR_NAME));

        Ok(Self {
            input,
            qe,
            prep,
            clean,
            bin,
        })
    }
}
