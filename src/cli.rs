//! Command line arguments and parameters management/parsing.
use std::{path::PathBuf, time::Duration};

use bitextprep::{
    error::Error,
    filtering::{QeBackend, RetryPolicy},
    pipelines::{
        config::{PREP_DIR_NAME, PREP_DIR_NAME_BROKEN_UP},
        PreprocessConfig, QeConfig, VocabSelector,
    },
    processing::{CleanOptions, ExitPolicy, PrepOptions},
    vocab::VocabRegistry,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "bitextprep",
    about = "Prepare a parallel corpus directory for translation model training."
)]
/// Preprocessing command and parameters.
///
/// ```sh
/// bitextprep [FLAGS] [OPTIONS] <input-dir>
///
/// ARGS:
///     <input-dir>    directory holding {subset}.{src}-{tgt}.{lang} files
/// ```
pub struct Preprocess {
    #[structopt(
        parse(from_os_str),
        help = "directory holding {subset}.{src}-{tgt}.{lang} files"
    )]
    pub input_dir: PathBuf,

    // quality filtering
    #[structopt(long = "qe", help = "quality estimation backend (mf, keep-all)")]
    pub qe: Option<String>,
    #[structopt(
        long = "qe-dir",
        parse(from_os_str),
        help = "quality filter output. Default is <input-dir>/<backend>"
    )]
    pub qe_dir: Option<PathBuf>,
    #[structopt(
        long = "qe-threshold",
        alias = "qe-thresold",
        default_value = "50",
        help = "maximum accepted risk, in percent"
    )]
    pub qe_threshold: u8,
    #[structopt(long = "qe-token", help = "quality estimation service token")]
    pub qe_token: Option<String>,
    #[structopt(long = "qe-url", help = "quality estimation service endpoint")]
    pub qe_url: Option<String>,
    #[structopt(
        long = "qe-batch-size",
        default_value = "15",
        help = "number of pairs sent per request"
    )]
    pub qe_batch_size: usize,
    #[structopt(
        long = "qe-max-attempts",
        default_value = "10",
        help = "attempts per batch before giving up. 0 retries forever"
    )]
    pub qe_max_attempts: u32,
    #[structopt(
        long = "qe-retry-delay",
        default_value = "10",
        help = "seconds to wait after a failed request"
    )]
    pub qe_retry_delay: u64,
    #[structopt(
        long = "qe-backoff",
        default_value = "1.0",
        help = "retry delay multiplier applied after each failure"
    )]
    pub qe_backoff: f64,
    #[structopt(long = "qe-timeout", help = "request timeout, in seconds")]
    pub qe_timeout: Option<u64>,

    // prep
    #[structopt(
        long = "prep-dir",
        parse(from_os_str),
        help = "prep output. Default is <qe-dir>/FSQ"
    )]
    pub prep_dir: Option<PathBuf>,
    #[structopt(
        long = "vocab",
        default_value = "auto",
        help = "vocab model directory, or auto to pick it from the language pair"
    )]
    pub vocab: String,
    #[structopt(
        long = "vocab-table",
        parse(from_os_str),
        help = "JSON file of {source, target, path} entries used by --vocab auto"
    )]
    pub vocab_table: Option<PathBuf>,
    #[structopt(
        short = "j",
        long = "num-workers",
        default_value = "1",
        help = "number of normalizer/tokenizer workers"
    )]
    pub num_workers: usize,
    #[structopt(
        long = "broken-up-sacremoses-cli",
        help = "name the prep output 'prep' instead of 'FSQ'"
    )]
    pub broken_up_sacremoses_cli: bool,
    #[structopt(
        long = "extended-normalization",
        help = "also normalize quote commas, numbers and pseudo-spaces, and aggressively dash-split"
    )]
    pub extended_normalization: bool,

    // clean
    #[structopt(
        long = "clean-dir",
        parse(from_os_str),
        help = "clean output. Default is <prep-dir>/clean"
    )]
    pub clean_dir: Option<PathBuf>,
    #[structopt(long = "no-clean", help = "skip cleaning")]
    pub no_clean: bool,
    #[structopt(
        long = "ratio",
        default_value = "1.5",
        help = "maximum source/target length ratio"
    )]
    pub ratio: f64,
    #[structopt(long = "min-len", default_value = "1", help = "minimum sentence length")]
    pub min_len: usize,
    #[structopt(long = "max-len", default_value = "250", help = "maximum sentence length")]
    pub max_len: usize,

    // binarize
    #[structopt(
        long = "bin-dir",
        parse(from_os_str),
        help = "binarized dataset output. Default is <clean-dir>/bin"
    )]
    pub bin_dir: Option<PathBuf>,
    #[structopt(
        long = "num-bin-shards",
        default_value = "1",
        help = "number of binarization workers"
    )]
    pub num_bin_shards: usize,

    // tools
    #[structopt(
        long = "ignore-exit-status",
        help = "log external tool failures instead of stopping"
    )]
    pub ignore_exit_status: bool,
    #[structopt(long = "sacremoses", parse(from_os_str), default_value = "sacremoses")]
    pub sacremoses: PathBuf,
    #[structopt(long = "fast", parse(from_os_str), default_value = "fast")]
    pub fast: PathBuf,
    #[structopt(
        long = "clean-script",
        parse(from_os_str),
        default_value = "mosesdecoder/scripts/training/clean-corpus-n.perl"
    )]
    pub clean_script: PathBuf,
    #[structopt(
        long = "fairseq-preprocess",
        parse(from_os_str),
        default_value = "fairseq-preprocess"
    )]
    pub fairseq_preprocess: PathBuf,
}

impl Preprocess {
    /// Build the pipeline configuration.
    ///
    /// Fails on unknown backends, invalid vocab selectors and unreadable vocab tables.
    /// Directory conflicts are checked when the pipeline runs.
    pub fn into_config(self) -> Result<PreprocessConfig, Error> {
        let mut config = PreprocessConfig::new(&self.input_dir);

        if let Some(backend) = &self.qe {
            let mut qe = QeConfig::new(backend.parse::<QeBackend>()?);
            qe.threshold = self.qe_threshold;
            qe.token = self.qe_token;
            if let Some(url) = self.qe_url {
                qe.endpoint = url;
            }
            qe.batch_size = self.qe_batch_size;
            qe.retry = RetryPolicy {
                max_attempts: match self.qe_max_attempts {
                    0 => None,
                    n => Some(n),
                },
                delay: Duration::from_secs(self.qe_retry_delay),
                backoff: self.qe_backoff,
            };
            qe.timeout = self.qe_timeout.map(Duration::from_secs);
            config.qe = Some(qe);
        }
        config.qe_dir = self.qe_dir;

        config.prep_dir = self.prep_dir;
        if self.broken_up_sacremoses_cli {
            config.prep_dir_name = PREP_DIR_NAME_BROKEN_UP.to_string();
        } else {
            config.prep_dir_name = PREP_DIR_NAME.to_string();
        }
        config.prep = PrepOptions {
            num_workers: self.num_workers,
            extended_normalization: self.extended_normalization,
        };
        config.vocab = self.vocab.parse::<VocabSelector>()?;
        if let Some(table) = &self.vocab_table {
            config.registry = VocabRegistry::from_json(table)?;
        }

        config.clean = if self.no_clean {
            None
        } else {
            Some(CleanOptions {
                ratio: self.ratio,
                min_len: self.min_len,
                max_len: self.max_len,
            })
        };
        config.clean_dir = self.clean_dir;

        config.bin_dir = self.bin_dir;
        config.bin_workers = self.num_bin_shards;

        config.tools.sacremoses = self.sacremoses;
        config.tools.fast = self.fast;
        config.tools.clean_script = self.clean_script;
        config.tools.fairseq_preprocess = self.fairseq_preprocess;
        config.exit_policy = if self.ignore_exit_status {
            ExitPolicy::Ignore
        } else {
            ExitPolicy::Check
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(args: &[&str]) -> Preprocess {
        Preprocess::from_iter_safe(std::iter::once("bitextprep").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["data"]).into_config().unwrap();
        assert_eq!(config.input_dir, Path::new("data"));
        assert!(config.qe.is_none());
        assert_eq!(config.vocab, VocabSelector::Auto);
        assert_eq!(config.clean, Some(CleanOptions::default()));
        assert_eq!(config.prep_dir_name, "FSQ");
        assert_eq!(config.bin_workers, 1);
        assert_eq!(config.exit_policy, ExitPolicy::Check);
    }

    #[test]
    fn quality_filter() {
        let config = parse(&[
            "data",
            "--qe",
            "mf",
            "--qe-thresold",
            "30",
            "--qe-token",
            "secret",
            "--qe-max-attempts",
            "0",
        ])
        .into_config()
        .unwrap();

        let qe = config.qe.unwrap();
        assert_eq!(qe.backend, QeBackend::ModelFront);
        assert_eq!(qe.threshold, 30);
        assert_eq!(qe.token.as_deref(), Some("secret"));
        assert_eq!(qe.batch_size, 15);
        assert_eq!(qe.retry.max_attempts, None);
        assert_eq!(qe.retry.delay, Duration::from_secs(10));
    }

    #[test]
    fn unsupported_backend() {
        let result = parse(&["data", "--qe", "comet"]).into_config();
        assert!(matches!(result, Err(Error::UnsupportedBackend(_))));
    }

    #[test]
    fn invalid_threshold() {
        assert!(Preprocess::from_iter_safe(["bitextprep", "data", "--qe-threshold", "300"]).is_err());
    }

    #[test]
    fn stages() {
        let config = parse(&[
            "data",
            "--no-clean",
            "--broken-up-sacremoses-cli",
            "--extended-normalization",
            "-j",
            "4",
            "--num-bin-shards",
            "8",
            "--vocab",
            "/models/en-de",
            "--ignore-exit-status",
        ])
        .into_config()
        .unwrap();

        assert!(config.clean.is_none());
        assert_eq!(config.prep_dir_name, "prep");
        assert_eq!(config.prep.num_workers, 4);
        assert!(config.prep.extended_normalization);
        assert_eq!(config.bin_workers, 8);
        assert_eq!(
            config.vocab,
            VocabSelector::Path(PathBuf::from("/models/en-de"))
        );
        assert_eq!(config.exit_policy, ExitPolicy::Ignore);
    }
}
