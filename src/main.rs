//! # bitextprep
//!
//! Prepares a parallel corpus directory for translation model training.
//!
//! ```sh
//! bitextprep [FLAGS] [OPTIONS] <input-dir>
//! ```
//!
//! Each stage writes into a new directory nested in the previous one by default:
//!
//! ```text
//! data/                       input
//! └── mf/                     quality filtered (with --qe mf)
//!     └── FSQ/                normalized, tokenized, BPE-encoded
//!         └── clean/          cleaned
//!             └── bin/        binarized dataset
//! ```
//!
//! Logging is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
use bitextprep::error::Error;
use bitextprep::pipelines::{Pipeline, Preprocess};
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Preprocess::from_args();
    debug!("cli args\n{:#?}", opt);

    let config = opt.into_config()?;
    let dirs = Preprocess::new(config).run()?;
    debug!("output directories\n{:#?}", dirs);
    Ok(())
}
