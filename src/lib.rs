/*! # bitextprep

Preparation pipeline for parallel corpora used in machine translation training.

A corpus directory holds `{subset}.{source}-{target}.{lang}` files
(for example `train.en-de.en` and `train.en-de.de`).
[pipelines::Preprocess] takes it through optional quality filtering, normalization/tokenization/BPE,
optional cleaning and binarization, each stage writing into its own directory.
!*/
pub mod error;
pub mod filtering;
pub mod io;
pub mod lang;
pub mod pipelines;
pub mod processing;
pub mod vocab;
