/*!
# IO utilities

Corpus directory layout ([corpus]) and aligned reading of sentence pairs ([reader]).
!*/
pub mod corpus;
pub mod reader;

pub use corpus::{CorpusDir, SubsetFiles};
pub use reader::{Batch, ParallelReader};
