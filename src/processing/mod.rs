/*! Processing stages

Every stage reads a corpus directory and writes a new one, subset by subset, through a [StageRunner]:
- [Filter] keeps pairs accepted by a quality estimator,
- [Prep] normalizes, tokenizes and applies BPE to each file,
- [Clean] removes pairs with unbalanced or out-of-bounds lengths,
- [Binarize] builds the final training dataset.

The NLP work itself is done by external tools (see [command] and [Toolchain]).
!*/
mod binarize;
mod clean;
pub mod command;
mod filter;
mod prep;
mod stage;
mod tools;

pub use binarize::Binarize;
pub use clean::{Clean, CleanOptions};
pub use command::{CommandPipeline, ExitPolicy, Invocation};
pub use filter::{Filter, FilterStats, DEFAULT_BATCH_SIZE};
pub use prep::{Prep, PrepOptions};
pub use stage::{Stage, StageRunner};
pub use tools::Toolchain;
