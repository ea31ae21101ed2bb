/// Core functionality modules
///
/// Recording, semantic search, confidence scoring, the execution gate,
/// bulk transfer and the operations built on top of them.

pub mod executor;
pub mod recorder;
pub mod scorer;
pub mod searcher;
pub mod service;
pub mod transfer;

pub use executor::{ConfirmationSource, ExecutionGate, GateOutcome, ShellExecutor, ShellOutput, SystemShell};
pub use recorder::Recorder;
pub use scorer::Scorer;
pub use searcher::Searcher;
pub use service::{FastCmd, Report};
pub use transfer::{BulkTransfer, ImportSummary, TransferDocument};
