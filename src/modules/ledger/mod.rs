pub mod models;
pub mod snapshot;
pub mod store;

pub use models::{BranchConfig, ReferenceData, TransactionKind, TransactionRecord, WorkerRef};
pub use snapshot::{LedgerSnapshot, RawTransactionRow};
pub use store::LedgerStore;
