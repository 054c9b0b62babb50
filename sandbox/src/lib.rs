pub mod faults;
pub mod ledger;
pub mod sandbox;
pub mod stub;

pub use faults::Faults;
pub use ledger::MemoryLedger;
pub use sandbox::{Sandbox, TxResult};
