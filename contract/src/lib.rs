//! Asset registry chaincode.
//!
//! Assets are JSON records keyed by their ID in the world state. The contract
//! creates, reads, re-prices and transfers them, lists them with a full range
//! scan and replays the change history the ledger keeps for each key.

pub mod asset;
pub mod contract;
pub mod dispatch;
pub mod error;

pub use asset::{Asset, HistoricalAssetRecord, HistoryQueryResult, sample_assets};
pub use contract::SmartContract;
pub use dispatch::{Function, TxKind, metadata};
pub use error::{ContractError, ContractResult, ErrorKind};
