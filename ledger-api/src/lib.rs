//! The narrow interface a chaincode sees of its hosting ledger: the transaction
//! context and stub, the query result messages and the iterators over them.

pub mod chaincode;
pub mod iterator;
pub mod queryresult;
pub mod stub;
pub mod timestamp;

pub use chaincode::Chaincode;
pub use iterator::{QueryCursor, ResultsIterator};
pub use queryresult::{KeyModification, Kv, QueryResponse, QueryResultBytes};
pub use stub::{ChaincodeStub, TransactionContext};

/// Platform-native timestamp carried by history records and transaction headers.
pub use prost_types::Timestamp;
