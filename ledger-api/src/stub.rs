use anyhow::Result;
use prost_types::Timestamp;

use crate::iterator::ResultsIterator;
use crate::queryresult::{KeyModification, Kv};

/// World-state access for the transaction currently being executed.
///
/// Reads observe committed state. Writes are recorded in the transaction's
/// write set and become visible only once the platform commits it.
pub trait ChaincodeStub {
    fn tx_id(&self) -> &str;

    fn channel_id(&self) -> &str;

    fn tx_timestamp(&self) -> Timestamp;

    /// Point lookup. An absent key is `Ok(None)`, not an error.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;

    fn del_state(&self, key: &str) -> Result<()>;

    /// Lexicographic scan from `start_key` (inclusive) to `end_key` (exclusive).
    /// Empty bounds leave that side of the range open.
    fn get_state_by_range(&self, start_key: &str, end_key: &str)
    -> Result<ResultsIterator<'_, Kv>>;

    /// Every committed change to `key`, newest first.
    fn get_history_for_key(&self, key: &str) -> Result<ResultsIterator<'_, KeyModification>>;
}

pub trait TransactionContext {
    fn stub(&self) -> &dyn ChaincodeStub;
}
