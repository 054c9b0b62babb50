use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow, bail};
use ledger_api::timestamp::from_datetime;
use ledger_api::{
    ChaincodeStub, KeyModification, Kv, QueryCursor, QueryResponse, QueryResultBytes,
    ResultsIterator, Timestamp, TransactionContext,
};
use prost::Message;
use tracing::debug;

use crate::faults::Faults;
use crate::ledger::{MemoryLedger, TxHeader, WriteSet};

/// Results per page handed from the peer to the shim.
const PAGE_SIZE: usize = 100;

/// Stub for one simulated transaction. Reads go to the committed ledger,
/// writes are collected into a write set the sandbox commits on success.
pub struct SimulatedStub<'a> {
    ledger: &'a MemoryLedger,
    header: &'a TxHeader,
    faults: &'a Faults,
    open_iterators: Arc<AtomicUsize>,
    write_set: RefCell<WriteSet>,
}

impl<'a> SimulatedStub<'a> {
    pub fn new(
        ledger: &'a MemoryLedger,
        header: &'a TxHeader,
        faults: &'a Faults,
        open_iterators: Arc<AtomicUsize>,
    ) -> Self {
        SimulatedStub {
            ledger,
            header,
            faults,
            open_iterators,
            write_set: RefCell::new(WriteSet::new()),
        }
    }

    pub fn into_write_set(self) -> WriteSet {
        self.write_set.into_inner()
    }

    fn open_cursor<T: Message + Default + 'a>(
        &self,
        query_id: String,
        results: Vec<T>,
        fail_after: Option<usize>,
    ) -> ResultsIterator<'a, T> {
        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        let page_count = results.len().div_ceil(PAGE_SIZE);
        let pages = results
            .chunks(PAGE_SIZE)
            .enumerate()
            .map(|(index, chunk)| QueryResponse {
                results: chunk.iter().map(QueryResultBytes::encode_from).collect(),
                has_more: index + 1 < page_count,
                id: query_id.clone(),
            })
            .collect::<VecDeque<_>>();
        ResultsIterator::new(Box::new(PagedCursor {
            pages,
            current: VecDeque::new(),
            returned: 0,
            fail_after,
            open_iterators: self.open_iterators.clone(),
            closed: false,
            _message: PhantomData,
        }))
    }
}

impl ChaincodeStub for SimulatedStub<'_> {
    fn tx_id(&self) -> &str {
        &self.header.tx_id
    }

    fn channel_id(&self) -> &str {
        &self.ledger.channel
    }

    fn tx_timestamp(&self) -> Timestamp {
        from_datetime(&self.header.timestamp)
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.faults.fail_get_state {
            bail!("GET_STATE failed: transaction ID: {}: peer unavailable", self.header.tx_id);
        }
        Ok(self.ledger.get(key).map(<[u8]>::to_vec))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            bail!("key must not be an empty string");
        }
        if self.faults.fail_put_state {
            bail!("PUT_STATE failed: transaction ID: {}: peer unavailable", self.header.tx_id);
        }
        debug!("PutState {} ({} bytes) in tx {}", key, value.len(), self.header.tx_id);
        // a zero-length write commits as a delete
        let value = (!value.is_empty()).then(|| value.to_vec());
        self.write_set.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            bail!("key must not be an empty string");
        }
        debug!("DelState {} in tx {}", key, self.header.tx_id);
        self.write_set.borrow_mut().insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<ResultsIterator<'_, Kv>> {
        let results = self.ledger.range(start_key, end_key);
        debug!(
            "GetStateByRange [{:?}, {:?}) matched {} keys",
            start_key,
            end_key,
            results.len()
        );
        Ok(self.open_cursor(
            format!("{}-range", self.header.tx_id),
            results,
            self.faults.fail_range_after,
        ))
    }

    fn get_history_for_key(&self, key: &str) -> Result<ResultsIterator<'_, KeyModification>> {
        if key.is_empty() {
            bail!("key must not be an empty string");
        }
        let mut results = self.ledger.history(key);
        if self.faults.drop_history_timestamps {
            for modification in &mut results {
                modification.timestamp = None;
            }
        }
        debug!("GetHistoryForKey {} has {} entries", key, results.len());
        Ok(self.open_cursor(
            format!("{}-history", self.header.tx_id),
            results,
            self.faults.fail_history_after,
        ))
    }
}

/// Shim-side cursor that decodes results page by page.
struct PagedCursor<T> {
    pages: VecDeque<QueryResponse>,
    current: VecDeque<QueryResultBytes>,
    returned: usize,
    fail_after: Option<usize>,
    open_iterators: Arc<AtomicUsize>,
    closed: bool,
    _message: PhantomData<T>,
}

impl<T: Message + Default> QueryCursor<T> for PagedCursor<T> {
    fn has_next(&self) -> bool {
        !self.closed && (!self.current.is_empty() || !self.pages.is_empty())
    }

    fn next(&mut self) -> Result<T> {
        if self.closed {
            bail!("query iterator is closed");
        }
        if self.fail_after.is_some_and(|limit| self.returned >= limit) {
            bail!("QUERY_STATE_NEXT failed: peer unavailable");
        }
        if self.current.is_empty() {
            let page = self
                .pages
                .pop_front()
                .ok_or_else(|| anyhow!("no more query results"))?;
            self.current = page.results.into();
        }
        let bytes = self
            .current
            .pop_front()
            .ok_or_else(|| anyhow!("no more query results"))?;
        self.returned += 1;
        bytes
            .decode_into()
            .context("failed to decode query result")
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            bail!("query iterator already closed");
        }
        self.closed = true;
        self.pages.clear();
        self.current.clear();
        self.open_iterators.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Transaction context handed to the chaincode for one invocation.
pub struct TxContext<'a> {
    stub: SimulatedStub<'a>,
}

impl<'a> TxContext<'a> {
    pub fn new(stub: SimulatedStub<'a>) -> Self {
        TxContext { stub }
    }

    pub fn into_write_set(self) -> WriteSet {
        self.stub.into_write_set()
    }
}

impl TransactionContext for TxContext<'_> {
    fn stub(&self) -> &dyn ChaincodeStub {
        &self.stub
    }
}
