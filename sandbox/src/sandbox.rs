use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use ledger_api::{Chaincode, TransactionContext};
use tracing::{debug, error, info};

use crate::faults::Faults;
use crate::ledger::{MemoryLedger, TxHeader, WriteSet};
use crate::stub::{SimulatedStub, TxContext};

/// Outcome of a committed transaction.
#[derive(Debug, Clone)]
pub struct TxResult<T = Vec<u8>> {
    pub tx_id: String,
    pub payload: T,
}

/// A single peer that executes chaincode invocations one at a time.
///
/// `submit` commits the invocation's writes atomically when it succeeds and
/// discards them when it fails; `evaluate` never commits.
pub struct Sandbox {
    ledger: MemoryLedger,
    faults: Faults,
    open_iterators: Arc<AtomicUsize>,
}

impl Sandbox {
    pub fn new(channel: impl Into<String>) -> Self {
        Self::from_ledger(MemoryLedger::new(channel))
    }

    pub fn from_ledger(ledger: MemoryLedger) -> Self {
        Sandbox {
            ledger,
            faults: Faults::none(),
            open_iterators: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Loads a ledger snapshot. A missing file yields an empty ledger on `channel`.
    pub fn load<P: AsRef<Path>>(path: P, channel: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No ledger snapshot at '{}', starting empty ledger on channel {}",
                path.display(),
                channel
            );
            return Ok(Self::new(channel));
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger snapshot '{}'", path.display()))?;
        let ledger: MemoryLedger = serde_json::from_str(&s)
            .with_context(|| format!("failed to parse ledger snapshot '{}'", path.display()))?;
        info!(
            "Loaded ledger snapshot '{}' at height {} with {} keys",
            path.display(),
            ledger.height,
            ledger.len()
        );
        Ok(Self::from_ledger(ledger))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(&self.ledger).context("failed to encode ledger")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write ledger snapshot '{}'", path.display()))?;
        debug!("Saved ledger snapshot '{}' at height {}", path.display(), self.ledger.height);
        Ok(())
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn height(&self) -> u64 {
        self.ledger.height
    }

    /// Query iterators handed out and not yet closed.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    pub fn set_faults(&mut self, faults: Faults) {
        self.faults = faults;
    }

    pub fn submit<C: Chaincode>(
        &mut self,
        chaincode: &C,
        function: &str,
        args: &[String],
    ) -> Result<TxResult, C::Error> {
        info!("Submit {} {:?}", function, args);
        self.transact(|ctx| chaincode.invoke(ctx, function, args))
            .inspect_err(|e| error!("Submit of {} failed: {}", function, e))
    }

    pub fn evaluate<C: Chaincode>(
        &self,
        chaincode: &C,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, C::Error> {
        debug!("Evaluate {} {:?}", function, args);
        self.query(|ctx| chaincode.invoke(ctx, function, args))
            .inspect_err(|e| error!("Evaluation of {} failed: {}", function, e))
    }

    /// Runs `f` as one transaction, committing its writes only if it succeeds.
    pub fn transact<T, E>(
        &mut self,
        f: impl FnOnce(&dyn TransactionContext) -> Result<T, E>,
    ) -> Result<TxResult<T>, E> {
        let header = self.next_header();
        let (result, write_set) = self.simulate(&header, f);
        let payload = result?;
        debug!("Committing {} writes for tx {}", write_set.len(), header.tx_id);
        self.ledger.commit(&header, write_set);
        Ok(TxResult {
            tx_id: header.tx_id,
            payload,
        })
    }

    /// Runs `f` against the committed state and discards anything it wrote.
    pub fn query<T, E>(&self, f: impl FnOnce(&dyn TransactionContext) -> Result<T, E>) -> Result<T, E> {
        let header = self.next_header();
        self.simulate(&header, f).0
    }

    /// Commits raw bytes at `key` without going through a chaincode.
    pub fn put_raw(&mut self, key: &str, value: Vec<u8>) -> String {
        self.commit_direct(key, Some(value))
    }

    /// Commits a deletion of `key`, leaving a tombstone in its history.
    pub fn delete(&mut self, key: &str) -> String {
        self.commit_direct(key, None)
    }

    fn commit_direct(&mut self, key: &str, value: Option<Vec<u8>>) -> String {
        let header = self.next_header();
        let write_set: WriteSet = [(key.to_string(), value)].into();
        self.ledger.commit(&header, write_set);
        header.tx_id
    }

    fn simulate<T, E>(
        &self,
        header: &TxHeader,
        f: impl FnOnce(&dyn TransactionContext) -> Result<T, E>,
    ) -> (Result<T, E>, WriteSet) {
        let stub = SimulatedStub::new(
            &self.ledger,
            header,
            &self.faults,
            self.open_iterators.clone(),
        );
        let ctx = TxContext::new(stub);
        let result = f(&ctx);
        (result, ctx.into_write_set())
    }

    fn next_header(&self) -> TxHeader {
        let now = Utc::now();
        // keep history timestamps strictly increasing
        let timestamp = match self.ledger.last_timestamp() {
            Some(last) if last >= now => last + Duration::microseconds(1),
            _ => now,
        };
        TxHeader {
            tx_id: uuid::Uuid::new_v4().simple().to_string(),
            timestamp,
        }
    }
}
