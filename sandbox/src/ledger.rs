use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::{DateTime, Utc};
use ledger_api::timestamp::from_datetime;
use ledger_api::{KeyModification, Kv};
use serde::{Deserialize, Serialize};

/// Committed state of the sandbox peer: the world state, the per-key change
/// history and the number of committed transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLedger {
    pub channel: String,
    pub height: u64,
    #[serde(with = "bytes_map")]
    world_state: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<HistoryEntry>>,
}

/// One committed change to a key. Kept oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "bytes")]
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// Header of the transaction being committed.
#[derive(Debug, Clone)]
pub struct TxHeader {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
}

/// `Some` is an upsert, `None` a delete.
pub type WriteSet = BTreeMap<String, Option<Vec<u8>>>;

impl MemoryLedger {
    pub fn new(channel: impl Into<String>) -> Self {
        MemoryLedger {
            channel: channel.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.world_state.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.world_state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world_state.is_empty()
    }

    pub fn range(&self, start_key: &str, end_key: &str) -> Vec<Kv> {
        if !end_key.is_empty() && start_key > end_key {
            return Vec::new();
        }
        let start = Bound::Included(start_key.to_string());
        let end = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key.to_string())
        };
        self.world_state
            .range::<String, _>((start, end))
            .map(|(key, value)| Kv {
                namespace: self.channel.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    /// Changes to `key`, newest first.
    pub fn history(&self, key: &str) -> Vec<KeyModification> {
        self.history
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .map(|entry| KeyModification {
                        tx_id: entry.tx_id.clone(),
                        value: entry.value.clone(),
                        timestamp: Some(from_datetime(&entry.timestamp)),
                        is_delete: entry.is_delete,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.history
            .values()
            .filter_map(|entries| entries.last())
            .map(|entry| entry.timestamp)
            .max()
    }

    /// Applies a transaction's write set and records each change in the history.
    pub fn commit(&mut self, header: &TxHeader, write_set: WriteSet) {
        for (key, value) in write_set {
            let entry = match value {
                Some(value) => {
                    self.world_state.insert(key.clone(), value.clone());
                    HistoryEntry {
                        tx_id: header.tx_id.clone(),
                        timestamp: header.timestamp,
                        value,
                        is_delete: false,
                    }
                }
                None => {
                    self.world_state.remove(&key);
                    HistoryEntry {
                        tx_id: header.tx_id.clone(),
                        timestamp: header.timestamp,
                        value: Vec::new(),
                        is_delete: true,
                    }
                }
            };
            self.history.entry(key).or_default().push(entry);
        }
        self.height += 1;
    }
}

mod bytes {
    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

mod bytes_map {
    use std::collections::BTreeMap;

    use base64::{Engine as _, engine::general_purpose};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            value
                .iter()
                .map(|(key, bytes)| (key, general_purpose::STANDARD.encode(bytes))),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                general_purpose::STANDARD
                    .decode(value)
                    .map(|bytes| (key, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
