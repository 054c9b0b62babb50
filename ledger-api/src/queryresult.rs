// Query result messages exchanged between the peer and the chaincode shim.

use prost::Message;
use prost_types::Timestamp;

/// A key/value pair returned by a range query over the world state.
#[derive(Clone, PartialEq, Message)]
pub struct Kv {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

/// One committed change to a key, as returned by a history query.
#[derive(Clone, PartialEq, Message)]
pub struct KeyModification {
    #[prost(string, tag = "1")]
    pub tx_id: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
    #[prost(bool, tag = "4")]
    pub is_delete: bool,
}

/// An encoded `Kv` or `KeyModification`.
#[derive(Clone, PartialEq, Message)]
pub struct QueryResultBytes {
    #[prost(bytes = "vec", tag = "1")]
    pub result_bytes: Vec<u8>,
}

/// One page of query results. `has_more` tells the shim to fetch the next page
/// from the cursor identified by `id`.
#[derive(Clone, PartialEq, Message)]
pub struct QueryResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<QueryResultBytes>,
    #[prost(bool, tag = "2")]
    pub has_more: bool,
    #[prost(string, tag = "3")]
    pub id: String,
}

impl QueryResultBytes {
    pub fn encode_from<M: Message>(message: &M) -> Self {
        QueryResultBytes {
            result_bytes: message.encode_to_vec(),
        }
    }

    pub fn decode_into<M: Message + Default>(&self) -> Result<M, prost::DecodeError> {
        M::decode(self.result_bytes.as_slice())
    }
}
