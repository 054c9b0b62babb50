use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An asset as stored in the world state, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Type")]
    pub asset_type: String,
    #[serde(rename = "Price")]
    pub price: i64,
    #[serde(rename = "Owner")]
    pub owner: String,
}

impl Asset {
    pub fn new(
        id: impl Into<String>,
        asset_type: impl Into<String>,
        price: i64,
        owner: impl Into<String>,
    ) -> Self {
        Asset {
            id: id.into(),
            asset_type: asset_type.into(),
            price,
            owner: owner.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn historical_record(&self) -> HistoricalAssetRecord {
        HistoricalAssetRecord {
            price: self.price,
            owner: self.owner.clone(),
        }
    }
}

/// The mutable fields of an asset at one point in its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalAssetRecord {
    #[serde(rename = "Price")]
    pub price: i64,
    #[serde(rename = "Owner")]
    pub owner: String,
}

/// One entry of an asset's history. `record` is `None` for deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQueryResult {
    pub record: Option<HistoricalAssetRecord>,
    #[serde(rename = "txId")]
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
}

/// The assets written by `InitLedger`.
pub fn sample_assets() -> Vec<Asset> {
    vec![
        Asset::new("asset1", "Car", 10000, "Tomoko"),
        Asset::new("asset2", "House", 250000, "Brad"),
        Asset::new("asset3", "Boat", 50000, "Jin Soo"),
    ]
}
