use ledger_api::TransactionContext;
use ledger_api::timestamp::to_datetime;
use tracing::{debug, info};

use crate::asset::{Asset, HistoryQueryResult, sample_assets};
use crate::error::{ContractError, ContractResult};

/// Asset registry chaincode. Holds no state of its own; every operation reads
/// the world state through the transaction context and writes back whole
/// records.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmartContract;

impl SmartContract {
    pub fn new() -> Self {
        SmartContract
    }

    /// Writes the sample assets, overwriting whatever is stored at their keys.
    pub fn init_ledger(&self, ctx: &dyn TransactionContext) -> ContractResult<()> {
        info!("InitLedger in tx {}", ctx.stub().tx_id());
        for asset in sample_assets() {
            let asset_json = asset.to_json()?;
            ctx.stub()
                .put_state(&asset.id, &asset_json)
                .map_err(|e| ContractError::store("failed to put to world state", e))?;
        }
        Ok(())
    }

    pub fn create_asset(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        asset_type: &str,
        price: i64,
        owner: &str,
    ) -> ContractResult<()> {
        info!("CreateAsset {} in tx {}", id, ctx.stub().tx_id());
        if self.asset_exists(ctx, id)? {
            return Err(ContractError::AlreadyExists(id.to_string()));
        }
        let asset = Asset::new(id, asset_type, price, owner);
        self.put_asset(ctx, &asset)
    }

    pub fn read_asset(&self, ctx: &dyn TransactionContext, id: &str) -> ContractResult<Asset> {
        let asset_json = ctx
            .stub()
            .get_state(id)
            .map_err(|e| ContractError::store("failed to read from world state", e))?
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| ContractError::NotFound(id.to_string()))?;
        Ok(Asset::from_json(&asset_json)?)
    }

    /// Same lookup as [`SmartContract::read_asset`], kept under the name
    /// search clients call.
    pub fn search_asset_by_id(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> ContractResult<Asset> {
        self.read_asset(ctx, id)
    }

    /// Fails with [`ContractError::PriceUnchanged`] when `new_price` is the
    /// current price.
    pub fn update_asset_price(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        new_price: i64,
    ) -> ContractResult<()> {
        info!("UpdateAssetPrice {} to {} in tx {}", id, new_price, ctx.stub().tx_id());
        let mut asset = self.read_asset(ctx, id)?;
        if asset.price == new_price {
            return Err(ContractError::PriceUnchanged(new_price));
        }
        asset.price = new_price;
        self.put_asset(ctx, &asset)
    }

    /// Fails with [`ContractError::OwnerUnchanged`] when `new_owner` already
    /// owns the asset.
    pub fn transfer_asset(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
        new_owner: &str,
    ) -> ContractResult<()> {
        info!("TransferAsset {} to {} in tx {}", id, new_owner, ctx.stub().tx_id());
        let mut asset = self.read_asset(ctx, id)?;
        if asset.owner == new_owner {
            return Err(ContractError::OwnerUnchanged(new_owner.to_string()));
        }
        asset.owner = new_owner.to_string();
        self.put_asset(ctx, &asset)
    }

    /// Every asset in the world state, in key order. Stops at the first
    /// record that cannot be read or decoded.
    pub fn get_all_assets(&self, ctx: &dyn TransactionContext) -> ContractResult<Vec<Asset>> {
        let results = ctx
            .stub()
            .get_state_by_range("", "")
            .map_err(|e| ContractError::store("failed to query world state", e))?;

        let mut assets = Vec::new();
        for query_response in results {
            let query_response = query_response
                .map_err(|e| ContractError::store("failed to iterate world state", e))?;
            assets.push(Asset::from_json(&query_response.value)?);
        }
        debug!("GetAllAssets found {} assets", assets.len());
        Ok(assets)
    }

    /// The chain of custody of an asset, newest change first.
    pub fn get_asset_history(
        &self,
        ctx: &dyn TransactionContext,
        asset_id: &str,
    ) -> ContractResult<Vec<HistoryQueryResult>> {
        info!("GetAssetHistory: ID {}", asset_id);
        let results = ctx
            .stub()
            .get_history_for_key(asset_id)
            .map_err(|e| ContractError::store("failed to query asset history", e))?;

        let mut records = Vec::new();
        for response in results {
            let response =
                response.map_err(|e| ContractError::store("failed to iterate asset history", e))?;

            let record = if !response.is_delete && !response.value.is_empty() {
                Some(Asset::from_json(&response.value)?.historical_record())
            } else {
                None
            };
            let timestamp = to_datetime(response.timestamp.as_ref())?;
            debug!(
                "History of {}: tx {} at {} (delete: {})",
                asset_id, response.tx_id, timestamp, response.is_delete
            );

            records.push(HistoryQueryResult {
                record,
                tx_id: response.tx_id,
                timestamp,
                is_delete: response.is_delete,
            });
        }
        Ok(records)
    }

    /// Absence is `Ok(false)`; only a failed read is an error.
    pub fn asset_exists(&self, ctx: &dyn TransactionContext, id: &str) -> ContractResult<bool> {
        let asset_json = ctx
            .stub()
            .get_state(id)
            .map_err(|e| ContractError::store("failed to read from world state", e))?;
        Ok(asset_json.is_some_and(|bytes| !bytes.is_empty()))
    }

    fn put_asset(&self, ctx: &dyn TransactionContext, asset: &Asset) -> ContractResult<()> {
        let asset_json = asset.to_json()?;
        ctx.stub()
            .put_state(&asset.id, &asset_json)
            .map_err(|e| ContractError::store("failed to put to world state", e))
    }
}
