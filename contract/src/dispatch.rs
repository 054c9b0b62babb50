use std::fmt;
use std::str::FromStr;

use ledger_api::{Chaincode, TransactionContext};
use serde::Serialize;
use serde_json::json;

use crate::contract::SmartContract;
use crate::error::{ContractError, ContractResult};

/// Whether a function changes the world state and must be committed, or only
/// reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxKind {
    Submit,
    Evaluate,
}

/// The contract's public functions, by the names callers invoke them with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    InitLedger,
    CreateAsset,
    ReadAsset,
    SearchAssetById,
    UpdateAssetPrice,
    TransferAsset,
    GetAllAssets,
    GetAssetHistory,
    AssetExists,
    GetMetadata,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::InitLedger,
        Function::CreateAsset,
        Function::ReadAsset,
        Function::SearchAssetById,
        Function::UpdateAssetPrice,
        Function::TransferAsset,
        Function::GetAllAssets,
        Function::GetAssetHistory,
        Function::AssetExists,
        Function::GetMetadata,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateAsset => "CreateAsset",
            Function::ReadAsset => "ReadAsset",
            Function::SearchAssetById => "SearchAssetByID",
            Function::UpdateAssetPrice => "UpdateAssetPrice",
            Function::TransferAsset => "TransferAsset",
            Function::GetAllAssets => "GetAllAssets",
            Function::GetAssetHistory => "GetAssetHistory",
            Function::AssetExists => "AssetExists",
            Function::GetMetadata => "GetMetadata",
        }
    }

    pub fn params(self) -> &'static [&'static str] {
        match self {
            Function::InitLedger | Function::GetAllAssets | Function::GetMetadata => &[],
            Function::CreateAsset => &["id", "assetType", "price", "owner"],
            Function::ReadAsset
            | Function::SearchAssetById
            | Function::AssetExists => &["id"],
            Function::UpdateAssetPrice => &["id", "newPrice"],
            Function::TransferAsset => &["id", "newOwner"],
            Function::GetAssetHistory => &["assetID"],
        }
    }

    pub fn kind(self) -> TxKind {
        match self {
            Function::InitLedger
            | Function::CreateAsset
            | Function::UpdateAssetPrice
            | Function::TransferAsset => TxKind::Submit,
            _ => TxKind::Evaluate,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

fn check_arity(function: Function, args: &[String]) -> ContractResult<()> {
    let expected = function.params().len();
    if args.len() != expected {
        return Err(ContractError::InvalidArguments {
            function: function.name().to_string(),
            reason: format!("expected {} arguments, got {}", expected, args.len()),
        });
    }
    Ok(())
}

fn parse_int(function: Function, param: &str, value: &str) -> ContractResult<i64> {
    value.trim().parse().map_err(|e| ContractError::InvalidArguments {
        function: function.name().to_string(),
        reason: format!("{} {:?} is not an integer: {}", param, value, e),
    })
}

fn to_payload<T: Serialize>(value: &T) -> ContractResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// JSON description of the contract's functions, their parameters and
/// whether they are submitted or evaluated.
pub fn metadata() -> serde_json::Value {
    let functions: Vec<serde_json::Value> = Function::ALL
        .into_iter()
        .map(|function| {
            json!({
                "name": function.name(),
                "parameters": function.params(),
                "kind": function.kind(),
            })
        })
        .collect();
    json!({
        "contract": "SmartContract",
        "functions": functions,
    })
}

impl Chaincode for SmartContract {
    type Error = ContractError;

    fn invoke(
        &self,
        ctx: &dyn TransactionContext,
        function: &str,
        args: &[String],
    ) -> ContractResult<Vec<u8>> {
        let function: Function = function.parse()?;
        check_arity(function, args)?;
        match function {
            Function::InitLedger => {
                self.init_ledger(ctx)?;
                Ok(Vec::new())
            }
            Function::CreateAsset => {
                let price = parse_int(function, "price", &args[2])?;
                self.create_asset(ctx, &args[0], &args[1], price, &args[3])?;
                Ok(Vec::new())
            }
            Function::ReadAsset => to_payload(&self.read_asset(ctx, &args[0])?),
            Function::SearchAssetById => to_payload(&self.search_asset_by_id(ctx, &args[0])?),
            Function::UpdateAssetPrice => {
                let new_price = parse_int(function, "newPrice", &args[1])?;
                self.update_asset_price(ctx, &args[0], new_price)?;
                Ok(Vec::new())
            }
            Function::TransferAsset => {
                self.transfer_asset(ctx, &args[0], &args[1])?;
                Ok(Vec::new())
            }
            Function::GetAllAssets => to_payload(&self.get_all_assets(ctx)?),
            Function::GetAssetHistory => to_payload(&self.get_asset_history(ctx, &args[0])?),
            Function::AssetExists => to_payload(&self.asset_exists(ctx, &args[0])?),
            Function::GetMetadata => to_payload(&metadata()),
        }
    }
}
