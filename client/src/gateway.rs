use std::path::{Path, PathBuf};

use anyhow::Result;
use asset_contract::{ContractError, Function, SmartContract, TxKind};
use sandbox::{Sandbox, TxResult};
use thiserror::Error;
use tracing::info;

use crate::config::LedgerConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("transaction {tx_id} committed but the ledger snapshot was not saved: {cause:#}")]
    Persist { tx_id: String, cause: anyhow::Error },
}

/// Connection to the asset chaincode running on a sandbox ledger that is
/// persisted to a snapshot file after every committed transaction.
pub struct Gateway {
    sandbox: Sandbox,
    contract: SmartContract,
    state_file: PathBuf,
    chaincode: String,
}

impl Gateway {
    pub fn open(ledger: &LedgerConfig) -> Result<Self> {
        let sandbox = Sandbox::load(&ledger.state_file, &ledger.channel)?;
        info!(
            "Connected to chaincode {} on channel {} at height {}",
            ledger.chaincode,
            sandbox.ledger().channel,
            sandbox.height()
        );
        Ok(Gateway {
            sandbox,
            contract: SmartContract::new(),
            state_file: ledger.state_file.clone(),
            chaincode: ledger.chaincode.clone(),
        })
    }

    pub fn height(&self) -> u64 {
        self.sandbox.height()
    }

    pub fn channel(&self) -> &str {
        &self.sandbox.ledger().channel
    }

    pub fn chaincode(&self) -> &str {
        &self.chaincode
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Runs `function` as a transaction and commits it.
    pub fn submit_transaction(
        &mut self,
        function: &str,
        args: &[String],
    ) -> Result<TxResult, GatewayError> {
        info!("--> Submit Transaction: {}, args: {:?}", function, args);
        let result = self.sandbox.submit(&self.contract, function, args)?;
        self.sandbox
            .save(&self.state_file)
            .map_err(|cause| GatewayError::Persist {
                tx_id: result.tx_id.clone(),
                cause,
            })?;
        info!("*** Transaction {} committed successfully", result.tx_id);
        Ok(result)
    }

    /// Runs `function` against the committed state without committing.
    pub fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError> {
        info!("--> Evaluate Transaction: {}, args: {:?}", function, args);
        Ok(self.sandbox.evaluate(&self.contract, function, args)?)
    }

    /// Submits or evaluates `function` depending on whether it writes.
    pub fn invoke(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        match function.parse::<Function>().map(Function::kind) {
            Ok(TxKind::Submit) => Ok(self.submit_transaction(function, args)?.payload),
            _ => self.evaluate_transaction(function, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_contract::ErrorKind;

    fn ledger_config() -> LedgerConfig {
        LedgerConfig {
            state_file: std::env::temp_dir().join(format!("gateway-{}.json", uuid::Uuid::new_v4())),
            ..Default::default()
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_submits_persist_across_reopen() -> Result<()> {
        let config = ledger_config();
        {
            let mut gateway = Gateway::open(&config)?;
            gateway.invoke("InitLedger", &[])?;
            gateway.invoke("TransferAsset", &args(&["asset1", "Max"]))?;
            assert_eq!(gateway.height(), 2);
        }
        let gateway = Gateway::open(&config)?;
        assert_eq!(gateway.height(), 2);
        let payload = gateway.evaluate_transaction("ReadAsset", &args(&["asset1"]))?;
        let asset: asset_contract::Asset = serde_json::from_slice(&payload)?;
        assert_eq!(asset.owner, "Max");
        std::fs::remove_file(gateway.state_file()).ok();
        Ok(())
    }

    #[test]
    fn test_reads_are_not_committed() -> Result<()> {
        let config = ledger_config();
        let mut gateway = Gateway::open(&config)?;
        gateway.invoke("GetAllAssets", &[])?;
        gateway.invoke("AssetExists", &args(&["asset1"]))?;
        assert_eq!(gateway.height(), 0);
        assert!(!config.state_file.exists());
        Ok(())
    }

    #[test]
    fn test_contract_errors_keep_their_kind() -> Result<()> {
        let config = ledger_config();
        let mut gateway = Gateway::open(&config)?;
        let err = gateway
            .invoke("ReadAsset", &args(&["asset1"]))
            .unwrap_err();
        match err {
            GatewayError::Contract(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
        let err = gateway.invoke("Nope", &[]).unwrap_err();
        assert!(matches!(err, GatewayError::Contract(ContractError::UnknownFunction(_))));
        Ok(())
    }
}
