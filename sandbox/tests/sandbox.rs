use ledger_api::{Chaincode, TransactionContext};
use sandbox::{Faults, Sandbox};
use thiserror::Error;

/// Minimal key/value chaincode used to drive the sandbox.
struct KvChaincode;

#[derive(Debug, Error)]
enum KvError {
    #[error("{0:#}")]
    Stub(anyhow::Error),
    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<anyhow::Error> for KvError {
    fn from(e: anyhow::Error) -> Self {
        KvError::Stub(e)
    }
}

impl Chaincode for KvChaincode {
    type Error = KvError;

    fn invoke(
        &self,
        ctx: &dyn TransactionContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, KvError> {
        let stub = ctx.stub();
        match function {
            "put" => {
                stub.put_state(&args[0], args[1].as_bytes())?;
                Ok(stub.tx_id().as_bytes().to_vec())
            }
            "put_then_fail" => {
                stub.put_state(&args[0], args[1].as_bytes())?;
                Err(KvError::Rejected(args[0].clone()))
            }
            "put_then_read" => {
                stub.put_state(&args[0], args[1].as_bytes())?;
                Ok(stub.get_state(&args[0])?.unwrap_or_default())
            }
            "get" => Ok(stub.get_state(&args[0])?.unwrap_or_default()),
            "del" => {
                stub.del_state(&args[0])?;
                Ok(Vec::new())
            }
            "scan" => {
                let mut keys = Vec::new();
                for kv in stub.get_state_by_range(&args[0], &args[1])? {
                    keys.push(kv?.key);
                }
                Ok(keys.join(",").into_bytes())
            }
            "history" => {
                let mut tx_ids = Vec::new();
                for modification in stub.get_history_for_key(&args[0])? {
                    tx_ids.push(modification?.tx_id);
                }
                Ok(tx_ids.join(",").into_bytes())
            }
            other => Err(KvError::Rejected(other.to_string())),
        }
    }
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_submit_commits_and_advances_height() {
    let mut sandbox = Sandbox::new("mychannel");
    let result = sandbox
        .submit(&KvChaincode, "put", &args(&["a", "1"]))
        .unwrap();
    assert_eq!(text(result.payload), result.tx_id);
    assert_eq!(sandbox.height(), 1);
    assert_eq!(sandbox.ledger().get("a"), Some(&b"1"[..]));
}

#[test]
fn test_failed_submit_discards_writes() {
    let mut sandbox = Sandbox::new("mychannel");
    let result = sandbox.submit(&KvChaincode, "put_then_fail", &args(&["a", "1"]));
    assert!(matches!(result, Err(KvError::Rejected(_))));
    assert_eq!(sandbox.height(), 0);
    assert!(sandbox.ledger().get("a").is_none());
    assert!(sandbox.ledger().history("a").is_empty());
}

#[test]
fn test_evaluate_never_commits() {
    let mut sandbox = Sandbox::new("mychannel");
    sandbox.evaluate(&KvChaincode, "put", &args(&["a", "1"])).unwrap();
    assert_eq!(sandbox.height(), 0);
    assert!(sandbox.ledger().get("a").is_none());
    sandbox.submit(&KvChaincode, "put", &args(&["a", "1"])).unwrap();
    assert_eq!(text(sandbox.evaluate(&KvChaincode, "get", &args(&["a"])).unwrap()), "1");
}

#[test]
fn test_reads_do_not_see_own_writes() {
    let mut sandbox = Sandbox::new("mychannel");
    let result = sandbox
        .submit(&KvChaincode, "put_then_read", &args(&["a", "1"]))
        .unwrap();
    assert!(result.payload.is_empty());
    assert_eq!(sandbox.ledger().get("a"), Some(&b"1"[..]));
}

#[test]
fn test_empty_key_is_rejected() {
    let mut sandbox = Sandbox::new("mychannel");
    let err = sandbox
        .submit(&KvChaincode, "put", &args(&["", "1"]))
        .unwrap_err();
    assert!(err.to_string().contains("key must not be an empty string"));
}

#[test]
fn test_empty_value_commits_as_delete() {
    let mut sandbox = Sandbox::new("mychannel");
    sandbox.submit(&KvChaincode, "put", &args(&["a", "1"])).unwrap();
    sandbox.submit(&KvChaincode, "put", &args(&["a", ""])).unwrap();
    assert!(sandbox.ledger().get("a").is_none());
    assert_eq!(text(sandbox.evaluate(&KvChaincode, "scan", &args(&["", ""])).unwrap()), "");

    let history = sandbox.ledger().history("a");
    assert_eq!(history.len(), 2);
    assert!(history[0].is_delete);
    assert!(history[0].value.is_empty());
}

#[test]
fn test_range_scan_over_many_pages_is_ordered() {
    let mut sandbox = Sandbox::new("mychannel");
    for i in 0..250 {
        sandbox.put_raw(&format!("k{:03}", i), b"v".to_vec());
    }
    let keys = text(sandbox.evaluate(&KvChaincode, "scan", &args(&["", ""])).unwrap());
    let keys: Vec<&str> = keys.split(',').collect();
    assert_eq!(keys.len(), 250);
    assert_eq!(keys[0], "k000");
    assert_eq!(keys[249], "k249");
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(sandbox.open_iterators(), 0);

    let bounded = text(
        sandbox
            .evaluate(&KvChaincode, "scan", &args(&["k010", "k013"]))
            .unwrap(),
    );
    assert_eq!(bounded, "k010,k011,k012");
}

#[test]
fn test_history_newest_first_with_tombstone() {
    let mut sandbox = Sandbox::new("mychannel");
    let first = sandbox.submit(&KvChaincode, "put", &args(&["a", "1"])).unwrap().tx_id;
    let second = sandbox.submit(&KvChaincode, "put", &args(&["a", "2"])).unwrap().tx_id;
    let third = sandbox.submit(&KvChaincode, "del", &args(&["a"])).unwrap().tx_id;

    let history = text(sandbox.evaluate(&KvChaincode, "history", &args(&["a"])).unwrap());
    assert_eq!(history, format!("{},{},{}", third, second, first));

    let modifications = sandbox.ledger().history("a");
    assert!(modifications[0].is_delete);
    let times: Vec<_> = modifications
        .iter()
        .map(|m| m.timestamp.clone().unwrap())
        .collect();
    assert!(times.windows(2).all(|w| (w[0].seconds, w[0].nanos) > (w[1].seconds, w[1].nanos)));
}

#[test]
fn test_iteration_fault_closes_iterator() {
    let mut sandbox = Sandbox::new("mychannel");
    for key in ["a", "b", "c"] {
        sandbox.put_raw(key, b"v".to_vec());
    }
    sandbox.set_faults(Faults {
        fail_range_after: Some(1),
        ..Faults::none()
    });
    let err = sandbox
        .evaluate(&KvChaincode, "scan", &args(&["", ""]))
        .unwrap_err();
    assert!(err.to_string().contains("QUERY_STATE_NEXT failed"));
    assert_eq!(sandbox.open_iterators(), 0);
}

#[test]
fn test_store_faults_surface_as_errors() {
    let mut sandbox = Sandbox::new("mychannel");
    sandbox.set_faults(Faults {
        fail_get_state: true,
        fail_put_state: true,
        ..Faults::none()
    });
    assert!(sandbox.evaluate(&KvChaincode, "get", &args(&["a"])).is_err());
    assert!(sandbox.submit(&KvChaincode, "put", &args(&["a", "1"])).is_err());
    assert_eq!(sandbox.height(), 0);
}

#[test]
fn test_snapshot_round_trip() {
    let path = std::env::temp_dir().join(format!("sandbox-{}.json", uuid::Uuid::new_v4()));
    let mut sandbox = Sandbox::new("mychannel");
    sandbox.submit(&KvChaincode, "put", &args(&["a", "1"])).unwrap();
    sandbox.delete("a");
    sandbox.put_raw("b", vec![0, 1, 2]);
    sandbox.save(&path).unwrap();

    let restored = Sandbox::load(&path, "ignored").unwrap();
    assert_eq!(restored.height(), 3);
    assert_eq!(restored.ledger().channel, "mychannel");
    assert!(restored.ledger().get("a").is_none());
    assert_eq!(restored.ledger().get("b"), Some(&[0u8, 1, 2][..]));
    assert_eq!(restored.ledger().history("a"), sandbox.ledger().history("a"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_snapshot_loads_empty_ledger() {
    let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
    let sandbox = Sandbox::load(&path, "mychannel").unwrap();
    assert_eq!(sandbox.height(), 0);
    assert!(sandbox.ledger().is_empty());
    assert_eq!(sandbox.ledger().channel, "mychannel");
}
