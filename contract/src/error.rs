use ledger_api::timestamp::InvalidTimestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("the asset {0} does not exist")]
    NotFound(String),
    #[error("the asset {0} already exists")]
    AlreadyExists(String),
    #[error("price is already {0}, no update performed")]
    PriceUnchanged(i64),
    #[error("asset is already owned by {0}, no transfer performed")]
    OwnerUnchanged(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Timestamp(#[from] InvalidTimestamp),
    #[error("{context}: {cause:#}")]
    Store {
        context: &'static str,
        cause: anyhow::Error,
    },
    #[error("Function {0} not found in contract")]
    UnknownFunction(String),
    #[error("invalid arguments for {function}: {reason}")]
    InvalidArguments { function: String, reason: String },
}

/// Coarse classification callers use to react to a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    NoOp,
    Serialization,
    Store,
    InvalidArgument,
}

impl ContractError {
    pub fn store(context: &'static str, cause: anyhow::Error) -> Self {
        ContractError::Store { context, cause }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::NotFound(_) => ErrorKind::NotFound,
            ContractError::AlreadyExists(_) => ErrorKind::Conflict,
            ContractError::PriceUnchanged(_) | ContractError::OwnerUnchanged(_) => ErrorKind::NoOp,
            ContractError::Serialization(_) | ContractError::Timestamp(_) => {
                ErrorKind::Serialization
            }
            ContractError::Store { .. } => ErrorKind::Store,
            ContractError::UnknownFunction(_) | ContractError::InvalidArguments { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
