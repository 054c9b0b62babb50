use asset_contract::ErrorKind;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use client::gateway::GatewayError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("malformed chaincode response: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid request body: {}", .0.body_text())]
    BadRequest(#[from] JsonRejection),
    #[error("gateway is unavailable after a failed transaction")]
    Poisoned,
    #[error("transaction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Gateway(GatewayError::Contract(e)) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NoOp => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::Serialization | ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(GatewayError::Persist { .. })
            | ApiError::Payload(_)
            | ApiError::Poisoned
            | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}
