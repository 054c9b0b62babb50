use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::SharedState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub price: i64,
    pub owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub new_owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub new_price: i64,
}

/// Decodes a chaincode payload, using `empty` when the contract returned nothing.
fn decode(payload: &[u8], empty: Value) -> ApiResult<Value> {
    if payload.is_empty() {
        return Ok(empty);
    }
    Ok(serde_json::from_slice(payload)?)
}

/// Submits on a blocking thread, since a commit also rewrites the ledger snapshot.
async fn submit(state: SharedState, function: &'static str, args: Vec<String>) -> ApiResult<()> {
    tokio::task::spawn_blocking(move || -> ApiResult<()> {
        state.gateway()?.submit_transaction(function, &args)?;
        Ok(())
    })
    .await?
}

fn evaluate(state: &SharedState, function: &str, args: &[String]) -> ApiResult<Vec<u8>> {
    Ok(state.gateway()?.evaluate_transaction(function, args)?)
}

/// GET /health
pub async fn health_check(State(state): State<SharedState>) -> ApiResult<Json<Value>> {
    let gateway = state.gateway()?;
    Ok(Json(json!({
        "status": "ok",
        "channel": gateway.channel(),
        "chaincode": gateway.chaincode(),
        "height": gateway.height(),
    })))
}

/// GET /api/assets
pub async fn get_all_assets(State(state): State<SharedState>) -> ApiResult<Json<Value>> {
    let payload = evaluate(&state, "GetAllAssets", &[])?;
    let assets = decode(&payload, json!([]))?;
    info!("*** Result: {}", assets);
    Ok(Json(assets))
}

/// GET /api/assets/{id}
pub async fn search_asset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let payload = evaluate(&state, "SearchAssetByID", &[id])?;
    let asset = decode(&payload, json!({}))?;
    info!("*** Result: {}", asset);
    Ok(Json(asset))
}

/// POST /api/assets
pub async fn create_asset(
    State(state): State<SharedState>,
    body: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;
    let message = format!("Asset {} created successfully", req.id);
    let args = vec![req.id, req.asset_type, req.price.to_string(), req.owner];
    submit(state, "CreateAsset", args).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": message }))))
}

/// PUT /api/assets/{id}/transfer
pub async fn transfer_asset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let message = format!("Asset {} transferred to {}", id, req.new_owner);
    submit(state, "TransferAsset", vec![id, req.new_owner]).await?;
    Ok(Json(json!({ "message": message })))
}

/// PUT /api/assets/{id}/price
pub async fn update_asset_price(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<PriceRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let message = format!("Price of asset {} updated to {}", id, req.new_price);
    submit(state, "UpdateAssetPrice", vec![id, req.new_price.to_string()]).await?;
    Ok(Json(json!({ "message": message })))
}

/// GET /api/assets/{id}/history
pub async fn get_asset_history(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let payload = evaluate(&state, "GetAssetHistory", &[id])?;
    let history = decode(&payload, json!([]))?;
    info!("*** Result: {}", history);
    Ok(Json(history))
}
