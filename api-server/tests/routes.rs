use api_server::{AppState, router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use client::config::LedgerConfig;
use client::gateway::Gateway;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    config: LedgerConfig,
}

impl TestApp {
    fn new() -> Self {
        let config = LedgerConfig {
            state_file: std::env::temp_dir().join(format!("api-{}.json", uuid::Uuid::new_v4())),
            ..Default::default()
        };
        let gateway = Gateway::open(&config).unwrap();
        TestApp {
            app: router(AppState::new(gateway)),
            config,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, id: &str, price: i64, owner: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/api/assets",
            Some(json!({"id": id, "type": "Car", "price": price, "owner": owner})),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_file(&self.config.state_file).ok();
    }
}

#[tokio::test]
async fn test_empty_ledger_lists_no_assets() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/assets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["height"], 0);
}

#[tokio::test]
async fn test_create_then_search() {
    let app = TestApp::new();
    let (status, body) = app.create("asset7", 700, "Ana").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Asset asset7 created successfully");

    let (status, body) = app.send("GET", "/api/assets/asset7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"ID": "asset7", "Type": "Car", "Price": 700, "Owner": "Ana"})
    );
    assert!(app.config.state_file.exists());
}

#[tokio::test]
async fn test_duplicate_create_is_a_conflict() {
    let app = TestApp::new();
    app.create("asset7", 700, "Ana").await;
    let (status, body) = app.create("asset7", 1, "Brad").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "the asset asset7 already exists");
}

#[tokio::test]
async fn test_unknown_asset_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/assets/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "the asset ghost does not exist");

    let (status, _) = app
        .send(
            "PUT",
            "/api/assets/ghost/transfer",
            Some(json!({"newOwner": "Ana"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transfer_and_reprice() {
    let app = TestApp::new();
    app.create("asset7", 700, "Ana").await;

    let (status, body) = app
        .send(
            "PUT",
            "/api/assets/asset7/transfer",
            Some(json!({"newOwner": "Brad"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset asset7 transferred to Brad");

    let (status, body) = app
        .send(
            "PUT",
            "/api/assets/asset7/price",
            Some(json!({"newPrice": 650})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Price of asset asset7 updated to 650");

    let (_, body) = app.send("GET", "/api/assets/asset7/history", None).await;
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["record"], json!({"Price": 650, "Owner": "Brad"}));
    assert_eq!(history[2]["record"], json!({"Price": 700, "Owner": "Ana"}));
}

#[tokio::test]
async fn test_noop_updates_are_rejected() {
    let app = TestApp::new();
    app.create("asset7", 700, "Ana").await;

    let (status, body) = app
        .send(
            "PUT",
            "/api/assets/asset7/price",
            Some(json!({"newPrice": 700})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "price is already 700, no update performed");

    let (status, body) = app
        .send(
            "PUT",
            "/api/assets/asset7/transfer",
            Some(json!({"newOwner": "Ana"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "asset is already owned by Ana, no transfer performed"
    );

    let (_, body) = app.send("GET", "/health", None).await;
    assert_eq!(body["height"], 1);
}

#[tokio::test]
async fn test_history_of_unknown_asset_is_empty() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/assets/ghost/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let app = TestApp::new();
    let bodies = [
        json!({"id": "asset7", "type": "Car", "price": "ten", "owner": "Ana"}),
        json!({"id": "asset7"}),
    ];
    for body in bodies {
        let (status, body) = app.send("POST", "/api/assets", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("invalid request body")
        );
    }

    app.create("asset7", 700, "Ana").await;
    let (status, body) = app
        .send(
            "PUT",
            "/api/assets/asset7/price",
            Some(json!({"price": 650})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("newPrice"));

    let request = Request::builder()
        .method("PUT")
        .uri("/api/assets/asset7/transfer")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (_, body) = app.send("GET", "/health", None).await;
    assert_eq!(body["height"], 1);
}
