//! Integration tests for the API server.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::SubmitPolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::InMemoryRecordStore;
use serde_json::{Value, json};
use tower::ServiceExt;

use api::config::Config;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup_with_config(config: Config) -> Router {
    let store = InMemoryRecordStore::new();
    let state = api::create_default_state(store, &config);
    api::seed_catalog(&state.catalog).await.unwrap();
    api::create_app(state, get_metrics_handle())
}

async fn setup() -> Router {
    setup_with_config(Config::default()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
}

async fn create_user(app: &Router, username: &str) -> Value {
    let (status, json) = post(
        app,
        "/api/user/create",
        json!({
            "username": username,
            "password": "hunter22",
            "confirmPassword": "hunter22",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json
}

async fn item_id(app: &Router, name: &str) -> String {
    let uri = format!("/api/item/name/{}", name.replace(' ', "%20"));
    let (status, json) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    json[0]["id"].as_str().unwrap().to_string()
}

async fn add_to_cart(
    app: &Router,
    username: &str,
    item_id: &str,
    quantity: i64,
) -> (StatusCode, Value) {
    post(
        app,
        "/api/cart/addToCart",
        json!({ "username": username, "itemId": item_id, "quantity": quantity }),
    )
    .await
}

async fn remove_from_cart(
    app: &Router,
    username: &str,
    item_id: &str,
    quantity: i64,
) -> (StatusCode, Value) {
    post(
        app,
        "/api/cart/removeFromCart",
        json!({ "username": username, "itemId": item_id, "quantity": quantity }),
    )
    .await
}

// -- Ambient endpoints --

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
}

// -- Catalog --

#[tokio::test]
async fn test_list_seeded_items() {
    let app = setup().await;

    let (status, json) = get(&app, "/api/item").await;
    assert_eq!(status, StatusCode::OK);

    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Round Widget");
    assert_eq!(items[0]["price"], "2.99");
    assert_eq!(items[0]["description"], "A widget that is round");
    assert_eq!(items[1]["name"], "Square Widget");
    assert_eq!(items[1]["price"], "1.99");
}

#[tokio::test]
async fn test_seeding_twice_registers_nothing_new() {
    let store = InMemoryRecordStore::new();
    let state = api::create_default_state(store, &Config::default());

    assert_eq!(api::seed_catalog(&state.catalog).await.unwrap(), 2);
    assert_eq!(api::seed_catalog(&state.catalog).await.unwrap(), 0);
    assert_eq!(state.catalog.list_items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_item_by_id() {
    let app = setup().await;
    let id = item_id(&app, "Square Widget").await;

    let (status, json) = get(&app, &format!("/api/item/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["name"], "Square Widget");
}

#[tokio::test]
async fn test_get_unknown_item_returns_404() {
    let app = setup().await;

    let (status, json) = get(&app, "/api/item/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_get_item_with_malformed_id_returns_400() {
    let app = setup().await;

    let (status, _) = get(&app, "/api/item/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_items_by_unknown_name_return_404() {
    let app = setup().await;

    let (status, json) = get(&app, "/api/item/name/Triangle").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Triangle"));
}

// -- Users --

#[tokio::test]
async fn test_create_user_returns_user_with_empty_cart() {
    let app = setup().await;

    let json = create_user(&app, "alice").await;
    assert_eq!(json["username"], "alice");
    assert!(json["id"].is_string());
    assert_eq!(json["cart"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(json["cart"]["total"], "0");
    assert!(json.get("password").is_none());
    assert!(json.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_username_returns_409() {
    let app = setup().await;
    create_user(&app, "alice").await;

    let (status, json) = post(
        &app,
        "/api/user/create",
        json!({ "username": "alice", "password": "another1", "confirmPassword": "another1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("alice"));
}

#[tokio::test]
async fn test_rejected_passwords_return_400() {
    let app = setup().await;

    let (status, _) = post(
        &app,
        "/api/user/create",
        json!({ "username": "bob", "password": "short", "confirmPassword": "short" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/user/create",
        json!({ "username": "bob", "password": "longenough", "confirmPassword": "different1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/user/bob").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_by_username_and_id() {
    let app = setup().await;
    let created = create_user(&app, "alice").await;
    let id = created["id"].as_str().unwrap();

    let (status, by_name) = get(&app, "/api/user/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["id"], id);

    let (status, by_id) = get(&app, &format!("/api/user/id/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["username"], "alice");
    assert_eq!(by_id["cart"]["id"], created["cart"]["id"]);
}

#[tokio::test]
async fn test_unknown_user_returns_404() {
    let app = setup().await;

    let (status, _) = get(&app, "/api/user/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/user/id/00000000-0000-0000-0000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Cart --

#[tokio::test]
async fn test_add_and_remove_items() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;
    let square = item_id(&app, "Square Widget").await;

    let (status, cart) = add_to_cart(&app, "alice", &round, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total"], "5.98");

    let (_, cart) = add_to_cart(&app, "alice", &square, 1).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 3);
    assert_eq!(cart["total"], "7.97");

    let (status, cart) = remove_from_cart(&app, "alice", &round, 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total"], "4.98");

    let (_, user) = get(&app, "/api/user/alice").await;
    assert_eq!(user["cart"]["total"], "4.98");
}

#[tokio::test]
async fn test_removing_more_than_present_clamps() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;

    add_to_cart(&app, "alice", &round, 2).await;
    let (status, cart) = remove_from_cart(&app, "alice", &round, 50).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(cart["total"], "0");
}

#[tokio::test]
async fn test_removing_far_beyond_add_limit_clamps() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;
    let square = item_id(&app, "Square Widget").await;

    add_to_cart(&app, "alice", &round, 3).await;
    add_to_cart(&app, "alice", &square, 1).await;
    let (status, cart) = remove_from_cart(&app, "alice", &round, 20_000).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["total"], "1.99");
}

#[tokio::test]
async fn test_cart_errors() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;

    let (status, _) = add_to_cart(&app, "ghost", &round, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unknown = "00000000-0000-0000-0000-000000000000";
    let (status, _) = add_to_cart(&app, "alice", unknown, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = add_to_cart(&app, "alice", &round, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = remove_from_cart(&app, "alice", &round, -3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = add_to_cart(&app, "alice", "bogus", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, user) = get(&app, "/api/user/alice").await;
    assert_eq!(user["cart"]["items"].as_array().unwrap().len(), 0);
}

// -- Orders --

#[tokio::test]
async fn test_submit_order_and_history() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;
    add_to_cart(&app, "alice", &round, 3).await;

    let (status, order) = post(&app, "/api/order/submit/alice", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["username"], "alice");
    assert_eq!(order["items"].as_array().unwrap().len(), 3);
    assert_eq!(order["total"], "8.97");
    assert!(order["createdAt"].is_string());

    let (status, history) = get(&app, "/api/order/history/alice").await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], order["id"]);
}

#[tokio::test]
async fn test_default_policy_retains_cart_and_order_is_frozen() {
    let app = setup().await;
    create_user(&app, "alice").await;
    let round = item_id(&app, "Round Widget").await;
    add_to_cart(&app, "alice", &round, 1).await;

    post(&app, "/api/order/submit/alice", Value::Null).await;
    let (_, cart) = add_to_cart(&app, "alice", &round, 1).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);

    let (_, history) = get(&app, "/api/order/history/alice").await;
    assert_eq!(history[0]["items"].as_array().unwrap().len(), 1);
    assert_eq!(history[0]["total"], "2.99");
}

#[tokio::test]
async fn test_clear_policy_empties_cart() {
    let app = setup_with_config(Config {
        submit_policy: SubmitPolicy::ClearCart,
        ..Config::default()
    })
    .await;
    create_user(&app, "alice").await;
    let square = item_id(&app, "Square Widget").await;
    add_to_cart(&app, "alice", &square, 2).await;

    let (status, order) = post(&app, "/api/order/submit/alice", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total"], "3.98");

    let (_, user) = get(&app, "/api/user/alice").await;
    assert_eq!(user["cart"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_orders_for_unknown_user_return_404() {
    let app = setup().await;

    let (status, _) = post(&app, "/api/order/submit/ghost", Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/order/history/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_of_new_user_is_empty() {
    let app = setup().await;
    create_user(&app, "alice").await;

    let (status, history) = get(&app, "/api/order/history/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));
}
