//! Integration tests for the request dispatcher.
//!
//! These tests verify retry handling for rate-limited responses, error
//! passthrough, response parsing, body envelopes and header merging.

use std::sync::Arc;
use std::time::{Duration, Instant};

use elasticpath::clients::{HttpClient, HttpMethod, HttpRequest};
use elasticpath::{ClientConfig, ClientConfigBuilder, ClientId, ElasticPath, Host, HttpError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Creates a builder pointing at the mock server.
///
/// Requests in these tests carry an explicit token, so no client ID is needed.
fn builder_for(server: &MockServer) -> ClientConfigBuilder {
    ClientConfig::builder()
        .protocol("http")
        .host(Host::new(server.address().to_string()).unwrap())
        .retry_delay(RETRY_DELAY)
        .retry_jitter(Duration::ZERO)
        .disable_cart(true)
}

fn dispatcher(config: ClientConfig) -> HttpClient {
    HttpClient::new(Arc::new(config))
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::builder(HttpMethod::Get, path)
        .token(Some("test-token".to_string()))
        .build()
}

// ============================================================================
// Rate Limit Retries
// ============================================================================

#[tokio::test]
async fn test_429_then_200_returns_success_after_one_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{"status": 429, "title": "Too Many Requests"}]
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "p1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());

    let started = Instant::now();
    let body = client.request(get("products")).await.unwrap();

    assert!(started.elapsed() >= RETRY_DELAY);
    assert_eq!(body["data"][0]["id"], "p1");
}

#[tokio::test]
async fn test_429_on_every_attempt_surfaces_final_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{"status": 429, "title": "Too Many Requests"}]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).fetch_max_attempts(3).build().unwrap());
    let result = client.request(get("products")).await;

    match result {
        Err(HttpError::MaxRetries(error)) => {
            assert_eq!(error.status, 429);
            assert_eq!(error.tries, 3);
            assert_eq!(error.body["errors"][0]["title"], "Too Many Requests");
        }
        other => panic!("Expected MaxRetries, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_single_attempt_surfaces_429_as_response_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"errors": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).fetch_max_attempts(1).build().unwrap());
    let result = client.request(get("products")).await;

    assert!(matches!(result, Err(HttpError::Response(ref e)) if e.status == 429));
}

#[tokio::test]
async fn test_backoff_grows_linearly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());

    let started = Instant::now();
    client.request(get("orders")).await.unwrap();

    // 1 * delay + 2 * delay
    assert!(started.elapsed() >= RETRY_DELAY * 3);
}

// ============================================================================
// Error Passthrough and Parsing
// ============================================================================

#[tokio::test]
async fn test_non_429_error_is_surfaced_immediately_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": 404, "title": "Not Found", "detail": "No product found"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());
    let error = client.request(get("products/missing")).await.unwrap_err();

    assert_eq!(error.status(), Some(404));
    assert_eq!(
        error.body(),
        Some(&json!({
            "errors": [{"status": 404, "title": "Not Found", "detail": "No product found"}]
        }))
    );
}

#[tokio::test]
async fn test_204_resolves_to_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/products/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());
    let request = HttpRequest::builder(HttpMethod::Delete, "products/p1")
        .token(Some("test-token".to_string()))
        .build();

    assert_eq!(client.request(request).await.unwrap(), json!({}));
}

#[tokio::test]
async fn test_non_json_body_resolves_to_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());
    assert_eq!(client.request(get("health")).await.unwrap(), json!({}));
}

// ============================================================================
// Request Shape
// ============================================================================

#[tokio::test]
async fn test_explicit_token_skips_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/catalog"))
        .and(header("Authorization", "Bearer shopper-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(builder_for(&server).build().unwrap()).unwrap();
    client
        .endpoint("catalog")
        .with_token("shopper-token")
        .all()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/oauth/access_token"));
}

#[tokio::test]
async fn test_create_wraps_body_in_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/currencies"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"data": {"type": "currency", "code": "GBP"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "c1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(builder_for(&server).build().unwrap()).unwrap();
    let body = client
        .currencies()
        .with_token("test-token")
        .create(json!({"type": "currency", "code": "GBP"}))
        .await
        .unwrap();

    assert_eq!(body["data"]["id"], "c1");
}

#[tokio::test]
async fn test_options_are_sent_beside_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/carts/c1/items"))
        .and(body_json(json!({
            "data": {"type": "cart_item", "id": "p1", "quantity": 1},
            "options": {"add_all_or_nothing": true}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());
    let request = HttpRequest::builder(HttpMethod::Post, "carts/c1/items")
        .token(Some("test-token".to_string()))
        .body(json!({
            "data": {"type": "cart_item", "id": "p1", "quantity": 1},
            "options": {"add_all_or_nothing": true}
        }))
        .build();

    client.request(request).await.unwrap();
}

#[tokio::test]
async fn test_unwrapped_body_and_version_override() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/pcm/hierarchies/h1"))
        .and(body_json(json!({"raw": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = dispatcher(builder_for(&server).build().unwrap());
    let request = HttpRequest::builder(HttpMethod::Put, "hierarchies/h1")
        .token(Some("test-token".to_string()))
        .version("pcm")
        .wrap_body(false)
        .body(json!({"raw": true}))
        .build();

    client.request(request).await.unwrap();
}

#[tokio::test]
async fn test_sdk_currency_and_configured_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .and(header("X-MOLTIN-SDK-LANGUAGE", "rust"))
        .and(header("X-MOLTIN-SDK-VERSION", env!("CARGO_PKG_VERSION")))
        .and(header("X-MOLTIN-APPLICATION", "storefront"))
        .and(header("X-MOLTIN-CURRENCY", "EUR"))
        .and(header("X-MOLTIN-CHANNEL", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(
        builder_for(&server)
            .application("storefront")
            .header("X-MOLTIN-CHANNEL", "web")
            .build()
            .unwrap(),
    )
    .unwrap();
    client.set_currency("EUR").unwrap();

    client
        .products()
        .with_token("test-token")
        .all()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_relationships_sends_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/products/p1/relationships/categories"))
        .and(body_json(json!({
            "data": [{"type": "category", "id": "c1"}, {"type": "category", "id": "c2"}]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(builder_for(&server).build().unwrap()).unwrap();
    let body = client
        .products()
        .with_token("test-token")
        .delete_relationships("p1", "category", &json!(["c1", "c2"]))
        .await
        .unwrap();

    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_list_request_sends_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/products"))
        .and(query_param("include", "main_image"))
        .and(query_param("page[limit]", "5"))
        .and(query_param("filter", "eq(status,live)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(builder_for(&server).build().unwrap()).unwrap();
    client
        .products()
        .with_token("test-token")
        .with(["main_image"])
        .limit(5)
        .filter(elasticpath::Filter::new().eq("status", "live"))
        .all()
        .await
        .unwrap();
}

// ============================================================================
// Facades
// ============================================================================

#[tokio::test]
async fn test_customer_password_token_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/customers/tokens"))
        .and(header("X-Moltin-Customer-Token", "ignored"))
        .and(body_json(json!({
            "data": {
                "type": "token",
                "authentication_mechanism": "password",
                "email": "ada@example.com",
                "password": "secret"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"type": "token", "token": "customer-token"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(builder_for(&server).build().unwrap()).unwrap();
    let mut headers = std::collections::HashMap::new();
    headers.insert("X-Moltin-Customer-Token".to_string(), "ignored".to_string());

    let body = client
        .customers()
        .with_token("test-token")
        .token_via_password("ada@example.com", "secret", headers)
        .await;

    assert_eq!(body.unwrap()["data"]["token"], "customer-token");
}

#[tokio::test]
async fn test_cart_add_product_posts_to_bound_cart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "implicit-token",
            "expires": 9_999_999_999_i64
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/carts/cart-1/items"))
        .and(header("Authorization", "Bearer implicit-token"))
        .and(body_json(json!({
            "data": {"type": "cart_item", "id": "p1", "quantity": 2}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ElasticPath::new(
        builder_for(&server)
            .client_id(ClientId::new("abc").unwrap())
            .build()
            .unwrap(),
    )
    .unwrap();

    let body = client.cart_with_id("cart-1").add_product("p1", 2).await.unwrap();
    assert_eq!(body, json!({"data": []}));
}

// ============================================================================
// Transport Failures
// ============================================================================

/// Serves one response that promises more body bytes than it sends.
fn serve_truncated_body() -> std::net::SocketAddr {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0_u8; 4096];
        let _ = stream.read(&mut buf);
        let _ = stream.write_all(
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"data\":[",
        );
        let _ = stream.flush();
    });

    address
}

#[tokio::test]
async fn test_truncated_body_is_a_transport_error() {
    let address = serve_truncated_body();

    let client = dispatcher(
        ClientConfig::builder()
            .protocol("http")
            .host(Host::new(address.to_string()).unwrap())
            .disable_cart(true)
            .build()
            .unwrap(),
    );
    let result = client.request(get("products")).await;

    assert!(
        matches!(result, Err(HttpError::Transport(_))),
        "Expected Transport error, got: {result:?}"
    );
}
