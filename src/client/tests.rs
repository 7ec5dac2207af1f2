use super::*;
use crate::navigation::RouterService;
use crate::request::MockHttpClient;
use serde_json::json;
use shopadmin_shared::{AuthTokenData, EpochSecs};

const ME_URL: &str = "http://api.test/auth/me";
const REFRESH_URL: &str = "http://api.test/public/auth/refresh";

struct Harness {
    client: ApiClient<MockHttpClient>,
    router: Rc<RouterService>,
}

fn session(access: &str, refresh: &str) -> AuthTokenData {
    let later = EpochSecs::now().as_secs() + 3_600;
    AuthTokenData {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        token_type: "Bearer".to_string(),
        access_expires_at: EpochSecs::new(later),
        refresh_expires_at: EpochSecs::new(later),
    }
}

fn harness() -> Harness {
    let tokens = Rc::new(TokenStore::in_memory(false));
    tokens.set(&session("a1", "r1"));
    let router = Rc::new(RouterService::new("/orders"));
    let client = ApiClient::new(
        ClientConfig::new("http://api.test"),
        MockHttpClient::new(),
        tokens,
        router.clone(),
    );
    Harness { client, router }
}

fn refreshed_body() -> serde_json::Value {
    let later = EpochSecs::now().as_secs() + 3_600;
    json!({
        "code": 200,
        "message": "refreshed",
        "data": {
            "access_token": "a2",
            "refresh_token": "r2",
            "token_type": "Bearer",
            "access_expires_at": later,
            "refresh_expires_at": later
        }
    })
}

#[tokio::test]
async fn test_attaches_auth_and_bypass_headers() {
    let h = harness();
    h.client
        .http()
        .mock_response(HttpMethod::Get, ME_URL, 200, json!({"code": "200", "data": null}));

    let envelope = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap();
    assert!(envelope.is_success());

    let req = h.client.http().last_request().unwrap();
    assert_eq!(req.header(HEADER_AUTHORIZATION), Some("Bearer a1"));
    assert_eq!(req.header(HEADER_TUNNEL_BYPASS), Some("true"));
}

#[tokio::test]
async fn test_bypass_header_follows_config() {
    let tokens = Rc::new(TokenStore::in_memory(true));
    let mut config = ClientConfig::new("http://api.test");
    config.tunnel_bypass = false;
    let client = ApiClient::new(
        config,
        MockHttpClient::new(),
        tokens,
        Rc::new(RouterService::default()),
    );
    client
        .http()
        .mock_response(HttpMethod::Get, ME_URL, 200, json!({"code": "200"}));

    client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap();

    let req = client.http().last_request().unwrap();
    assert!(req.header(HEADER_TUNNEL_BYPASS).is_none());
    assert!(req.header(HEADER_AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_unauthorized_refreshes_and_retries_once() {
    let h = harness();
    let http = h.client.http();
    http.mock_response(HttpMethod::Get, ME_URL, 401, json!({"code": "401", "message": "expired"}));
    http.mock_response(HttpMethod::Get, ME_URL, 200, json!({"code": "200", "data": {"ok": true}}));
    http.mock_response(HttpMethod::Post, REFRESH_URL, 200, refreshed_body());

    let envelope = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap();
    assert_eq!(envelope.data, Some(json!({"ok": true})));

    let calls = http.requests_to(HttpMethod::Get, ME_URL);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].header(HEADER_AUTHORIZATION), Some("Bearer a1"));
    assert_eq!(calls[1].header(HEADER_AUTHORIZATION), Some("Bearer a2"));
    assert_eq!(http.count(HttpMethod::Post, REFRESH_URL), 1);
    assert_eq!(h.router.current_route(), "/orders");
}

#[tokio::test]
async fn test_error_body_code_counts_as_unauthorized() {
    let h = harness();
    let http = h.client.http();
    http.mock_response(HttpMethod::Get, ME_URL, 400, json!({"code": 401, "message": "token invalid"}));
    http.mock_response(HttpMethod::Get, ME_URL, 200, json!({"code": "200"}));
    http.mock_response(HttpMethod::Post, REFRESH_URL, 200, refreshed_body());

    assert!(
        h.client
            .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
            .await
            .is_ok()
    );
    assert_eq!(http.count(HttpMethod::Get, ME_URL), 2);
}

#[tokio::test]
async fn test_failed_refresh_logs_out_and_navigates() {
    let h = harness();
    let http = h.client.http();
    http.mock_response(HttpMethod::Get, ME_URL, 401, json!({"code": "401", "message": "expired"}));
    http.mock_response(HttpMethod::Post, REFRESH_URL, 401, json!({"code": "401"}));

    let err = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap_err();

    match err {
        ApiError::Expired(expired) => {
            assert!(matches!(*expired.cause, ApiError::Http { status: 401, .. }));
        }
        other => panic!("expected session expiry, got {other:?}"),
    }
    assert_eq!(http.count(HttpMethod::Get, ME_URL), 1);
    assert!(h.client.tokens().access_token().is_none());
    assert!(!h.client.session().is_authenticated());
    assert_eq!(h.router.current_route(), "/");
}

#[tokio::test]
async fn test_retry_result_propagates_without_second_refresh() {
    let h = harness();
    let http = h.client.http();
    http.mock_response(HttpMethod::Get, ME_URL, 401, json!({"code": "401"}));
    http.mock_response(HttpMethod::Post, REFRESH_URL, 200, refreshed_body());

    let err = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert_eq!(http.count(HttpMethod::Get, ME_URL), 2);
    assert_eq!(http.count(HttpMethod::Post, REFRESH_URL), 1);
    assert_eq!(h.router.current_route(), "/orders");
}

#[tokio::test]
async fn test_envelope_failure_is_not_retried() {
    let h = harness();
    let http = h.client.http();
    http.mock_response(HttpMethod::Get, ME_URL, 200, json!({"code": "401", "message": "nope"}));

    let err = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Domain { .. }));
    assert_eq!(err.user_message("fallback"), "nope");
    assert_eq!(http.total_requests(), 1);
}

#[tokio::test]
async fn test_other_errors_propagate_unchanged() {
    let h = harness();
    let http = h.client.http();
    http.mock_failure(HttpMethod::Get, ME_URL, "connection refused");

    let err = h
        .client
        .call::<serde_json::Value>(HttpMethod::Get, ME_URL, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));

    http.mock_raw(HttpMethod::Post, ME_URL, 200, "not json");
    let err = h
        .client
        .call::<serde_json::Value>(HttpMethod::Post, ME_URL, Some(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(http.count(HttpMethod::Post, REFRESH_URL), 0);
}

#[test]
fn test_endpoint_escapes_segments_and_query() {
    let h = harness();
    let url = h
        .client
        .endpoint(
            "/system/products",
            &["p 1", "images", "a/b"],
            &[("page", "1".to_string()), ("search", "gold ring".to_string())],
        )
        .unwrap();
    assert_eq!(
        url,
        "http://api.test/system/products/p%201/images/a%2Fb?page=1&search=gold+ring"
    );

    let trailing = h
        .client
        .endpoint("/auth/storages/", &[], &[("ref_id", "pay1".to_string())])
        .unwrap();
    assert_eq!(trailing, "http://api.test/auth/storages/?ref_id=pay1");

    let banks = h
        .client
        .endpoint("/auth/members", &["m1", "banks", ""], &[])
        .unwrap();
    assert_eq!(banks, "http://api.test/auth/members/m1/banks/");
}
