//! Integration tests for the redirect login flow and signed-request helpers.
//!
//! The login flow spans two HTTP requests handled by the host application,
//! so each test builds one SDK instance per request and shares the session
//! map between them.

use std::sync::Arc;

use autoznetwork::auth::oauth::RandomStringGenerator;
use autoznetwork::auth::CsrfError;
use autoznetwork::helpers::SignedRequestSource;
use autoznetwork::persistence::{PersistentDataBackend, SessionStore};
use autoznetwork::{
    AppId, AppSecret, AutozNetwork, Error, RequestContext, SdkConfig, SignedRequest,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "foo_app_secret";

fn create_sdk(server: &MockServer, session: &SessionStore, context: RequestContext) -> AutozNetwork {
    let config = SdkConfig::builder()
        .app_id(AppId::new("123").unwrap())
        .app_secret(AppSecret::new(SECRET).unwrap())
        .api_base_url(server.uri())
        .persistent_data_backend(PersistentDataBackend::Session(Arc::clone(session)))
        .random_string_generator(Arc::new(RandomStringGenerator::new()))
        .request_context(context)
        .build()
        .unwrap();
    AutozNetwork::new(config).unwrap()
}

async fn mount_token_endpoint(server: &MockServer, code: &str, redirect_uri: &str) {
    Mock::given(method("GET"))
        .and(path("/v1.0/oauth/access_token"))
        .and(query_param("code", code))
        .and(query_param("redirect_uri", redirect_uri))
        .and(query_param("client_id", "123"))
        .and(query_param("client_secret", SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "foo_token",
            "expires_in": 5_184_000
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_round_trip_consumes_state() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "foo_code", "https://myapp.example/callback?foo=bar").await;
    let session = SessionStore::default();

    // Request 1: build the login URL.
    let sdk = create_sdk(&server, &session, RequestContext::new());
    let login_url = sdk
        .redirect_login_helper()
        .login_url("https://myapp.example/callback", &["email"], "&");
    let state = session.lock().unwrap().get("AZN_state").cloned().unwrap();
    assert_eq!(state.len(), 64);
    assert!(login_url.starts_with("https://www.autoznetwork.com/v1.0/dialog/oauth?"));
    assert!(login_url.contains(&format!("state={state}")));

    // Request 2: the dialog redirects back.
    let callback = format!(
        "https://myapp.example/callback?code=foo_code&state={state}&enforce_https=1&foo=bar"
    );
    let sdk = create_sdk(&server, &session, RequestContext::from_url(callback.clone()));
    let token = sdk
        .redirect_login_helper()
        .access_token(None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(token.value(), "foo_token");
    assert!(session.lock().unwrap().get("AZN_state").is_none());

    // Replaying the callback fails: the state was single use.
    let sdk = create_sdk(&server, &session, RequestContext::from_url(callback));
    let replay = sdk.redirect_login_helper().access_token(None).await;
    assert!(matches!(
        replay,
        Err(Error::Csrf(CsrfError::MissingPersistedState))
    ));
}

#[tokio::test]
async fn test_forged_state_is_rejected_and_state_kept() {
    let server = MockServer::start().await;
    let session = SessionStore::default();

    let sdk = create_sdk(&server, &session, RequestContext::new());
    let _ = sdk
        .redirect_login_helper()
        .login_url("https://myapp.example/callback", &[], "&");

    let context =
        RequestContext::from_url("https://myapp.example/callback?code=foo_code&state=forged");
    let sdk = create_sdk(&server, &session, context);
    let result = sdk.redirect_login_helper().access_token(None).await;

    assert!(matches!(result, Err(Error::Csrf(CsrfError::Mismatch))));
    assert!(session.lock().unwrap().get("AZN_state").is_some());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_explicit_redirect_url_is_stripped() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "foo_code", "https://other.example/cb").await;
    let session = SessionStore::default();
    session
        .lock()
        .unwrap()
        .insert("AZN_state".to_string(), "foo_state".to_string());

    let context = RequestContext::new()
        .with_query_param("code", "foo_code")
        .with_query_param("state", "foo_state");
    let sdk = create_sdk(&server, &session, context);
    let token = sdk
        .redirect_login_helper()
        .access_token(Some("https://other.example/cb?state=foo_state&code=foo_code"))
        .await
        .unwrap();

    assert!(token.is_some());
}

#[tokio::test]
async fn test_javascript_helper_exchanges_code_from_cookie() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "foo_code", "").await;
    let session = SessionStore::default();

    let payload = serde_json::json!({"code": "foo_code", "user_id": "123"});
    let raw = SignedRequest::make(payload.as_object().unwrap().clone(), SECRET);
    let context = RequestContext::new().with_cookie("fbsr_123", raw);
    let sdk = create_sdk(&server, &session, context);

    let helper = sdk.javascript_helper().unwrap();
    assert_eq!(helper.user_id().as_deref(), Some("123"));

    let token = helper.access_token().await.unwrap().unwrap();
    assert_eq!(token.value(), "foo_token");
}

#[tokio::test]
async fn test_post_helper_uses_embedded_token() {
    let server = MockServer::start().await;
    let session = SessionStore::default();

    let payload = serde_json::json!({"oauth_token": "embedded_token", "user_id": "321"});
    let raw = SignedRequest::make(payload.as_object().unwrap().clone(), SECRET);
    let context = RequestContext::new().with_post_param("signed_request", raw);
    let sdk = create_sdk(&server, &session, context);

    let helper = sdk.signed_request_helper(&SignedRequestSource::Post).unwrap();
    let token = helper.access_token().await.unwrap().unwrap();

    assert_eq!(token.value(), "embedded_token");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_cookie_signed_with_other_secret_is_rejected() {
    let payload = serde_json::json!({"oauth_token": "foo_token"});
    let raw = SignedRequest::make(payload.as_object().unwrap().clone(), "someone_else");

    let config = SdkConfig::builder()
        .app_id(AppId::new("123").unwrap())
        .app_secret(AppSecret::new(SECRET).unwrap())
        .request_context(RequestContext::new().with_cookie("fbsr_123", raw))
        .build()
        .unwrap();
    let sdk = AutozNetwork::new(config).unwrap();

    assert!(sdk.javascript_helper().is_err());
}
