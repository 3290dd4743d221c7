//! Interceptor behavior: token attachment and the single refresh-and-retry.

use chrono::{Duration, Utc};
use serde_json::json;
use sessiondeck::{ApiError, App, Config, MemoryStorage, Session};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_expiring_in(minutes: i64) -> Session {
    Session {
        access_token: "stale-token".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: Utc::now() + Duration::minutes(minutes),
    }
}

fn app_with_session(base_url: &str, session: &Session) -> App {
    let app = App::new(Config::new(base_url), Arc::new(MemoryStorage::new())).unwrap();
    app.store().install(session);
    app
}

#[tokio::test]
async fn attaches_current_access_token_to_outbound_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboardData"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"widgets": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_session(&server.uri(), &session_expiring_in(60));
    let data = app.api().fetch_dashboard_data().await.unwrap();
    assert_eq!(data["widgets"], 3);
}

#[tokio::test]
async fn refreshes_and_retries_once_after_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboardData"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/refreshToken"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "fresh-token",
            "expiresIn": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboardData"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"widgets": 5})))
        .expect(2)
        .mount(&server)
        .await;

    let app = app_with_session(&server.uri(), &session_expiring_in(60));
    let data = app.api().fetch_dashboard_data().await.unwrap();
    assert_eq!(data["widgets"], 5);

    let session = app.store().session().unwrap();
    assert_eq!(session.access_token, "fresh-token");
    assert_eq!(session.refresh_token, "refresh-1");
    assert!(session.expires_at > Utc::now() + Duration::minutes(50));

    // Follow-up requests carry the refreshed token without another 401 dance.
    let data = app.api().fetch_dashboard_data().await.unwrap();
    assert_eq!(data["widgets"], 5);
}

#[tokio::test]
async fn does_not_retry_a_second_time_when_the_retry_is_also_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboardData"))
        .respond_with(ResponseTemplate::new(401).set_body_string("still no"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/refreshToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "fresh-token",
            "expiresIn": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_session(&server.uri(), &session_expiring_in(60));
    let err = app.api().fetch_dashboard_data().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn non_auth_failures_propagate_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboardData"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with_session(&server.uri(), &session_expiring_in(60));
    let err = app.api().fetch_dashboard_data().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
