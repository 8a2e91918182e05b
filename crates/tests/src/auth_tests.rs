use crate::fixtures::{
    fake_google::VALID_CODE,
    test_app::{TestApp, location},
};
use reqwest::{Url, multipart};
use serde_json::Value;
use std::collections::HashMap;

#[tokio::test]
async fn landing_page_offers_sign_in() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_text("/").await;

    assert_eq!(status, 200);
    assert!(body.contains("Sign in with Google"));
    assert!(body.contains(r#"href="/authorize""#));
}

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::spawn().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn authenticated_routes_redirect_to_authorize_without_remote_calls() {
    let app = TestApp::spawn().await;

    let resp = app.get("/dashboard").await;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/authorize");

    let resp = app.get("/dashboard?folder_id=abc").await;
    assert_eq!(location(&resp), "/authorize");

    let resp = app.get("/download/some-file").await;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/authorize");

    let resp = app
        .client
        .post(app.url("/delete/some-file"))
        .form(&[("folder_id", "root")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/authorize");

    let form = multipart::Form::new()
        .part(
            "file",
            multipart::Part::bytes(b"data".to_vec()).file_name("a.txt"),
        )
        .text("folder_id", "root");
    let resp = app
        .client
        .post(app.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/authorize");

    assert_eq!(app.google.drive_calls(), 0);
}

#[tokio::test]
async fn authorize_redirects_to_consent_screen() {
    let app = TestApp::spawn().await;

    let resp = app.get("/authorize").await;
    assert_eq!(resp.status().as_u16(), 302);
    assert!(resp.headers().get("set-cookie").is_some());

    let consent = Url::parse(&location(&resp)).unwrap();
    assert_eq!(consent.path(), "/o/oauth2/auth");

    let query: HashMap<_, _> = consent.query_pairs().into_owned().collect();
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["client_id"], "test-client-id");
    assert_eq!(query["redirect_uri"], "http://localhost:5000/oauth2callback");
    assert_eq!(query["scope"], "https://www.googleapis.com/auth/drive");
    assert_eq!(query["access_type"], "offline");
    assert_eq!(query["include_granted_scopes"], "true");
    assert_eq!(query["prompt"], "select_account consent");
    assert!(!query["state"].is_empty());
}

#[tokio::test]
async fn successful_callback_unlocks_dashboard() {
    let app = TestApp::spawn().await;

    app.sign_in().await;
    assert_eq!(app.google.token_calls(), 1);

    let (status, body) = app.get_text("/dashboard").await;
    assert_eq!(status, 200);
    assert!(body.contains("My Drive"));
    assert!(body.contains("This folder is empty."));
}

#[tokio::test]
async fn forged_state_is_rejected_before_token_exchange() {
    let app = TestApp::spawn().await;

    app.begin_sign_in().await;
    let resp = app.callback(VALID_CODE, "forged-state").await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(resp.text().await.unwrap().contains("Sign in again"));

    assert_eq!(app.google.token_calls(), 0);
    assert_eq!(location(&app.get("/dashboard").await), "/authorize");
}

#[tokio::test]
async fn callback_without_authorize_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app.callback(VALID_CODE, "never-issued").await;
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.google.token_calls(), 0);
}

#[tokio::test]
async fn state_cannot_be_replayed() {
    let app = TestApp::spawn().await;

    let state = app.begin_sign_in().await;
    let resp = app.callback(VALID_CODE, &state).await;
    assert_eq!(resp.status().as_u16(), 302);

    let resp = app.callback(VALID_CODE, &state).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.google.token_calls(), 1);
}

#[tokio::test]
async fn rejected_code_surfaces_exchange_error() {
    let app = TestApp::spawn().await;

    let state = app.begin_sign_in().await;
    let resp = app.callback("bogus-code", &state).await;
    assert_eq!(resp.status().as_u16(), 502);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Signing in with Google failed")
    );

    assert_eq!(app.google.token_calls(), 1);
    assert_eq!(location(&app.get("/dashboard").await), "/authorize");
}

#[tokio::test]
async fn provider_denial_is_reported() {
    let app = TestApp::spawn().await;

    let state = app.begin_sign_in().await;
    let resp = app
        .client
        .get(app.url("/oauth2callback"))
        .query(&[("error", "access_denied"), ("state", state.as_str())])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
    assert!(resp.text().await.unwrap().contains("access_denied"));
    assert_eq!(app.google.token_calls(), 0);
}

#[tokio::test]
async fn logout_clears_credentials() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let resp = app.get("/logout").await;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/");

    assert_eq!(location(&app.get("/dashboard").await), "/authorize");
}

#[tokio::test]
async fn landing_page_signs_the_user_out() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    assert_eq!(app.get("/dashboard").await.status().as_u16(), 200);

    assert_eq!(app.get("/").await.status().as_u16(), 200);

    assert_eq!(location(&app.get("/dashboard").await), "/authorize");
}

#[tokio::test]
async fn sessions_are_isolated_per_browser() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let other = crate::fixtures::test_app::new_client();
    let resp = other.get(app.url("/dashboard")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(location(&resp), "/authorize");
}

#[tokio::test]
async fn tampered_session_cookie_is_ignored() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let other = crate::fixtures::test_app::new_client();
    let resp = other
        .get(app.url("/dashboard"))
        .header("cookie", "driveshelf_session=stolen-id.00ff")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/authorize");
}

#[tokio::test]
async fn expired_token_offers_reauthentication() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.google.expire_tokens();

    let (status, body) = app.get_text("/dashboard").await;
    assert_eq!(status, 401);
    assert!(body.contains("expired"));
    assert!(body.contains(r#"<a href="/">Sign in again</a>"#));
}

#[tokio::test]
async fn anonymous_authorize_traffic_keeps_session_store_bounded() {
    let app = TestApp::spawn_with_settings(|s| s.session.max_sessions = 5).await;

    for _ in 0..20 {
        let browser = crate::fixtures::test_app::new_client();
        let resp = browser.get(app.url("/authorize")).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 302);
        assert!(app.sessions.len() <= 5);
    }
    assert_eq!(app.sessions.len(), 5);

    // a fresh sign-in still works once the store is full
    app.sign_in().await;
    assert_eq!(app.get("/dashboard").await.status().as_u16(), 200);
}
