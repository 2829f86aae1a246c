//! Router tests: pages, contact endpoint, theme API, static files, hero stream.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use futures_util::StreamExt;
use lenscraft::config::SiteConfig;
use lenscraft::server::{AppState, router};
use lenscraft::theme::{MemoryStore, NoPlatform, ThemePreference};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestSite {
    _public: TempDir,
    state: AppState,
}

fn test_site(stored_theme: Option<&str>) -> TestSite {
    let public = TempDir::new().unwrap();
    fs::create_dir_all(public.path().join("images")).unwrap();
    fs::write(public.path().join("images/hero1.jpg"), b"not really a jpeg").unwrap();

    let store = match stored_theme {
        Some(value) => MemoryStore::with_value("theme", value),
        None => MemoryStore::new(),
    };
    let theme = ThemePreference::init("theme", Arc::new(store), &NoPlatform, false);
    let state = AppState::new(SiteConfig::default(), theme, public.path());
    TestSite {
        _public: public,
        state,
    }
}

async fn send(site: &TestSite, request: Request<Body>) -> (StatusCode, String) {
    let response = router(site.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn every_page_renders() {
    let site = test_site(None);
    for (uri, marker) in [
        ("/", "LENS"),
        ("/about", "My Journey"),
        ("/portfolio", "gallery-grid"),
        ("/contact", "Contact Me"),
    ] {
        let (status, body) = send(&site, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains(marker), "{uri} missing {marker}");
        assert!(body.contains("JD Photography"), "{uri} missing brand");
    }
}

#[tokio::test]
async fn unknown_path_gets_not_found_page() {
    let site = test_site(None);
    let (status, body) = send(&site, get("/services")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
}

#[tokio::test]
async fn contact_accepts_complete_message() {
    let site = test_site(None);
    let (status, body) = send(
        &site,
        post_json("/api/contact", r#"{"name":"A","email":"a@b.com","message":"hi"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"success": true}));
}

#[tokio::test]
async fn contact_rejects_missing_fields() {
    let site = test_site(None);
    for payload in [
        r#"{"name":"","email":"a@b.com","message":"hi"}"#,
        r#"{"email":"a@b.com","message":"hi"}"#,
        "not json",
    ] {
        let (status, body) = send(&site, post_json("/api/contact", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({"error": "All fields required"})
        );
    }
}

fn toggle(cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::builder().method("POST").uri("/api/theme/toggle");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// `name=value` from a `Set-Cookie` header, ready to send back.
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn theme_toggle_changes_rendered_pages() {
    let site = test_site(None);

    let (_, body) = send(&site, get("/api/theme")).await;
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"theme": "light", "isDark": false})
    );
    let (_, page) = send(&site, get("/")).await;
    assert!(page.contains(r#"<html lang="en">"#));

    let response = router(site.state.clone()).oneshot(toggle(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("theme=dark;"), "{set_cookie}");
    assert!(set_cookie.contains("Path=/"), "{set_cookie}");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({"theme": "dark", "isDark": true})
    );

    let cookie = cookie_pair(&set_cookie);
    let (_, page) = send(&site, get_with_cookie("/about", &cookie)).await;
    assert!(page.contains(r#"<html lang="en" class="dark">"#));

    let (_, body) = send(&site, toggle(Some(&cookie))).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["theme"], "light");
}

#[tokio::test]
async fn one_visitors_toggle_leaves_others_alone() {
    let site = test_site(None);

    let response = router(site.state.clone()).oneshot(toggle(None)).await.unwrap();
    let cookie = cookie_pair(response.headers()[header::SET_COOKIE].to_str().unwrap());

    let (_, page) = send(&site, get("/portfolio")).await;
    assert!(page.contains(r#"<html lang="en">"#));
    let (_, body) = send(&site, get("/api/theme")).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["isDark"], false);

    let (_, page) = send(&site, get_with_cookie("/portfolio", &cookie)).await;
    assert!(page.contains(r#"<html lang="en" class="dark">"#));

    assert!(!site.state.theme.read());
    assert!(!site.state.theme.has_override());
}

#[tokio::test]
async fn visitor_cookie_beats_site_default() {
    let site = test_site(Some("dark"));
    let (_, page) = send(&site, get_with_cookie("/", "other=1; theme=light")).await;
    assert!(page.contains(r#"<html lang="en">"#));

    let (_, page) = send(&site, get("/")).await;
    assert!(page.contains(r#"<html lang="en" class="dark">"#));
}

#[tokio::test]
async fn stored_theme_is_used_at_startup() {
    let site = test_site(Some("dark"));
    let (_, body) = send(&site, get("/api/theme")).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["isDark"], true);
}

#[tokio::test]
async fn images_are_served_from_public_dir() {
    let site = test_site(None);
    let (status, body) = send(&site, get("/images/hero1.jpg")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "not really a jpeg");

    let (status, _) = send(&site, get("/images/missing.jpg")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hero_stream_starts_with_preloading_snapshot() {
    let site = test_site(None);
    let response = router(site.state.clone())
        .oneshot(get("/api/hero/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8(first.to_vec()).unwrap();
    assert!(text.contains("event: hero\n"), "{text}");

    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let snapshot: Value = serde_json::from_str(data).unwrap();
    assert_eq!(snapshot["phase"], json!({"name": "preloading"}));
    assert_eq!(snapshot["assets_ready"], false);
    assert_eq!(snapshot["captured"], json!([]));
}
