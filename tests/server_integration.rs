//! In-process router tests: response framing, the two-status error surface,
//! and the no-session-on-validation-failure guarantee.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{FailAt, MockEngine, MockStats, HTML_SAMPLE, PNG_SAMPLE};
use http_body_util::BodyExt;
use rendergate_lib::{router, AppState, LaunchOptions, GENERIC_FAILURE, MISSING_URL_HELP};
use tower::ServiceExt;

fn app(engine: MockEngine) -> (axum::Router, Arc<MockStats>) {
    let stats = engine.stats.clone();
    let state = Arc::new(AppState::new(Arc::new(engine), LaunchOptions::default()));
    (router(state), stats)
}

async fn get(app: axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build"),
    )
    .await
    .expect("handler should not fail")
}

async fn body_bytes(response: axum::http::Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn missing_url_is_rejected_without_opening_a_session() {
    let (app, stats) = app(MockEngine::new(FailAt::Nothing));
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await, MISSING_URL_HELP.as_bytes());
    assert_eq!(stats.connects(), 0);
}

#[tokio::test]
async fn default_output_is_the_rendered_html() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(app, "/?url=example.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, HTML_SAMPLE.as_bytes());
}

#[tokio::test]
async fn screenshot_response_is_an_image_with_matching_length() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(app, "/?url=example.com&type=screenshot&width=400&height=300").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let declared: usize = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body = body_bytes(response).await;
    assert_eq!(declared, body.len());
    assert_eq!(body, PNG_SAMPLE);
}

#[tokio::test]
async fn jpeg_screenshots_negotiate_their_content_type() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(
        app,
        "/?url=example.com&type=screenshot&screenshotType=jpeg&quality=70",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn pdf_response_carries_a_derived_content_disposition() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(app, "/?url=example.com/reports/q1.summary&type=pdf").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"q1.pdf\""
    );
}

#[tokio::test]
async fn explicit_filename_and_inline_disposition_are_honored() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(
        app,
        "/?url=example.com&type=pdf&filename=result&contentDispositionType=inline",
    )
    .await;

    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"result.pdf\""
    );
}

#[tokio::test]
async fn engine_failures_collapse_to_a_generic_500() {
    let (app, stats) = app(MockEngine::new(FailAt::Navigate));
    let response = get(app, "/?url=unreachable.invalid").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, GENERIC_FAILURE.as_bytes());
    // The failed session was still torn down.
    assert_eq!(stats.connects(), 1);
    assert_eq!(stats.shutdowns(), 1);
}

#[tokio::test]
async fn any_path_reaches_the_renderer() {
    let (app, _) = app(MockEngine::new(FailAt::Nothing));
    let response = get(app, "/render/anything?url=example.com").await;

    assert_eq!(response.status(), StatusCode::OK);
}
