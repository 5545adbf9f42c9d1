use super::*;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use image::{GrayImage, ImageFormat, Luma};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;

use crate::detection::DetectionConfig;
use crate::error::Result as CoreResult;
use crate::types::ProbabilityMask;
use crate::users::memory_store;

const BOUNDARY: &str = "mammorisk-test-boundary";

async fn base_state() -> AppState {
    let tokens = TokenService::new("test-secret", "HS256", Duration::from_secs(900)).unwrap();
    AppState::new(memory_store().await, tokens)
}

/// Pipeline whose model reads pixel intensity as probability
fn intensity_pipeline(calls: Arc<AtomicUsize>) -> DetectionPipeline {
    let producer = move |image: &GrayImage| -> CoreResult<ProbabilityMask> {
        calls.fetch_add(1, Ordering::SeqCst);
        let (w, h) = image.dimensions();
        let data = image.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
        ProbabilityMask::from_raw(w, h, data)
    };
    let config = DetectionConfig {
        input_size: None,
        ..DetectionConfig::default()
    };
    DetectionPipeline::new(Arc::new(producer), config)
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, headers, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = format!(
        "username={}&password={}",
        username.replace('@', "%40"),
        password
    );
    Request::builder()
        .method(Method::POST)
        .uri("/utilisateurs/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/analyse/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn marie() -> Value {
    json!({
        "nom": "Curie",
        "prenom": "Marie",
        "email": "marie@example.org",
        "password": "radium"
    })
}

fn risk_payload() -> Value {
    json!({
        "age": 52, "imc": 27.5, "ant_familiaux": 1, "ant_personnels": 0,
        "age_premieres_regles": 11, "age_premier_enfant": 31, "nb_enfants": 2,
        "mode_vie": "modéré", "tabac": 0, "alcool": 1, "activite_physique": "faible"
    })
}

/// 64x64 dark PNG with a bright 16x16 square at (8, 8)
fn scan_png() -> Vec<u8> {
    let image = GrayImage::from_fn(64, 64, |x, y| {
        let inside = (8..24).contains(&x) && (8..24).contains(&y);
        Luma([if inside { 255 } else { 0 }])
    });
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

// Users

#[tokio::test]
async fn test_create_user() {
    let state = base_state().await;
    let (status, _, body) = send(state, json_request(Method::POST, "/utilisateurs/", marie())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "marie@example.org");
    assert_eq!(body["role"], "medecin");
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_duplicate_user() {
    let state = base_state().await;
    send(state.clone(), json_request(Method::POST, "/utilisateurs/", marie())).await;
    let (status, _, body) = send(state, json_request(Method::POST, "/utilisateurs/", marie())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].as_str().unwrap().contains("marie@example.org"));
}

#[tokio::test]
async fn test_create_user_invalid_email() {
    let state = base_state().await;
    let mut payload = marie();
    payload["email"] = json!("not-an-email");
    let (status, _, body) = send(state, json_request(Method::POST, "/utilisateurs/", payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_login_and_lookup() {
    let state = base_state().await;
    send(state.clone(), json_request(Method::POST, "/utilisateurs/", marie())).await;

    let (status, _, body) = send(state.clone(), login_request("marie@example.org", "radium")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/utilisateurs/marie@example.org")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(state.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prenom"], "Marie");

    let request = Request::builder()
        .uri("/utilisateurs/pierre@example.org")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(state, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("pierre@example.org"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let state = base_state().await;
    send(state.clone(), json_request(Method::POST, "/utilisateurs/", marie())).await;

    let (status, headers, body) = send(state, login_request("marie@example.org", "polonium")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_lookup_requires_token() {
    let state = base_state().await;
    send(state.clone(), json_request(Method::POST, "/utilisateurs/", marie())).await;

    let request = Request::builder()
        .uri("/utilisateurs/marie@example.org")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(state.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let request = Request::builder()
        .uri("/utilisateurs/marie@example.org")
        .header(header::AUTHORIZATION, "Bearer forged.token.value")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(state, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_account_rejected() {
    let state = base_state().await;
    let token = state.tokens.issue("ghost@example.org").unwrap();
    let request = Request::builder()
        .uri("/utilisateurs/ghost@example.org")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(state, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// Diagnostic

#[tokio::test]
async fn test_diagnostic_without_model() {
    let state = base_state().await;
    let (status, _, body) = send(state, json_request(Method::POST, "/diagnostic/", risk_payload())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_diagnostic_score() {
    let model: Arc<dyn RiskModel> = Arc::new(|_: &[f32]| -> CoreResult<f32> { Ok(12.345_6) });
    let state = base_state().await.with_risk_model(model);
    let (status, _, body) = send(state, json_request(Method::POST, "/diagnostic/", risk_payload())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "score_risque": 12.35 }));
}

#[tokio::test]
async fn test_diagnostic_out_of_range() {
    let model: Arc<dyn RiskModel> = Arc::new(|_: &[f32]| -> CoreResult<f32> { Ok(1.0) });
    let state = base_state().await.with_risk_model(model);
    let mut payload = risk_payload();
    payload["age"] = json!(150);
    let (status, _, body) = send(state, json_request(Method::POST, "/diagnostic/", payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn test_diagnostic_unknown_category() {
    let model: Arc<dyn RiskModel> = Arc::new(|_: &[f32]| -> CoreResult<f32> { Ok(1.0) });
    let state = base_state().await.with_risk_model(model);
    let mut payload = risk_payload();
    payload["activite_physique"] = json!("intense");
    let (status, _, body) = send(state, json_request(Method::POST, "/diagnostic/", payload)).await;

    assert!(status.is_client_error());
    assert!(body["detail"].is_string());
}

// Analysis

#[tokio::test]
async fn test_analyse_png() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = base_state()
        .await
        .with_pipeline(intensity_pipeline(calls.clone()));
    let (status, _, body) = send(state, multipart_request("image", "scan.png", &scan_png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(body["status"], "success");
    assert_eq!(body["filename"], "scan.png");
    assert_eq!(body["num_detections"], 1);
    assert_eq!(body["detections"][0]["x"], 8);
    assert_eq!(body["detections"][0]["width"], 16);
    assert!(body["image_original"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert!(body["image_with_boxes"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert!(body["mask"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_analyse_rejects_format_before_inference() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = base_state()
        .await
        .with_pipeline(intensity_pipeline(calls.clone()));
    let (status, _, body) = send(state, multipart_request("image", "report.pdf", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(body["detail"].as_str().unwrap().contains(".dcm"));
}

#[tokio::test]
async fn test_analyse_corrupt_image() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = base_state()
        .await
        .with_pipeline(intensity_pipeline(calls.clone()));
    let (status, _, body) = send(state, multipart_request("image", "scan.jpg", b"garbage")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_analyse_without_model() {
    let state = base_state().await;
    let (status, _, _) = send(state, multipart_request("image", "scan.png", &scan_png())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analyse_missing_field() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = base_state().await.with_pipeline(intensity_pipeline(calls));
    let (status, _, body) = send(state, multipart_request("file", "scan.png", &scan_png())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_analyse_uploads_cleaned_up() {
    let dir = tempfile::TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let state = base_state()
        .await
        .with_pipeline(intensity_pipeline(calls))
        .with_upload_dir(Some(dir.path().to_path_buf()));

    let (status, _, _) = send(state.clone(), multipart_request("image", "scan.png", &scan_png())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(state, multipart_request("image", "scan.jpg", b"garbage")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// CORS

#[tokio::test]
async fn test_cors_preflight() {
    let state = base_state().await;
    let app = router(state).layer(cors_layer(&DEFAULT_ORIGINS));

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/diagnostic/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
