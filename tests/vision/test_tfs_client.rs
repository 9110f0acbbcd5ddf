// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! TensorFlow Serving client tests against a local stub server
//!
//! The stub answers every request with a canned status and body and keeps
//! the request path and JSON payload for inspection.

use axum::{extract::State, http::StatusCode, http::Uri, Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use object_counter::domain::{BoundingBox, DetectionError, ObjectDetector};
use object_counter::vision::{LabelMap, TfsObjectDetector};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: Value,
    delay: Duration,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn stub_predict(
    State(state): State<StubState>,
    uri: Uri,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), payload));
    tokio::time::sleep(state.delay).await;
    (state.status, Json(state.body.clone()))
}

/// Helper: Start the stub on an ephemeral port
async fn start_stub(
    status: StatusCode,
    body: Value,
    delay: Duration,
) -> (u16, Arc<Mutex<Vec<(String, Value)>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        body,
        delay,
        requests: requests.clone(),
    };
    let app = Router::new().fallback(stub_predict).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (port, requests)
}

fn detector(port: u16, timeout: Duration) -> TfsObjectDetector {
    TfsObjectDetector::new(
        "127.0.0.1",
        port,
        "rfcn",
        LabelMap::mscoco().unwrap(),
        timeout,
    )
    .unwrap()
}

/// Helper: 4 wide, 2 high PNG
fn png_image() -> Vec<u8> {
    let img = RgbImage::from_fn(4, 2, |x, y| Rgb([x as u8, y as u8, 9]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn canned_response() -> Value {
    json!({
        "predictions": [{
            "num_detections": 2.0,
            "detection_boxes": [
                [0.1, 0.2, 0.3, 0.4],
                [0.5, 0.6, 0.7, 0.8],
                [0.0, 0.0, 1.0, 1.0]
            ],
            "detection_scores": [0.95, 0.4, 0.01],
            "detection_classes": [17.0, 18.0, 1.0]
        }]
    })
}

#[tokio::test]
async fn test_predict_maps_response() {
    let (port, requests) = start_stub(StatusCode::OK, canned_response(), Duration::ZERO).await;

    let predictions = detector(port, Duration::from_secs(5))
        .predict(&png_image())
        .await
        .unwrap();

    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].class_name, "cat");
    assert!((predictions[0].score - 0.95).abs() < 1e-6);
    assert_eq!(
        predictions[0].bounding_box,
        BoundingBox {
            xmin: 0.2,
            ymin: 0.1,
            xmax: 0.4,
            ymax: 0.3
        }
    );
    assert_eq!(predictions[1].class_name, "dog");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (path, payload) = &requests[0];
    assert_eq!(path, "/v1/models/rfcn:predict");

    // One instance: 2 rows of 4 RGB pixels
    let instances = payload["instances"].as_array().unwrap();
    assert_eq!(instances.len(), 1);
    let rows = instances[0].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].as_array().unwrap().len(), 4);
    assert_eq!(rows[1][3], json!([3, 1, 9]));
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let (port, _) = start_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "model not loaded"}),
        Duration::ZERO,
    )
    .await;

    let result = detector(port, Duration::from_secs(5))
        .predict(&png_image())
        .await;

    match result {
        Err(DetectionError::Upstream { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model not loaded"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_image_never_reaches_server() {
    let (port, requests) = start_stub(StatusCode::OK, canned_response(), Duration::ZERO).await;

    let result = detector(port, Duration::from_secs(5))
        .predict(b"not an image at all")
        .await;

    assert!(matches!(result, Err(DetectionError::Decode(_))));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_payload() {
    let (port, _) = start_stub(StatusCode::OK, json!({"outputs": []}), Duration::ZERO).await;

    let result = detector(port, Duration::from_secs(5))
        .predict(&png_image())
        .await;

    assert!(matches!(result, Err(DetectionError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unknown_class_index() {
    let body = json!({
        "predictions": [{
            "num_detections": 1.0,
            "detection_boxes": [[0.1, 0.1, 0.2, 0.2]],
            "detection_scores": [0.9],
            "detection_classes": [999.0]
        }]
    });
    let (port, _) = start_stub(StatusCode::OK, body, Duration::ZERO).await;

    let result = detector(port, Duration::from_secs(5))
        .predict(&png_image())
        .await;

    assert!(matches!(result, Err(DetectionError::UnknownClass(999))));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let (port, _) = start_stub(StatusCode::OK, canned_response(), Duration::from_secs(3)).await;

    let result = detector(port, Duration::from_millis(200))
        .predict(&png_image())
        .await;

    match result {
        Err(DetectionError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = detector(port, Duration::from_secs(5))
        .predict(&png_image())
        .await;

    assert!(matches!(result, Err(DetectionError::Transport(_))));
}
