// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /v1/object-count
//!
//! The router runs in dev mode: every model is served by the fake detector
//! and counts live in a fresh in-memory repository per test.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use object_counter::{
    api::{create_app, AppState},
    config::{build_count_actions, CounterConfig},
};
use serde_json::Value;
use std::io::Cursor;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "object-counter-test-boundary";

/// Helper: Router backed by dev-mode actions
async fn setup_app() -> Router {
    let config = CounterConfig::new_for_test();
    let actions = build_count_actions(&config)
        .await
        .expect("Failed to build count actions");
    create_app(AppState::new(actions), config.max_content_length)
}

/// Helper: Small PNG image
fn png_image() -> Vec<u8> {
    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 128]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

enum Part<'a> {
    File {
        file_name: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    },
    Field(&'a str, &'a str),
}

/// Helper: Encode a multipart/form-data body
fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        name, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn png_part<'a>() -> Part<'a> {
    Part::File {
        file_name: "cat.png",
        content_type: "image/png",
        bytes: png_image(),
    }
}

/// Helper: POST the form and return status plus JSON body
async fn post_form(app: Router, parts: Vec<Part<'_>>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/object-count")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[cfg(test)]
mod object_count_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_model_counts_one_cat() {
        let app = setup_app().await;

        let (status, body) = post_form(
            app,
            vec![
                png_part(),
                Part::Field("threshold", "0.9"),
                Part::Field("model_name", "fake"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"current_objects": [{"object_class": "cat", "count": 1}]})
        );
    }

    #[tokio::test]
    async fn test_defaults_apply_without_fields() {
        let app = setup_app().await;

        let (status, body) = post_form(app, vec![png_part()]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_objects"][0]["object_class"], "cat");
        assert!(body.get("total_objects").is_none());
    }

    #[tokio::test]
    async fn test_threshold_above_prediction_score_counts_nothing() {
        let app = setup_app().await;

        let (status, body) = post_form(
            app,
            vec![
                png_part(),
                Part::Field("threshold", "1.0"),
                Part::Field("model_name", "fake"),
                Part::Field("return_total", "true"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_objects"], serde_json::json!([]));
        assert_eq!(body["total_objects"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_invalid_threshold_is_unprocessable_for_every_model() {
        for model in ["rfcn", "fake", "yolo"] {
            let app = setup_app().await;

            let (status, body) = post_form(
                app,
                vec![
                    png_part(),
                    Part::Field("threshold", "1.9"),
                    Part::Field("model_name", model),
                ],
            )
            .await;

            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "model {}", model);
            assert_eq!(body["error"][0]["loc"][0], "threshold");
        }
    }

    #[tokio::test]
    async fn test_unknown_model_is_unprocessable() {
        let app = setup_app().await;

        let (status, body) =
            post_form(app, vec![png_part(), Part::Field("model_name", "yolo")]).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"][0]["loc"][0], "model_name");
        assert_eq!(body["error"][0]["type"], "literal_error");
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let app = setup_app().await;

        let (status, body) = post_form(
            app,
            vec![
                Part::Field("threshold", "0.9"),
                Part::Field("model_name", "fake"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File is required.");
    }

    #[tokio::test]
    async fn test_file_checked_before_fields() {
        let app = setup_app().await;

        let (status, _) = post_form(app, vec![Part::Field("threshold", "1.9")]).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_image_type_is_bad_request() {
        let app = setup_app().await;

        let (status, body) = post_form(
            app,
            vec![Part::File {
                file_name: "notes.txt",
                content_type: "text/plain",
                bytes: b"hello".to_vec(),
            }],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported image type: text/plain");
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_bad_request() {
        let app = setup_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/object-count")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"threshold": 0.9}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_return_total_accumulates() {
        let app = setup_app().await;
        let parts = || {
            vec![
                png_part(),
                Part::Field("threshold", "0.9"),
                Part::Field("model_name", "fake"),
                Part::Field("return_total", "true"),
            ]
        };

        let (status, first) = post_form(app.clone(), parts()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["total_objects"][0]["count"], 1);

        let (status, second) = post_form(app, parts()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["current_objects"][0]["count"], 1);
        assert_eq!(
            second["total_objects"],
            serde_json::json!([{"object_class": "cat", "count": 2}])
        );
    }

    #[tokio::test]
    async fn test_models_share_one_repository() {
        let app = setup_app().await;

        let (status, _) = post_form(
            app.clone(),
            vec![png_part(), Part::Field("model_name", "rfcn")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = post_form(
            app,
            vec![
                png_part(),
                Part::Field("model_name", "fake"),
                Part::Field("return_total", "yes"),
            ],
        )
        .await;
        assert_eq!(body["total_objects"][0]["count"], 2);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let app = setup_app().await;

        let request = Request::builder()
            .method(Method::GET)
            .uri("/v1/object-count")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
