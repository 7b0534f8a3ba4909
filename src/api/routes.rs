//! HTTP API route definitions.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    authenticate_face, health, list_faces, metrics_text, register_face, update_face, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        // Face profile endpoints
        .route("/api/register-face", post(register_face))
        .route("/api/face-data", get(list_faces))
        .route("/api/update-face/:userId", put(update_face))
        .route("/api/authenticate-face", post(authenticate_face))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FaceData, MemoryStore, Profile};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn app_with(store: MemoryStore) -> Router {
        create_router(AppState::new(store))
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = app_with(MemoryStore::new());

        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn register_then_list_contains_one_entry() {
        let app = app_with(MemoryStore::new());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": [0.1, 0.2, 0.3] } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = send(&app, Method::GET, "/api/face-data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{ "userId": "u1", "faceData": { "landmarks": [0.1, 0.2, 0.3] } }])
        );
    }

    #[tokio::test]
    async fn duplicate_register_returns_400() {
        let app = app_with(MemoryStore::new());
        let payload = json!({ "userId": "u1", "faceData": { "landmarks": [1.0] } });

        let (first, _) = send(&app, Method::POST, "/api/register-face", Some(payload.clone())).await;
        let (second, body) = send(&app, Method::POST, "/api/register-face", Some(payload)).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "user already registered" }));
    }

    #[tokio::test]
    async fn update_replaces_landmarks() {
        let store = MemoryStore::with_profiles(vec![Profile::new(
            "u1",
            FaceData::new(vec![0.1, 0.2, 0.3]),
        )]);
        let app = app_with(store.clone());

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/update-face/u1",
            Some(json!({ "faceData": { "landmarks": [9.0, 8.0] } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            store.snapshot(),
            vec![Profile::new("u1", FaceData::new(vec![9.0, 8.0]))]
        );
    }

    #[tokio::test]
    async fn update_unknown_user_returns_404() {
        let store = MemoryStore::with_profiles(vec![Profile::new("u1", FaceData::new(vec![1.0]))]);
        let app = app_with(store.clone());

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/update-face/U1",
            Some(json!({ "faceData": { "landmarks": [2.0] } })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "user not found" }));
        assert_eq!(store.snapshot()[0].face_data.landmarks, vec![1.0]);
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let store = MemoryStore::with_profiles(vec![Profile::new("u1", FaceData::new(vec![0.0, 0.0]))]);
        let app = app_with(store);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": [0.5, 0.5] } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": [3.0, 4.0] } })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "authentication failed" }));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "nobody", "faceData": { "landmarks": [0.0, 0.0] } })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn authenticate_with_wrong_landmark_count_returns_400() {
        let store = MemoryStore::with_profiles(vec![Profile::new("u1", FaceData::new(vec![0.0, 0.0]))]);
        let app = app_with(store);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": [0.0] } })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "message": "landmark count mismatch: stored 2, submitted 1" })
        );
    }

    #[tokio::test]
    async fn malformed_bodies_return_400() {
        let app = app_with(MemoryStore::new());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register-face",
            Some(json!({ "userId": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("invalid request"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": ["a"] } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_return_500_with_generic_error() {
        let store = MemoryStore::with_profiles(vec![Profile::new("u1", FaceData::new(vec![1.0]))]);
        let app = app_with(store.clone());

        store.set_fail_reads(true);
        let (status, body) = send(&app, Method::GET, "/api/face-data", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "failed to fetch face data" }));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/authenticate-face",
            Some(json!({ "userId": "u1", "faceData": { "landmarks": [1.0] } })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "error during face authentication" }));

        store.set_fail_reads(false);
        store.set_fail_writes(true);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register-face",
            Some(json!({ "userId": "u2", "faceData": { "landmarks": [2.0] } })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "failed to register face data" }));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = app_with(MemoryStore::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/face-data")
                    .header(header::ORIGIN, "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_not_found() {
        let app = app_with(MemoryStore::new());

        let (status, _) = send(&app, Method::GET, "/metrics", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
