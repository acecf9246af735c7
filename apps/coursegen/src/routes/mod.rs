pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers as content;
use crate::state::AppState;
use crate::syllabus::handlers as syllabus;

/// Upper bound for uploaded syllabus documents.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Syllabus API
        .route("/api/v1/syllabus/parse", post(syllabus::handle_parse))
        .route(
            "/api/v1/syllabus/upload",
            post(syllabus::handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Content API
        .route("/api/v1/content/generate", post(content::handle_generate))
        .route("/api/v1/content/evaluate", post(content::handle_evaluate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::testing::{client_with, demo_client, Reply, ScriptedBackend};
    use crate::llm_client::{LlmClient, DEMO_PLACEHOLDER};

    fn app(llm: LlmClient) -> Router {
        build_router(AppState {
            llm,
            content_language: "Spanish".to_string(),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_upload(field: &str, file_name: &str, contents: &str) -> Request<Body> {
        let boundary = "coursegen-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {contents}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/syllabus/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_demo_mode_and_gate() {
        let response = app(demo_client())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["demo_mode"], true);
        assert_eq!(json["token_gate"]["capacity"], 60_000);
        assert_eq!(json["token_gate"]["consumed"], 0);
        assert_eq!(json["dispatches"]["success"], 0);
    }

    #[tokio::test]
    async fn test_parse_returns_syllabus() {
        let llm = client_with(ScriptedBackend::always(Reply::Text(
            r#"{"course_title": "Linear Algebra", "topics": ["Vectors"]}"#.into(),
        )));

        let response = app(llm)
            .oneshot(post_json(
                "/api/v1/syllabus/parse",
                json!({"syllabus_text": "MAT-201 Linear Algebra"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["syllabus"]["course_title"], "Linear Algebra");
    }

    #[tokio::test]
    async fn test_parse_rejects_blank_text() {
        let response = app(demo_client())
            .oneshot(post_json("/api/v1/syllabus/parse", json!({"syllabus_text": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_in_demo_mode_is_unprocessable() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/syllabus/parse",
                json!({"syllabus_text": "MAT-201"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = read_json(response).await;
        assert_eq!(json["error"]["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_text_file() {
        let backend = ScriptedBackend::always(Reply::Text(r#"{"course_code": "MAT-201"}"#.into()));
        let response = app(client_with(backend.clone()))
            .oneshot(multipart_upload("file", "syllabus.txt", "MAT-201 Linear Algebra"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["syllabus"]["course_code"], "MAT-201");
        assert!(backend.calls()[0].0.contains("MAT-201 Linear Algebra"));
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension() {
        let response = app(demo_client())
            .oneshot(multipart_upload("file", "syllabus.odt", "whatever"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let response = app(demo_client())
            .oneshot(multipart_upload("attachment", "syllabus.txt", "text"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_from_parsed_syllabus_in_demo_mode() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/content/generate",
                json!({
                    "syllabus": {"course_title": "Linear Algebra", "topics": ["Vectors"]},
                    "content_type": "practice_problems",
                    "evaluate": true
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["content"], DEMO_PLACEHOLDER);
        assert_eq!(json["content_type"], "practice_problems");
        assert_eq!(json["course_title"], "Linear Algebra");
        assert_eq!(json["evaluation"]["overall_score"], 4.3);
    }

    #[tokio::test]
    async fn test_generate_requires_a_syllabus() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/content/generate",
                json!({"content_type": "slides"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_without_topics_is_bad_request() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/content/generate",
                json!({"syllabus": {"course_title": "Algebra"}, "content_type": "slides"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(
            json["error"]["message"],
            "Validation error: No topics available to generate slides"
        );
    }

    #[tokio::test]
    async fn test_generate_service_error_is_bad_gateway() {
        let llm = client_with(ScriptedBackend::always(Reply::ApiError(500, "boom".into())));
        let response = app(llm)
            .oneshot(post_json(
                "/api/v1/content/generate",
                json!({"syllabus": {"topics": ["Graphs"]}, "content_type": "assessment"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_evaluate_returns_payload_and_summary() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/content/evaluate",
                json!({
                    "content": "# Vectors",
                    "syllabus": {"course_title": "Linear Algebra"},
                    "content_type": "lecture_notes"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["evaluation"]["clarity"]["score"], 3);
        assert_eq!(json["summary"]["overall_score"], 4.3);
        assert_eq!(json["summary"]["criteria"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_rejected() {
        let response = app(demo_client())
            .oneshot(post_json(
                "/api/v1/content/evaluate",
                json!({"content": "x", "syllabus": {}, "content_type": "essay"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
