//! Order portal router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layer stack (outermost → innermost):
//! 1. CORS → 2. Request tracing → 3. Body limit

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Request body cap. Fits a 10 MB image once base64-encoded.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the order portal router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/catalog", get(endpoints::catalog::list))
        .route("/customers", get(endpoints::customers::search))
        .route("/orders/extract", post(endpoints::orders::extract))
        .route(
            "/corrections",
            get(endpoints::corrections::list).post(endpoints::corrections::record),
        )
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        // The portal is served from a different origin.
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::pipeline::{
        AssistantClient, AssistantContent, AssistantError, CorrectionMemory, OrderExtractor,
    };

    struct CannedAssistant(&'static str);

    impl AssistantClient for CannedAssistant {
        fn complete(
            &self,
            _system: &str,
            _content: &AssistantContent,
            _instruction: &str,
        ) -> Result<String, AssistantError> {
            Ok(self.0.to_string())
        }
    }

    const REPLY: &str = "Aquí tienes:\n[{\"customer\":\"Acme\",\"code\":\"CS-F91W1U\",\"productName\":\"Reloj digital\",\"quantity\":3,\"price\":null,\"confidence\":\"medium\",\"note\":null}]";

    fn test_app(assistant: Option<&'static str>) -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let memory = Arc::new(CorrectionMemory::open(dir.path().join("corrections.json")));
        let assistant = assistant
            .map(|reply| Box::new(CannedAssistant(reply)) as Box<dyn AssistantClient + Send + Sync>);
        let ctx = ApiContext::new(OrderExtractor::new(assistant, memory), None);
        (dir, api_router(ctx))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let (_dir, app) = test_app(None);
        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["assistantConfigured"], false);
        assert_eq!(json["erpConfigured"], false);
    }

    #[tokio::test]
    async fn delimited_order_is_parsed_without_assistant() {
        let (_dir, app) = test_app(None);
        let body = serde_json::json!({
            "text": "R. SOCIAL;Acme Corp;CANT.;2;COD. TN;CS-F91W1U;DESCRIPCION;Reloj digital;PRECIO;12000;"
        });
        let response = app
            .oneshot(json_request("POST", "/orders/extract", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["source"], "delimited");
        assert_eq!(json["count"], 1);
        assert_eq!(json["lines"][0]["customer"], "Acme Corp");
        assert_eq!(json["lines"][0]["productName"], "Reloj digital");
        assert_eq!(json["lines"][0]["price"], 12000.0);
        assert_eq!(json["lines"][0]["confidence"], "high");
    }

    #[tokio::test]
    async fn forced_delimited_mismatch_is_400() {
        let (_dir, app) = test_app(None);
        let body = serde_json::json!({"kind": "delimited", "text": "hola, quiero 3 relojes"});
        let response = app
            .oneshot(json_request("POST", "/orders/extract", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "FORMAT_MISMATCH");
    }

    #[tokio::test]
    async fn free_text_goes_through_assistant() {
        let (_dir, app) = test_app(Some(REPLY));
        let body = serde_json::json!({
            "text": "Acme quiere 3 casio clasicos",
            "catalog": [{"code": "CS-F91W1U", "name": "Reloj digital"}]
        });
        let response = app
            .oneshot(json_request("POST", "/orders/extract", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["source"], "assistant");
        assert_eq!(json["lines"][0]["code"], "CS-F91W1U");
        assert_eq!(json["lines"][0]["confidence"], "medium");
    }

    #[tokio::test]
    async fn unreadable_reply_is_502() {
        let (_dir, app) = test_app(Some("I cannot read this order."));
        let body = serde_json::json!({"kind": "text", "text": "3 relojes", "catalog": []});
        let response = app
            .oneshot(json_request("POST", "/orders/extract", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "ASSISTANT_REPLY_UNREADABLE");
    }

    #[tokio::test]
    async fn free_text_without_assistant_is_503() {
        let (_dir, app) = test_app(None);
        let body = serde_json::json!({"text": "3 relojes", "catalog": []});
        let response = app
            .oneshot(json_request("POST", "/orders/extract", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn corrections_are_recorded_and_deduplicated() {
        let (_dir, app) = test_app(None);
        let body = serde_json::json!({
            "originalText": "casio clasico",
            "correctedCode": "CS-F91W1U",
            "correctedName": "Reloj digital"
        });

        let first = app
            .clone()
            .oneshot(json_request("POST", "/corrections", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let json = body_json(first).await;
        assert_eq!(json["status"], "persisted");
        assert_eq!(json["count"], 1);

        let second = app
            .clone()
            .oneshot(json_request("POST", "/corrections", body))
            .await
            .unwrap();
        assert_eq!(body_json(second).await["status"], "duplicate");

        let listed = app.oneshot(get_request("/corrections")).await.unwrap();
        let json = body_json(listed).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["corrections"][0]["originalText"], "casio clasico");
    }

    #[tokio::test]
    async fn correction_requires_original_text() {
        let (_dir, app) = test_app(None);
        let body = serde_json::json!({"originalText": "  ", "correctedCode": "X"});
        let response = app
            .oneshot(json_request("POST", "/corrections", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn erp_routes_without_erp_are_503() {
        let (_dir, app) = test_app(None);
        let response = app.clone().oneshot(get_request("/catalog")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response = app.oneshot(get_request("/customers?q=acme")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (_dir, app) = test_app(None);
        let response = app.oneshot(get_request("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
