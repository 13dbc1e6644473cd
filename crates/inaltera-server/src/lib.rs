//! HTTP boundary for the Inaltera invoice ledger.
//!
//! Exposes issuance, cancellation, public hash verification, quota status,
//! and audit queries over the wire contract the existing client speaks.
//! Tenant identity arrives pre-authenticated in the `x-tenant-id` header;
//! token issuance lives in the auth collaborator in front of this service.

pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use server::InalteraServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use inaltera_types::TenantId;

    use crate::config::ServerConfig;
    use crate::handler::TENANT_HEADER;
    use crate::router::build_router;
    use crate::state::AppState;

    fn app() -> Router {
        build_router(AppState::new(&ServerConfig::default()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn emitir_body() -> String {
        json!({
            "client_ref": "Acme SL",
            "nif": "B-12345678",
            "items": [
                {"producto": "Consultoría", "cantidad": 1, "precio_unitario": 100.0, "iva": 21}
            ],
            "notas": ""
        })
        .to_string()
    }

    fn emitir_request(tenant: &TenantId) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/emitir")
            .header("content-type", "application/json")
            .header(TENANT_HEADER, tenant.to_string())
            .body(Body::from(emitir_body()))
            .unwrap()
    }

    fn get(uri: &str, tenant: &TenantId) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(TENANT_HEADER, tenant.to_string())
            .body(Body::empty())
            .unwrap()
    }

    fn anular_request(tenant: &TenantId, id: &str, motivo: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/anular/{id}"))
            .header("content-type", "application/json")
            .header(TENANT_HEADER, tenant.to_string())
            .body(Body::from(json!({ "motivo": motivo }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn emitir_and_verificar_flow() {
        let app = app();
        let tenant = TenantId::new();

        let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let hash = body["datos_trazabilidad"]["hash"].as_str().unwrap().to_string();
        assert_eq!(hash.len(), 64);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/verificar-hash/{hash}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["valido"], json!(true));
        assert_eq!(body["datos"]["cliente"], json!("Acme SL"));
        assert_eq!(body["datos"]["total"], json!(121.0));
        assert!(body["datos"]["numero_factura"]
            .as_str()
            .unwrap()
            .starts_with("F-"));
    }

    #[tokio::test]
    async fn verificar_unknown_hash_is_negative() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/verificar-hash/{}", "ab".repeat(32)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["valido"], json!(false));
        assert!(body.get("datos").is_none());
        assert!(body["mensaje"].as_str().is_some());
    }

    #[tokio::test]
    async fn emitir_requires_tenant_identity() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/emitir")
            .header("content-type", "application/json")
            .body(Body::from(emitir_body()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn emitir_rejects_unknown_fields() {
        let tenant = TenantId::new();
        let mut body: Value = serde_json::from_str(&emitir_body()).unwrap();
        body["sorpresa"] = json!(1);
        let request = Request::builder()
            .method("POST")
            .uri("/api/emitir")
            .header("content-type", "application/json")
            .header(TENANT_HEADER, tenant.to_string())
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn emitir_rejects_empty_invoice() {
        let tenant = TenantId::new();
        let body = json!({
            "client_ref": "Acme SL",
            "nif": "B-12345678",
            "items": [],
            "notas": ""
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/emitir")
            .header("content-type", "application/json")
            .header(TENANT_HEADER, tenant.to_string())
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().is_some());
    }

    #[tokio::test]
    async fn quota_exhaustion_returns_429() {
        let app = app();
        let tenant = TenantId::new();

        for _ in 0..5 {
            let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(emitir_request(&tenant)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn anular_flow_with_conflict_and_not_found() {
        let app = app();
        let tenant = TenantId::new();

        let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        let body = body_json(response).await;
        let id = body["datos_trazabilidad"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(anular_request(&tenant, &id, "error en el importe"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(anular_request(&tenant, &id, "otra vez"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let unknown = TenantId::new().to_string();
        let response = app
            .oneshot(anular_request(&tenant, &unknown, "motivo"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn uso_plan_reports_consumption() {
        let app = app();
        let tenant = TenantId::new();

        for _ in 0..2 {
            app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        }

        let response = app.oneshot(get("/api/uso-plan", &tenant)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["plan"], json!("Free"));
        assert_eq!(body["consumo"], json!(2));
        assert_eq!(body["limite"], json!(5));
        assert_eq!(body["porcentaje"], json!(40));
        assert!(body["reset_date"].as_str().is_some());
    }

    #[tokio::test]
    async fn bitacora_lists_events_newest_first() {
        let app = app();
        let tenant = TenantId::new();

        let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        let body = body_json(response).await;
        let id = body["datos_trazabilidad"]["id"].as_str().unwrap().to_string();
        app.clone()
            .oneshot(anular_request(&tenant, &id, "motivo"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/bitacora", &tenant))
            .await
            .unwrap();
        let body = body_json(response).await;
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["categoria"], json!("ANULACION"));
        assert_eq!(events[0]["nivel"], json!("WARNING"));
        assert_eq!(events[1]["categoria"], json!("FACTURACION"));

        let response = app
            .oneshot(get("/api/bitacora?categoria=FACTURACION", &tenant))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn registros_lists_both_entry_kinds() {
        let app = app();
        let tenant = TenantId::new();

        let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        let body = body_json(response).await;
        let id = body["datos_trazabilidad"]["id"].as_str().unwrap().to_string();
        app.clone()
            .oneshot(anular_request(&tenant, &id, "motivo"))
            .await
            .unwrap();

        let response = app.oneshot(get("/api/registros", &tenant)).await.unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["tipo"], json!("Alta"));
        assert_eq!(rows[0]["estado"], json!("Anulada"));
        assert_eq!(rows[1]["tipo"], json!("Anulacion"));
        assert_eq!(rows[1]["total"], json!(-121.0));
    }

    #[tokio::test]
    async fn registro_json_export_logs_a_download() {
        let app = app();
        let tenant = TenantId::new();

        let response = app.clone().oneshot(emitir_request(&tenant)).await.unwrap();
        let body = body_json(response).await;
        let id = body["datos_trazabilidad"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get(&format!("/api/registros/{id}/json"), &tenant))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["trazabilidad"]["algoritmo"], json!("BLAKE3-256"));
        assert!(body["cabecera"]["id_registro"].as_str().is_some());

        let response = app
            .oneshot(get("/api/bitacora?categoria=DESCARGA", &tenant))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
