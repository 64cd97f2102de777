use actix_web::HttpResponse;

/// GET /health_check
///
/// Served outside the intercepted RPC scope.
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().body("OK")
}
