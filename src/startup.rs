use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::MethodPolicy;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AccessInterceptor;
use crate::routes::{
    health_check, login, logout, refresh_token, validate_token, who_am_i, AUTH_SERVICE,
};
use crate::session::SessionService;

/// Path of a remote method on the auth service
pub fn rpc_path(method: &str) -> String {
    format!("/{}/{}", AUTH_SERVICE, method)
}

pub fn run(
    listener: TcpListener,
    session: SessionService,
    policy: MethodPolicy,
) -> Result<Server, std::io::Error> {
    let codec = session.codec();
    let policy = Arc::new(policy);
    let session = web::Data::new(session);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(session.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!("Rejected request body: {}", err);
                actix_web::Error::from(AppError::Validation(ValidationError::InvalidFormat(
                    "request body",
                )))
            }))
            // Plain HTTP, not a remote call
            .route("/health_check", web::get().to(health_check))
            // Every remote call passes through the interceptor
            .service(
                web::scope("")
                    .wrap(AccessInterceptor::new(Arc::clone(&policy), Arc::clone(&codec)))
                    .route(&rpc_path("Login"), web::post().to(login))
                    .route(&rpc_path("RefreshToken"), web::post().to(refresh_token))
                    .route(&rpc_path("ValidateToken"), web::post().to(validate_token))
                    .route(&rpc_path("Logout"), web::post().to(logout))
                    .route(&rpc_path("WhoAmI"), web::post().to(who_am_i)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
