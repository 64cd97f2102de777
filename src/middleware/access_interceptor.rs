/// Access Interceptor
///
/// Wraps every remote call. Public methods pass through untouched; protected
/// methods need `authorization: bearer <token>`, and the verified claims are
/// injected into request extensions as `AuthenticatedCaller`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{Claims, MethodPolicy, TokenCodec};
use crate::error::{AppError, AuthError};

const EXPECTED_SCHEME: &str = "bearer";

/// Verified identity of the caller, available to protected handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Claims);

impl AuthenticatedCaller {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

/// Method name from a `/<package>.<Service>/<Method>` path
pub fn method_name(path: &str) -> Option<&str> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(""), Some(service), Some(method), None)
            if !service.is_empty() && !method.is_empty() =>
        {
            Some(method)
        }
        _ => None,
    }
}

/// Token from the single `authorization` entry
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let mut values = headers.get_all(AUTHORIZATION);
    let value = match (values.next(), values.next()) {
        (Some(value), None) => value,
        (None, _) => return Err(AuthError::MissingToken),
        (Some(_), Some(_)) => return Err(AuthError::MalformedAuthorization),
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedAuthorization)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MalformedAuthorization)?;
    if !scheme.eq_ignore_ascii_case(EXPECTED_SCHEME) {
        return Err(AuthError::MalformedAuthorization);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedAuthorization);
    }
    Ok(token)
}

pub struct AccessInterceptor {
    policy: Arc<MethodPolicy>,
    codec: Arc<TokenCodec>,
}

impl AccessInterceptor {
    pub fn new(policy: Arc<MethodPolicy>, codec: Arc<TokenCodec>) -> Self {
        Self { policy, codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessInterceptor
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessInterceptorService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AccessInterceptorService {
            service: Rc::new(service),
            policy: Arc::clone(&self.policy),
            codec: Arc::clone(&self.codec),
        }))
    }
}

pub struct AccessInterceptorService<S> {
    service: Rc<S>,
    policy: Arc<MethodPolicy>,
    codec: Arc<TokenCodec>,
}

impl<S> AccessInterceptorService<S> {
    fn authorize(&self, req: &ServiceRequest) -> Result<Option<Claims>, AuthError> {
        let method = method_name(req.path()).ok_or(AuthError::UnknownMethod)?;

        if self.policy.is_public(method) {
            return Ok(None);
        }

        let token = bearer_token(req.headers())?;
        let claims = self.codec.verify(token).map_err(|e| {
            tracing::debug!(method = %method, error = %e, "Bearer token rejected");
            AuthError::InvalidToken
        })?;
        Ok(Some(claims))
    }
}

impl<S, B> Service<ServiceRequest> for AccessInterceptorService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authorize(&req) {
            Ok(None) => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Ok(Some(claims)) => {
                tracing::debug!(
                    user_id = %claims.user_id(),
                    path = %req.path(),
                    "Caller authenticated"
                );
                req.extensions_mut().insert(AuthenticatedCaller(claims));

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Call rejected");
                Box::pin(async move { Err(AppError::Auth(e).into()) })
            }
        }
    }
}
