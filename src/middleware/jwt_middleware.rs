/// JWT Authentication Middleware
///
/// Reads the access token from the `token` header (or `Authorization:
/// Bearer`), validates it, and injects an `AuthenticatedUser` into request
/// extensions for the handlers behind it.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{AuthenticatedUser, TokenValidator};
use crate::error::{AppError, AuthError};

const TOKEN_HEADER: &str = "token";

/// JWT middleware for protecting a scope
pub struct JwtMiddleware {
    validator: Arc<TokenValidator>,
}

impl JwtMiddleware {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<TokenValidator>,
}

/// Token from the `token` header, falling back to a bearer Authorization header
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let headers = req.headers();

    if let Some(token) = headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl<S> JwtMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, AuthError> {
        let token = extract_token(req).ok_or(AuthError::MissingToken)?;
        let claims = self.validator.validate(&token)?;
        AuthenticatedUser::try_from(claims)
    }
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        match self.authenticate(&req) {
            Ok(user) => {
                tracing::debug!(user_id = %user.user_id, "JWT validated successfully");
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Request rejected by auth gate");
                Box::pin(async move { Err(AppError::from(e).into()) })
            }
        }
    }
}
