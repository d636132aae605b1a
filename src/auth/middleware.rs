use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::Role;

/// Request header carrying the token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// What a route demands of the caller's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid token.
    User,
    /// A valid token whose role is exactly `ADMIN`.
    Admin,
}

/// Verifies the `x-auth-token` header and stores an [`AuthenticatedUser`] in the
/// request extensions. Any failure is answered immediately; the wrapped service
/// never runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthMiddleware {
    requirement: Requirement,
}

impl AuthMiddleware {
    /// RequireUser.
    pub fn user() -> Self {
        Self {
            requirement: Requirement::User,
        }
    }

    /// RequireAdmin.
    pub fn admin() -> Self {
        Self {
            requirement: Requirement::Admin,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            requirement: self.requirement,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    requirement: Requirement,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
        let token = req
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Access denied. No token provided.".into()))?;

        let tokens = req.app_data::<web::Data<TokenService>>().ok_or_else(|| {
            AppError::InternalServerError("TokenService is not registered as app data".into())
        })?;

        let claims = tokens.verify(token)?;

        if self.requirement == Requirement::Admin && claims.role != Some(Role::Admin) {
            return Err(AppError::Forbidden("Access denied. Admins only.".into()));
        }

        Ok(AuthenticatedUser {
            id: claims.id,
            role: claims.role,
        })
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                log::warn!(
                    "rejected {} {}: {}",
                    req.method(),
                    req.path(),
                    app_err
                );
                let response = req.error_response(app_err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
