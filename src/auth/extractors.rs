use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;

/// The caller identity established by `AuthMiddleware`.
///
/// Handlers behind the middleware take this as an argument. On a route without
/// the middleware extraction fails with `401`, so a handler can never act on
/// behalf of an unknown owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: Option<Role>,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized("Unauthorized".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
