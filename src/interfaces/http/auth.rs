//! Bearer-token authentication.

use super::state::AppState;
use crate::domain::user::User;
use crate::error::PortalError;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use std::ops::Deref;

/// The authenticated user behind a request.
///
/// Extracting it fails with `Unauthorized` when the `Authorization: Bearer`
/// header is missing or names no live session.
#[derive(Debug, Clone)]
pub struct Caller(pub User);

impl Deref for Caller {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for Caller {
    type Error = PortalError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let token = token.ok_or_else(|| {
                PortalError::Unauthorized("No token, authorization denied".to_string())
            })?;
            let state = state.ok_or_else(|| {
                PortalError::InternalError("application state not configured".into())
            })?;
            let user = state.identity.resolve_caller(&token).await?;
            Ok(Caller(user))
        })
    }
}
