//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use playgrade_core::domain::Actor;
use playgrade_core::ports::{AuthError, TokenClaims};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Use this in handlers to require a bearer token:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.is_admin)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            is_admin: claims.is_admin,
        }
    }
}

/// Validate the `Authorization` header if there is one.
///
/// `Ok(None)` only when the header is absent; a present header that does not
/// carry a valid bearer token is always an error.
fn authenticate(req: &HttpRequest) -> Result<Option<Identity>, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(AppError::Internal(
            "AppState not found in app data".to_string(),
        ));
    };

    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims = state.tokens.validate_token(token)?;
    Ok(Some(Identity::from(claims)))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|identity| {
            identity.ok_or_else(|| AppError::from(AuthError::MissingAuth))
        }))
    }
}

/// Optional identity extractor - guests get `None`, bad tokens still fail.
#[derive(Debug, Clone, Copy)]
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<i32> {
        self.0.map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(OptionalIdentity))
    }
}
