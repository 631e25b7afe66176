//! Bearer-token authentication and the per-request tenant context.
//!
//! Tokens are HS256 JWTs carrying the user id, display name, company id and
//! role. Every handler receives a [`TenantContext`] extracted from the
//! `Authorization: Bearer` header; services scope every query by its
//! `company_id`.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::ServiceError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "technician")]
    Technician,
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

/// What an operation needs from the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Role {
    pub fn allows(self, permission: Permission) -> bool {
        match permission {
            Permission::Read => true,
            Permission::Write => matches!(self, Role::Admin | Role::Technician),
            Permission::Admin => self == Role::Admin,
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // User id
    pub name: String,       // Display name
    pub company_id: String, // Tenant
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// The authenticated caller and the tenant every query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub role: Role,
}

impl TenantContext {
    pub fn new(company_id: Uuid, user_id: Uuid, user_name: impl Into<String>, role: Role) -> Self {
        Self {
            company_id,
            user_id,
            user_name: user_name.into(),
            role,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.role.allows(permission)
    }
}

impl TryFrom<Claims> for TenantContext {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let company_id =
            Uuid::parse_str(&claims.company_id).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            company_id,
            user_id,
            user_name: claims.name,
            role: claims.role,
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) => ServiceError::InternalError(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// Upper bound on token lifetime; matches the `jwt_expiration` config rule.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
    issuer: String,
    expiration: ChronoDuration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiration_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration: ChronoDuration::seconds(
                expiration_secs.clamp(1, MAX_TOKEN_LIFETIME_SECS) as i64,
            ),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.jwt_issuer.clone(),
            config.jwt_expiration,
        )
    }

    /// Signs a token for `ctx`.
    pub fn issue_token(&self, ctx: &TenantContext) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: ctx.user_id.to_string(),
            name: ctx.user_name.clone(),
            company_id: ctx.company_id.to_string(),
            role: ctx.role,
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => {
                debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            }
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<TenantContext, AuthError> {
        self.verify_token(token)?.try_into()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<AuthService>::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        auth.authenticate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "an-unguessable-test-secret-of-48-characters-long";

    fn ctx(role: Role) -> TenantContext {
        TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), "John", role)
    }

    #[test]
    fn token_round_trip_preserves_tenant_context() {
        let service = AuthService::new(SECRET, "fieldops-auth", 3600);
        let original = ctx(Role::Technician);
        let token = service.issue_token(&original).unwrap();
        assert_eq!(service.authenticate(&token).unwrap(), original);
    }

    #[test]
    fn wrong_issuer_or_secret_is_rejected() {
        let service = AuthService::new(SECRET, "fieldops-auth", 3600);
        let token = service.issue_token(&ctx(Role::Admin)).unwrap();

        let other_issuer = AuthService::new(SECRET, "someone-else", 3600);
        assert_matches!(other_issuer.verify_token(&token), Err(AuthError::InvalidToken));

        let other_secret = AuthService::new("a-completely-different-secret-value-0123456789", "fieldops-auth", 3600);
        assert_matches!(other_secret.verify_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_lifetime_is_capped() {
        let service = AuthService::new(SECRET, "fieldops-auth", u64::MAX);
        assert_eq!(
            service.expiration,
            ChronoDuration::seconds(MAX_TOKEN_LIFETIME_SECS as i64)
        );
        let token = service.issue_token(&ctx(Role::Viewer)).unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert!(claims.exp - claims.iat <= MAX_TOKEN_LIFETIME_SECS as i64);
    }

    #[test]
    fn role_permissions() {
        assert!(Role::Viewer.allows(Permission::Read));
        assert!(!Role::Viewer.allows(Permission::Write));
        assert!(Role::Technician.allows(Permission::Write));
        assert!(!Role::Technician.allows(Permission::Admin));
        assert!(Role::Admin.allows(Permission::Admin));
    }
}
