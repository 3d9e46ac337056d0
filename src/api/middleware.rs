//! Bearer-token authentication and role checks.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::AppState;
use crate::auth::tokens::{self, TokenClaims};
use crate::db::models::Role;
use crate::error::AppError;

/// Claims of the verified bearer token, injected by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::Superadmin];

/// Explicit role predicate. An empty requirement admits every role.
pub fn allowed(role: Role, required: &[Role]) -> bool {
    required.is_empty() || required.contains(&role)
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)
}

/// Verifies the bearer token and requires an administrative role. The
/// claims end up as a request extension for downstream handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    let claims = tokens::verify(token, state.settings.jwt_secret.as_bytes())?;
    if !allowed(claims.role, ADMIN_ROLES) {
        return Err(AppError::Validation("Forbidden resource".to_owned()));
    }
    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_roles_pass_the_predicate() {
        assert!(allowed(Role::Admin, ADMIN_ROLES));
        assert!(allowed(Role::Superadmin, ADMIN_ROLES));
        assert!(!allowed(Role::User, ADMIN_ROLES));
    }

    #[test]
    fn empty_requirement_admits_everyone() {
        assert!(allowed(Role::User, &[]));
    }
}
