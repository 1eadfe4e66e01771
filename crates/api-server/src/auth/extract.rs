use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::debug;

use super::Caller;
use crate::routes::error::{unauthorized, RouteError};
use crate::state::AppState;

impl FromRequestParts<AppState> for Caller {
    type Rejection = RouteError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !state.auth_enabled() {
            return Ok(Caller::Unrestricted);
        }

        let token = extract_bearer_token(&parts.headers).ok_or_else(unauthorized)?;
        let employee = state.auth().authorize(token).await.map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            unauthorized()
        })?;
        Ok(Caller::from_employee(&employee))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Bearer secret-token"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("secret-token"));

        headers.insert(
            "Authorization",
            HeaderValue::from_static("bearer secret-token"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("secret-token"));
    }

    #[test]
    fn rejects_when_authorization_header_missing() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn rejects_when_scheme_is_not_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Basic secret-token"),
        );
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }
}
