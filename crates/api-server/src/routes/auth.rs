//! Self-registration and token issuance

use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::employee::EmployeeResponse;
use super::error::{map_auth_error, RouteError};
use crate::auth::Registration;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "cargo")]
    title: String,
    email: String,
    #[serde(rename = "senha")]
    password: String,
}

/// OAuth2 password-grant form
#[derive(Debug, Deserialize)]
struct TokenRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

/// POST /empregados/registrar
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), RouteError> {
    let employee = state
        .auth()
        .register(Registration {
            name: req.name,
            title: req.title,
            email: req.email,
            password: req.password,
        })
        .await
        .map_err(map_auth_error)?;

    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(employee))))
}

/// POST /token
async fn issue_token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, RouteError> {
    let issued = state
        .auth()
        .authenticate(&req.username, &req.password)
        .await
        .map_err(map_auth_error)?;

    info!(employee_id = issued.claims.id, "token issued");
    Ok(Json(TokenResponse {
        expires_at: issued.expires_at().map(|at| at.to_rfc3339()),
        access_token: issued.token,
        token_type: "bearer",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/empregados/registrar", post(register))
        .route("/token", post(issue_token))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::TokenIssuer;
    use crate::routes::test_support::{build_app, login, register, send};

    #[tokio::test]
    async fn register_and_login_return_jwt() {
        let (app, _tmp) = build_app(true);

        let admin = register(&app, "Admin", "admin@x.com", "supersecret").await;
        assert_eq!(admin["nivel_acesso"], "admin");
        assert!(admin.get("senha").is_none());

        let user = register(&app, "Bruno", "bruno@x.com", "password123").await;
        assert_eq!(user["nivel_acesso"], "user");

        let token = login(&app, "admin@x.com", "supersecret").await;
        let claims = TokenIssuer::new("test-secret", 3600).verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@x.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.id, admin["id"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn wrong_password_is_bad_request() {
        let (app, _tmp) = build_app(true);
        register(&app, "Admin", "admin@x.com", "supersecret").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/token")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from("username=admin@x.com&password=wrongpass"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert!(payload.get("access_token").is_none());
        assert!(payload["error"].is_string());
    }

    #[tokio::test]
    async fn duplicate_or_invalid_registration_is_rejected() {
        let (app, _tmp) = build_app(true);
        register(&app, "Ana", "ana@x.com", "password123").await;

        for body in [
            json!({"nome": "Ana 2", "cargo": "Dev", "email": "ANA@x.com", "senha": "password123"}),
            json!({"nome": "Short", "cargo": "Dev", "email": "short@x.com", "senha": "short"}),
            json!({"nome": " ", "cargo": "Dev", "email": "blank@x.com", "senha": "password123"}),
        ] {
            let (status, payload) =
                send(&app, "POST", "/empregados/registrar", None, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        }
    }
}
