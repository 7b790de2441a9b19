use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

#[derive(Clone, Debug)]
pub struct AuthState {
    token: Option<String>,
}

impl AuthState {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn enabled(&self) -> bool {
        self.token.is_some()
    }

    fn accepts(&self, headers: &HeaderMap) -> bool {
        match &self.token {
            None => true,
            Some(expected) => bearer_token(headers).is_some_and(|token| token == expected),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.accepts(&headers) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "rejected unauthenticated MCP request");
        Err(StatusCode::UNAUTHORIZED)
    }
}
