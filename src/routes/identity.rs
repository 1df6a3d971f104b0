//! Caller identity. Authentication happens upstream; the resolved user id arrives
//! in the `x-user-id` header (or the `user_id` query parameter on WebSocket upgrades,
//! where browsers cannot set headers).

use axum::{
  async_trait,
  extract::FromRequestParts,
  http::{request::Parts, HeaderMap},
};

use crate::error::QuizError;

pub const USER_HEADER: &str = "x-user-id";

/// The authenticated user id of the request.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// Read and trim the identity header; blank values count as missing.
pub fn user_from_headers(headers: &HeaderMap) -> Option<String> {
  headers
    .get(USER_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
  type Rejection = QuizError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    user_from_headers(&parts.headers).map(CurrentUser).ok_or(QuizError::NotAuthenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn blank_identity_is_missing() {
    let mut headers = HeaderMap::new();
    assert_eq!(user_from_headers(&headers), None);
    headers.insert(USER_HEADER, HeaderValue::from_static("   "));
    assert_eq!(user_from_headers(&headers), None);
    headers.insert(USER_HEADER, HeaderValue::from_static(" alice "));
    assert_eq!(user_from_headers(&headers).as_deref(), Some("alice"));
  }
}
