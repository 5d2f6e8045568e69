use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::Session;
use crate::routes::AppState;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header naming the local user a request acts for
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the display name used on reviews
pub const USERNAME_HEADER: &str = "x-username";

/// Extension type for storing request ID in request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Creates a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Resolves the session identity from request headers, falling back to the
/// configured default user for anything missing
pub fn session_from_headers(headers: &HeaderMap, default: &Session) -> Session {
    Session {
        user_id: header_str(headers, USER_ID_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| default.user_id.clone()),
        username: header_str(headers, USERNAME_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| default.username.clone()),
    }
}

/// Attaches a request ID and the session identity to the request extensions.
///
/// An incoming `x-request-id` UUID is reused, otherwise a new UUID v4 is
/// generated; either way it is echoed on the response.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId)
        .unwrap_or_else(RequestId::new);

    let session = session_from_headers(request.headers(), &state.inner.default_session);

    request.extensions_mut().insert(request_id.clone());
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id.as_str()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Helper function to create a tracing span with request ID
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
