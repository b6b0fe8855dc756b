use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use http::{HeaderName, HeaderValue};
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request identifier carried through a task-local so services and the error
/// envelope can reference it without threading it through every call.
#[derive(Debug, Clone)]
pub struct RequestId(Arc<str>);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into().into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

tokio::task_local! {
    static REQUEST_ID: RequestId;
}

/// Returns the request id of the current request, if inside one.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID
        .try_with(|rid| rid.as_str().to_string())
        .ok()
}

/// Runs a future with a fixed request id in scope. Primarily for tests.
pub async fn scope_request_id<F>(id: RequestId, fut: F) -> F::Output
where
    F: std::future::Future,
{
    REQUEST_ID.scope(id, fut).await
}

/// Ensures every request carries an `x-request-id`, reusing the caller's id
/// when one is supplied.
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let rid = RequestId::new(id.clone());
    let mut response = REQUEST_ID.scope(rid, next.run(req)).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_is_visible_inside_scope() {
        let seen =
            scope_request_id(RequestId::new("req-123"), async { current_request_id() }).await;
        assert_eq!(seen.as_deref(), Some("req-123"));
    }

    #[tokio::test]
    async fn no_request_id_outside_scope() {
        assert_eq!(current_request_id(), None);
    }
}
