//! Problem-details error responses

use axum::{
    extract::{OriginalUri, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cloudboard::CloudBoardError;
use serde::Serialize;
use uuid::Uuid;

pub const PROBLEM_JSON: &str = "application/problem+json";

/// Error returned by every handler.
///
/// Rendered as an `application/problem+json` body. The request path is
/// filled into `instance` by [`attach_instance`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            title,
            detail: detail.into(),
        }
    }

    /// Missing or unreadable acting-user header
    pub fn unauthenticated(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Argument", detail)
    }
}

impl From<CloudBoardError> for ApiError {
    fn from(err: CloudBoardError) -> Self {
        match err {
            CloudBoardError::NotFound(msg) => {
                Self::new(StatusCode::NOT_FOUND, "Resource Not Found", msg)
            }
            CloudBoardError::InvalidOperation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Operation", msg)
            }
            CloudBoardError::Unauthorized(msg) => {
                Self::new(StatusCode::FORBIDDEN, "Access Denied", msg)
            }
            CloudBoardError::Storage(e) => {
                tracing::error!("Storage failure: {:?}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred.",
                )
            }
        }
    }
}

/// Wire shape of a problem response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub instance: Option<String>,
    pub trace_id: Uuid,
}

impl ProblemDetails {
    fn render(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.clone())).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(PROBLEM_JSON));
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ProblemDetails {
            problem_type: format!("https://httpstatuses.com/{}", self.status.as_u16()),
            title: self.title,
            status: self.status.as_u16(),
            detail: self.detail,
            instance: None,
            trace_id: Uuid::new_v4(),
        }
        .render()
    }
}

/// Middleware that re-renders problem responses with the request path as `instance`
pub async fn attach_instance(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<ProblemDetails>() {
        Some(mut problem) if problem.instance.is_none() => {
            problem.instance = Some(path);
            problem.render()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CloudBoardError::not_found("Board", 3), StatusCode::NOT_FOUND),
            (CloudBoardError::invalid("nope"), StatusCode::BAD_REQUEST),
            (CloudBoardError::not_owner(), StatusCode::FORBIDDEN),
            (
                CloudBoardError::Storage(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_storage_detail_is_not_leaked() {
        let err = ApiError::from(CloudBoardError::Storage(anyhow::anyhow!("/secret/path")));
        assert_eq!(err.detail, "An unexpected error occurred.");
    }

    #[test]
    fn test_response_is_problem_json() {
        let response = ApiError::unauthenticated("Missing X-User-Id header").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PROBLEM_JSON
        );
        assert!(response.extensions().get::<ProblemDetails>().is_some());
    }
}
