//! Uniform JSON response envelope.
//!
//! Every endpoint responds with the same shape:
//!
//! ```json
//! { "success": true, "data": { ... }, "pagination": { ... } }
//! { "success": false, "error": { "code": "...", "message": "..." } }
//! ```
//!
//! The failure half of the envelope is produced by `AppError` in
//! [`crate::error`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Default page size when the client does not specify one.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Hard cap on page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a payload in a success envelope.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }

    /// Wrap a page of results with pagination metadata.
    pub const fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination: Some(pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A success envelope with a `201 Created` status.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Envelope::new(self.0)).into_response()
    }
}

/// Pagination metadata included alongside list payloads.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Build pagination metadata from a page request and a total row count.
    #[must_use]
    pub const fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A validated page request from `?page=&limit=` query parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw query values into a usable page request.
    ///
    /// Pages start at 1; limits are clamped to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn from_params(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// SQL OFFSET for this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
    }

    #[test]
    fn test_page_request_clamping() {
        let req = PageRequest::from_params(None, None);
        assert_eq!((req.page, req.limit), (1, DEFAULT_PAGE_LIMIT));

        let req = PageRequest::from_params(Some(0), Some(5000));
        assert_eq!((req.page, req.limit), (1, MAX_PAGE_LIMIT));

        let req = PageRequest::from_params(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = Envelope::new(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_envelope_with_pagination() {
        let envelope = Envelope::paginated(vec![1, 2, 3], Pagination::new(1, 3, 9));
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["pagination"]["total_pages"], 3);
    }
}
