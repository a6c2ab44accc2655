//! Gateway-generated responses.
//!
//! The only response the gateway writes itself is the gateway error sent when
//! the chosen backend cannot be reached. Everything else is relayed.

use axum::{
    body::Body,
    http::StatusCode,
    response::Response,
};

/// Exact body of the gateway error.
pub const BAD_GATEWAY_BODY: &str = "502 Bad Gateway: Backend server error";

/// 502 with the fixed plain-text body.
pub fn bad_gateway() -> Response {
    let mut response = Response::new(Body::from(BAD_GATEWAY_BODY));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response
}
