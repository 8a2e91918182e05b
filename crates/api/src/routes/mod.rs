pub mod auth;
pub mod dashboard;
pub mod file;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
