use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` extractor whose rejections are rendered as `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
