use crate::error::AppError;
use axum::extract::FromRequest;

/// JSON body extractor whose rejection renders as a 400 `{error}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
