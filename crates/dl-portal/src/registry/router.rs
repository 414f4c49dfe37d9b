use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde_json::json;

use super::domain::LicenseId;
use super::lookup::{LicenseLookupService, LookupError};
use super::repository::LicenseRegistry;

/// Router builder exposing license validity and detail lookups.
pub fn license_router<L>(service: Arc<LicenseLookupService<L>>) -> Router
where
    L: LicenseRegistry + 'static,
{
    Router::new()
        .route("/licenses/:license_id", get(details_handler::<L>))
        .route(
            "/licenses/:license_id/validity",
            get(validity_handler::<L>),
        )
        .with_state(service)
}

pub(crate) async fn validity_handler<L>(
    State(service): State<Arc<LicenseLookupService<L>>>,
    Path(license_id): Path<String>,
) -> Response
where
    L: LicenseRegistry + 'static,
{
    let today = Local::now().date_naive();
    match service.validity(&LicenseId(license_id), today) {
        Ok(validity) => {
            let payload = json!({ "status": validity.label() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => lookup_error_response(error),
    }
}

pub(crate) async fn details_handler<L>(
    State(service): State<Arc<LicenseLookupService<L>>>,
    Path(license_id): Path<String>,
) -> Response
where
    L: LicenseRegistry + 'static,
{
    let today = Local::now().date_naive();
    match service.details(&LicenseId(license_id), today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => lookup_error_response(error),
    }
}

fn lookup_error_response(error: LookupError) -> Response {
    let status = match error {
        LookupError::NotFound => StatusCode::NOT_FOUND,
        LookupError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
