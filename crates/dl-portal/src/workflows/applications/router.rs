use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, NewApplicationSubmission, ReissueSubmission,
    RenewalSubmission,
};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationError, LicenseApplicationService};
use crate::registry::domain::LicenseId;
use crate::registry::repository::{IdentityDirectory, LicenseRegistry};

/// Router builder exposing the application workflow endpoints.
pub fn application_router<I, L, R>(service: Arc<LicenseApplicationService<I, L, R>>) -> Router
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/applications/create", post(create_handler::<I, L, R>))
        .route(
            "/applications/renew/:license_id",
            post(renew_handler::<I, L, R>).put(renew_update_handler::<I, L, R>),
        )
        .route(
            "/applications/reissue/:license_id",
            post(reissue_handler::<I, L, R>).put(reissue_update_handler::<I, L, R>),
        )
        .route("/applications", get(list_handler::<I, L, R>))
        .route("/applications/:id", get(retrieve_handler::<I, L, R>))
        .route(
            "/applications/:id/status",
            patch(advance_status_handler::<I, L, R>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    axum::Json(submission): axum::Json<NewApplicationSubmission>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.submit_new(submission) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn renew_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(license_id): Path<String>,
    axum::Json(submission): axum::Json<RenewalSubmission>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.submit_renewal(&LicenseId(license_id), submission) {
        Ok(application) => confirmation(
            StatusCode::CREATED,
            "renewal application submitted",
            &application,
        ),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn renew_update_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(license_id): Path<String>,
    axum::Json(submission): axum::Json<RenewalSubmission>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.update_renewal(&LicenseId(license_id), submission) {
        Ok(application) => {
            confirmation(StatusCode::OK, "renewal application updated", &application)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reissue_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(license_id): Path<String>,
    axum::Json(submission): axum::Json<ReissueSubmission>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.submit_reissue(&LicenseId(license_id), submission) {
        Ok(application) => confirmation(
            StatusCode::CREATED,
            "reissue application submitted",
            &application,
        ),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reissue_update_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(license_id): Path<String>,
    axum::Json(submission): axum::Json<ReissueSubmission>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.update_reissue(&LicenseId(license_id), submission) {
        Ok(application) => {
            confirmation(StatusCode::OK, "reissue application updated", &application)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retrieve_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(id): Path<String>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    let Some(id) = parse_application_id(&id) else {
        return error_response(ApplicationError::NotFound);
    };
    match service.get(&id) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    match service.list() {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdvanceStatusRequest {
    pub(crate) status: ApplicationStatus,
}

pub(crate) async fn advance_status_handler<I, L, R>(
    State(service): State<Arc<LicenseApplicationService<I, L, R>>>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<AdvanceStatusRequest>,
) -> Response
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    let Some(id) = parse_application_id(&id) else {
        return error_response(ApplicationError::NotFound);
    };
    match service.advance_status(&id, request.status) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

/// An unparseable identifier matches no application, so it reports the same
/// way as an unknown one.
fn parse_application_id(raw: &str) -> Option<ApplicationId> {
    Uuid::parse_str(raw).ok().map(ApplicationId)
}

fn confirmation(status: StatusCode, message: &str, application: &Application) -> Response {
    let payload = json!({
        "message": message,
        "application_id": application.application_id,
        "status": application.status.label(),
    });
    (status, axum::Json(payload)).into_response()
}

fn error_response(error: ApplicationError) -> Response {
    let status = match &error {
        ApplicationError::MissingField(_)
        | ApplicationError::IdentityNotFound
        | ApplicationError::HolderMismatch
        | ApplicationError::RenewalInProgress
        | ApplicationError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        ApplicationError::LicenseNotFound | ApplicationError::NotFound => StatusCode::NOT_FOUND,
        ApplicationError::Repository(RepositoryError::Conflict) => StatusCode::BAD_REQUEST,
        ApplicationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
