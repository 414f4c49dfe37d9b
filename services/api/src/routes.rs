use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use dl_portal::accounts::{account_router, require_auth, AccountRepository, AccountService, TokenBlacklist, TokenIssuer};
use dl_portal::registry::{license_router, IdentityDirectory, LicenseLookupService, LicenseRegistry};
use dl_portal::workflows::applications::{
    application_router, ApplicationRepository, LicenseApplicationService,
};

/// Compose the full portal surface: the unauthenticated account endpoints,
/// the bearer-gated application and license endpoints, and the operational
/// probes.
pub(crate) fn portal_routes<I, L, R, A, B>(
    accounts: Arc<AccountService<I, A, B>>,
    applications: Arc<LicenseApplicationService<I, L, R>>,
    lookup: Arc<LicenseLookupService<L>>,
    tokens: Arc<TokenIssuer>,
) -> axum::Router
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
    A: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    let protected = application_router(applications)
        .merge(license_router(lookup))
        .route_layer(axum::middleware::from_fn_with_state(tokens, require_auth));

    account_router(accounts)
        .merge(protected)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
