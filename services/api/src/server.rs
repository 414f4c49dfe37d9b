use crate::cli::ServeArgs;
use crate::infra::{
    seed_demo_records, AppState, InMemoryAccountStore, InMemoryApplicationRepository,
    InMemoryIdentityDirectory, InMemoryLicenseRegistry, InMemoryTokenBlacklist,
};
use crate::routes::portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use dl_portal::accounts::{AccountService, TokenIssuer};
use dl_portal::config::{AppConfig, AppEnvironment};
use dl_portal::error::AppError;
use dl_portal::registry::LicenseLookupService;
use dl_portal::telemetry;
use dl_portal::workflows::applications::LicenseApplicationService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let identities = Arc::new(InMemoryIdentityDirectory::default());
    let licenses = Arc::new(InMemoryLicenseRegistry::default());
    if config.environment != AppEnvironment::Production {
        seed_demo_records(&identities, &licenses).map_err(std::io::Error::other)?;
        info!("seeded demo identities and licenses");
    }

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let accounts = Arc::new(InMemoryAccountStore::default());
    let blacklist = Arc::new(InMemoryTokenBlacklist::default());
    let tokens = Arc::new(TokenIssuer::new(&config.auth));

    let account_service = Arc::new(AccountService::new(
        identities.clone(),
        accounts,
        blacklist,
        tokens.clone(),
    ));
    let application_service = Arc::new(LicenseApplicationService::new(
        identities,
        licenses.clone(),
        applications,
    ));
    let lookup_service = Arc::new(LicenseLookupService::new(licenses));

    let app = portal_routes(account_service, application_service, lookup_service, tokens)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "driver's license portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
