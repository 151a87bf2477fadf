use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCustomerRepository, InMemoryLoanRepository};
use crate::routes::with_lending_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_approval::config::AppConfig;
use credit_approval::error::AppError;
use credit_approval::lending::ingest::{import_customers_from_path, import_loans_from_path};
use credit_approval::lending::LendingService;
use credit_approval::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.customers_csv.take() {
        config.lending.seed_customers = Some(path);
    }
    if let Some(path) = args.loans_csv.take() {
        config.lending.seed_loans = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lending_service = Arc::new(LendingService::new(
        Arc::new(InMemoryCustomerRepository::default()),
        Arc::new(InMemoryLoanRepository::default()),
        &config.lending,
    ));

    // Loans reference customers, so the registry is seeded first.
    if let Some(path) = &config.lending.seed_customers {
        let summary = import_customers_from_path(&*lending_service, path)?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            errors = summary.errors,
            "customers seeded"
        );
    }
    if let Some(path) = &config.lending.seed_loans {
        let summary = import_loans_from_path(&*lending_service, path)?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            errors = summary.errors,
            "loans seeded"
        );
    }

    let app = with_lending_routes(lending_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit approval service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
