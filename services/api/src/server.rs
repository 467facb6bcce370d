use crate::cli::ServeArgs;
use crate::infra::{
    demo_applications, AppState, InMemoryLoanBackend, LocalShell, DEFAULT_MONTHLY_PAYMENT,
};
use crate::routes::with_loan_desk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use presta_banco::config::AppConfig;
use presta_banco::error::AppError;
use presta_banco::loans::{load_applications, LoanDeskService};
use presta_banco::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let applications = match args.requests_csv.take() {
        Some(path) => {
            let applications = load_applications(&path)?;
            info!(path = %path.display(), count = applications.len(), "request export loaded");
            applications
        }
        None => demo_applications(),
    };
    let backend = Arc::new(InMemoryLoanBackend::new(
        applications,
        args.monthly_payment.unwrap_or(DEFAULT_MONTHLY_PAYMENT),
    ));
    let shell = Arc::new(LocalShell::new(
        config.desk.auto_confirm,
        config.desk.download_dir.clone(),
    ));
    let service = Arc::new(LoanDeskService::new(backend, shell));

    let app = with_loan_desk_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
