use crate::cli::ServeArgs;
use crate::infra::{load_seed, seed_store, AppState};
use crate::routes::with_internship_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use internship_core::config::AppConfig;
use internship_core::error::AppError;
use internship_core::telemetry;
use internship_core::workflows::internship::{InMemoryStore, InternshipService};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = args.seed.take() {
        let seed = load_seed(&path)?;
        info!(
            path = %path.display(),
            students = seed.students.len(),
            staff = seed.staff.len(),
            companies = seed.companies.len(),
            submissions = seed.submissions.len(),
            "seeding in-memory store"
        );
        seed_store(&store, seed)?;
    }

    let service = Arc::new(InternshipService::new(store, config.program.clone()));

    let app = with_internship_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        legacy_category = ?config.program.legacy_category,
        max_marks = config.program.max_marks,
        "internship service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
