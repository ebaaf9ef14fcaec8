use crate::cli::ServeArgs;
use crate::infra::{AppState, DynGrader, InMemoryLoanApplicationRepository};
use crate::routes::{api_router, ApiServices};
use axum_prometheus::PrometheusMetricLayer;
use loan_eligibility::config::{AppConfig, GraderBackend};
use loan_eligibility::error::AppError;
use loan_eligibility::telemetry;
use loan_eligibility::workflows::crime::agent::{GradingAgent, OpenAiChatApi};
use loan_eligibility::workflows::crime::geocode::NominatimGeocoder;
use loan_eligibility::workflows::crime::import::import_reference_dataset_from_path;
use loan_eligibility::workflows::crime::scraper::HttpPageBrowser;
use loan_eligibility::workflows::crime::{
    CrimeAnalysisResolver, CrimeGrader, DatasetGrader, InMemoryCrimeGradeStore, ResolverGrader,
};
use loan_eligibility::workflows::lending::LoanApplicationService;
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

    let store = Arc::new(InMemoryCrimeGradeStore::default());
    let dataset_path = config.crime.dataset_path();
    if dataset_path.exists() {
        let summary = import_reference_dataset_from_path(&dataset_path, &store)?;
        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            path = %dataset_path.display(),
            "reference crime dataset loaded"
        );
    } else {
        info!(path = %dataset_path.display(), "no reference crime dataset found");
    }

    let resolver = Arc::new(CrimeAnalysisResolver::new(
        HttpPageBrowser,
        NominatimGeocoder::new(config.crime.geocoder_base_url.clone())?,
        config.crime.crimegrade_base_url.clone(),
    ));
    let agent = Arc::new(GradingAgent::new(
        OpenAiChatApi::new(&config.openai),
        config.openai.model.clone(),
        resolver.clone(),
    ));

    let grader: Arc<dyn CrimeGrader> = match config.crime.grader {
        GraderBackend::Resolver => Arc::new(ResolverGrader::new(resolver.clone())),
        GraderBackend::Agent => agent.clone(),
        GraderBackend::Dataset => Arc::new(DatasetGrader::new(store.clone())),
    };

    let repository = Arc::new(InMemoryLoanApplicationRepository::default());
    let loans = Arc::new(LoanApplicationService::new(
        repository,
        Arc::new(DynGrader(grader)),
    ));

    let services = ApiServices {
        loans,
        resolver,
        agent,
    };
    let app = api_router(
        services,
        app_state,
        Arc::new(config.security.api_key.clone()),
    )
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan eligibility api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
