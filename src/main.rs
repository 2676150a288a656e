use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use vigil::application::ports::{AuditJobRepository, VectorStore};
use vigil::application::services::{
    AuditStage, AuditWorker, ExtractionStage, RetrievalService, WorkflowEngine,
};
use vigil::infrastructure::llm::{OpenAiClient, OpenAiEmbedder};
use vigil::infrastructure::media::{AzureVideoIndexerClient, YtDlpDownloader};
use vigil::infrastructure::observability::{TracingConfig, init_tracing};
use vigil::infrastructure::persistence::{InMemoryAuditJobRepository, QdrantAdapter};
use vigil::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::from_settings(&settings.logging, environment),
        &settings.server.service_name,
    );

    let vector_store = Arc::new(
        QdrantAdapter::new(&settings.qdrant.url, settings.qdrant.collection_name.clone())
            .await
            .context("Failed to connect to Qdrant")?,
    );
    match vector_store.collection_exists().await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            collection = %settings.qdrant.collection_name,
            "Policy collection does not exist; retrieval will fail until it is populated"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not verify policy collection"),
    }

    let embedder = Arc::new(OpenAiEmbedder::from_settings(&settings.embeddings));
    let retriever = Arc::new(RetrievalService::new(
        embedder,
        vector_store,
        settings.qdrant.min_score,
    ));
    let llm_client =
        Arc::new(OpenAiClient::from_settings(&settings.llm).context("Invalid llm settings")?);

    let extraction = ExtractionStage::new(
        Arc::new(YtDlpDownloader::from_settings(&settings.downloader)),
        Arc::new(AzureVideoIndexerClient::new(&settings.video_indexer)),
        settings.audit.extraction_config(),
    );
    let audit = AuditStage::new(retriever, llm_client, settings.audit.audit_config());
    let engine = Arc::new(WorkflowEngine::new(extraction, audit));

    let job_repository: Arc<dyn AuditJobRepository> = Arc::new(
        InMemoryAuditJobRepository::with_retention(settings.audit.job_retention()),
    );
    let (audit_sender, audit_receiver) = mpsc::channel(settings.audit.queue_capacity.max(1));

    let worker = AuditWorker::new(
        audit_receiver,
        engine,
        Arc::clone(&job_repository),
        settings.audit.max_concurrent_audits,
        settings.audit.run_timeout(),
    );
    tokio::spawn(worker.run());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        audit_sender,
        job_repository,
        settings: Arc::new(settings),
    };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
