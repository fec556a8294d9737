// Quiz HTTP server
//
// Serves the quiz endpoints, dictionary lookups and static assets over axum.

mod handlers;

pub use handlers::{
    generate_examples, get_progress, health_check, list_nouns, list_sentences, lookup_word,
    metrics_endpoint, next_verb_quiz, not_found, pons_lookup, save_progress, WordQuery,
};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::dictionary::{GrammarSiteClient, PonsCache, PonsClient};
use crate::generators::ExampleGenerator;
use crate::metrics::Metrics;
use crate::progress::ProgressStore;
use crate::providers::OpenAIProvider;
use crate::quiz::{chooser_from_seed, Chooser};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub chooser: Arc<dyn Chooser>,
    pub progress: Arc<ProgressStore>,
    pub pons: Arc<PonsClient>,
    pub grammar: Arc<GrammarSiteClient>,
    /// `None` when no LLM API key is configured
    pub examples: Option<Arc<ExampleGenerator>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wire up every collaborator from configuration.
    pub fn from_config(config: &Config, corpus: Corpus) -> Result<Self> {
        let cache = PonsCache::open(&config.data.pons_cache_path())?;
        let pons = PonsClient::new(config.pons.api_key.clone(), &config.pons.base_url, cache)?;
        let grammar = GrammarSiteClient::new(&config.grammar.base_url)?;

        let examples = match &config.llm.api_key {
            Some(api_key) => {
                let provider =
                    OpenAIProvider::new(api_key.clone(), &config.llm.base_url, &config.llm.model)?;
                Some(Arc::new(ExampleGenerator::new(
                    Arc::new(provider),
                    config.llm.model.clone(),
                    config.llm.temperature,
                )))
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set; example generation is disabled");
                None
            }
        };

        Ok(Self {
            corpus: Arc::new(corpus),
            chooser: chooser_from_seed(config.quiz.seed),
            progress: Arc::new(ProgressStore::new(config.data.progress_path())),
            pons: Arc::new(pons),
            grammar: Arc::new(grammar),
            examples,
            metrics: Arc::new(Metrics::new()?),
        })
    }
}

/// Build the application router.
///
/// Static assets are mounted under `/static` only when the directory exists.
pub fn create_router(state: AppState, static_dir: Option<&Path>, max_body_bytes: usize) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/verb-quiz/next", get(next_verb_quiz))
        .route("/api/noun-quiz/nouns", get(list_nouns))
        .route("/api/quiz/sentences", get(list_sentences))
        .route("/api/quiz/progress", get(get_progress).post(save_progress))
        .route("/api/lookup", get(lookup_word))
        .route("/api/dict/pons", get(pons_lookup))
        .route("/api/genai/examples", get(generate_examples));

    match static_dir {
        Some(dir) if dir.is_dir() => {
            tracing::info!("Serving static assets from {}", dir.display());
            router = router.nest_service("/static", ServeDir::new(dir));
        }
        Some(dir) => tracing::warn!("Static directory {} not found, not serving assets", dir.display()),
        None => {}
    }

    router
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}

/// The quiz backend: configuration plus ready-to-serve state
pub struct QuizServer {
    bind_address: String,
    static_dir: Option<std::path::PathBuf>,
    max_body_bytes: usize,
    state: AppState,
}

impl QuizServer {
    pub fn new(config: &Config, state: AppState) -> Self {
        Self {
            bind_address: config.server.bind_address.clone(),
            static_dir: config.server.static_dir.clone(),
            max_body_bytes: config.server.max_body_bytes,
            state,
        }
    }

    /// Start the HTTP server and run until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))?;

        let stats = self.state.corpus.stats();
        let app = create_router(self.state, self.static_dir.as_deref(), self.max_body_bytes);

        tracing::info!(
            "Starting vocab quiz server on {} ({} verbs, {} sentences, {} nouns)",
            addr,
            stats.verbs,
            stats.sentences,
            stats.nouns
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
