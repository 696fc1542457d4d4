use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uniplan_api::{build_router, config::Config, state::AppState};
use uniplan_graph::Pipeline;
use uniplan_llm::ClientFactory;
use uniplan_tools::{TavilyClient, ToolRegistry, UniversityDatabase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Uniplan API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize LLM client
    tracing::info!(provider = ?config.llm.provider, model = %config.llm.model, "Initializing LLM client");
    let llm_client = ClientFactory::create_chat_client(&config.provider_config())?;

    // Database is opened lazily on first query
    tracing::info!(path = %config.database.path, "Using university database");
    let database = Arc::new(UniversityDatabase::open(&config.database.path));

    let tavily = TavilyClient::new(config.tavily_api_key.clone());
    if !tavily.has_api_key() {
        tracing::warn!("TAVILY_API_KEY is not set; weather lookups will report an error");
    }

    let tools = ToolRegistry::planner_tools(database.clone(), tavily, llm_client.clone());
    tracing::info!(tools = ?tools.names(), "Tool registry ready");

    let pipeline = Pipeline::builder()
        .chat_client(llm_client)
        .tools(Arc::new(tools))
        .config(config.graph_config())
        .build()?;

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), pipeline, database));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
