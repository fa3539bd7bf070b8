use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use survey_agents::agents::{AgentGraph, Runner, SurveyTools};
use survey_agents::api::{router, AppState};
use survey_agents::config::AppConfig;
use survey_agents::domain::repositories::SurveyRepository;
use survey_agents::infrastructure::llm::OpenAiChatModel;
use survey_agents::infrastructure::repositories::{
    InMemorySurveyRepository, PostgresSurveyRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survey_agents=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Storage
    let repository: Arc<dyn SurveyRepository> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let repository = PostgresSurveyRepository::new(pool);
            repository.ensure_schema().await?;
            tracing::info!("Database connected successfully");
            Arc::new(repository)
        }
        None => Arc::new(InMemorySurveyRepository::new()),
    };

    // Agents
    let graph = Arc::new(AgentGraph::survey_default()?);
    let model = OpenAiChatModel::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        config.llm_timeout,
    )?;
    tracing::info!(
        model = %model.model_name(),
        agents = graph.len(),
        "Agent graph ready"
    );
    let runner = Runner::new(Arc::new(model), graph).with_max_turns(config.max_turns);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(SurveyTools::new(repository), Arc::new(runner));
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
