use anyhow::{Context, Result};
use image2story::config::Config;
use image2story::gateway::StoryGateway;
use image2story::llm;
use image2story::server::{self, AppState};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Load config (defaults when config.yml is absent)
    let config = Config::load()?;

    // 2. Initialize LLM
    let llm = llm::create_llm(&config.llm)?;
    info!("LLM provider: {}", config.llm.provider);

    // 3. Build gateway and routes
    let gateway = StoryGateway::new(llm, config.llm.model_selection());
    let app = server::create_router(AppState::new(gateway));

    // 4. Serve
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Story generation server listening on http://{}", addr);
    info!("  POST {}", server::CHAPTER_PATH);
    info!("  POST {}", server::TITLE_PATH);
    info!("  GET  {}", server::HEALTH_PATH);

    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}
