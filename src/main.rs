mod config;
mod error;
mod handlers;
mod models;
mod services;
#[cfg(feature = "form-server")]
mod form_server; // HTTP surface for the diet form

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::{DietDispatcher, FormSession};
use services::{CompletionService, OpenRouterService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG from .env is honoured
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting Dieta Generator...");

    let config = Config::from_env()?;

    let openrouter = OpenRouterService::new(
        config.openrouter_api_key.clone(),
        config.openrouter_api_url.clone(),
    )
    .with_attribution(config.referer.clone(), config.title.clone());
    let completion: Arc<dyn CompletionService> = Arc::new(openrouter);
    log::info!("✅ OpenRouter service initialized with model: {}", config.completion.model);

    let dispatcher = Arc::new(DietDispatcher::new(completion, config.completion.clone()));
    let session = Arc::new(FormSession::new(dispatcher.clone()));
    log::info!("✅ Form session initialized");

    #[cfg(feature = "form-server")]
    {
        let app = form_server::create_form_router(session.clone());
        let listener = tokio::net::TcpListener::bind(&config.form_server_addr)
            .await
            .with_context(|| format!("Failed to bind form server on {}", config.form_server_addr))?;

        log::info!("🌐 Form server starting on {}", config.form_server_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ Form server stopped: {}", e);
            }
        });
    }

    #[cfg(not(feature = "form-server"))]
    {
        let _ = &session;
        log::warn!("⚠️ Built without the form-server feature, nothing will drive the form");
    }

    log::info!("🎉 Dieta Generator is ready!");

    println!("\n🥗 Dieta Generator rodando!");
    #[cfg(feature = "form-server")]
    println!("🌐 Formulário: http://{}/form", config.form_server_addr);
    println!("🤖 Modelo: {}", config.completion.model);
    println!("\n🛑 Pressione Ctrl+C para encerrar\n");

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;

    log::info!("🛑 Shutting down...");
    dispatcher.shutdown();

    Ok(())
}
