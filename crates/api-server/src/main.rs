use application::SocialApp;
use config::Config;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;

use routes::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("api_server=debug,application=info,infrastructure=info,tower_http=debug")),
        )
        .init();

    info!("🚀 Starting MiniSocial API Server");

    // Load configuration from environment
    let config = Config::from_env(None)?;
    info!("💾 Storage backend: {} ({})", config.storage_backend, config.database_path);
    info!("🌐 API server will bind to: {}", config.bind_address());

    let social_app = SocialApp::new(&config)?;

    if config.migrate_on_startup {
        let result = social_app.migrate().await?;
        info!(
            "📦 Migrations applied: {}, already applied: {}",
            result.applied_migrations.len(),
            result.skipped_migrations.len()
        );
    }

    let app = app_router(AppState {
        social_app: Arc::new(social_app),
    });

    // Run the server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("🌐 API Server listening on http://{}", config.bind_address());
    info!("📖 API Documentation:");
    info!("   POST   /api/users/register               - Register a user");
    info!("   GET    /api/users/:id                    - Get a user");
    info!("   POST   /api/users/:id/follow/:target     - Follow a user");
    info!("   DELETE /api/users/:id/follow/:target     - Unfollow a user");
    info!("   POST   /api/posts                        - Create a post");
    info!("   GET    /api/posts/:id                    - Get a post");
    info!("   GET    /api/posts/hashtag/:tag           - Posts by hashtag");
    info!("   GET    /api/posts/:id/comments           - List comments");
    info!("   POST   /api/posts/:id/comments           - Add a comment");
    info!("   GET    /api/migrations/status            - Migration status");
    info!("   GET    /health                           - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
