use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod files;
mod jwt;
mod lifecycle;
mod middleware;
mod models;
mod policy;
mod repositories;
mod roster;
mod routes;
mod state;
mod validation;

use common::cache::{RedisConfig, RedisPool};
use common::database::{DatabaseConfig, health_check, init_pool};
use tokio::net::TcpListener;

use crate::files::FileStore;
use crate::jwt::{JwtConfig, JwtService};
use crate::repositories::{
    AnswerRepository, CustomerRepository, EventRepository, GroupRepository, ImageRepository,
    RecapRepository, SurveyRepository, UserRepository,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize the Redis-backed token denylist
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    // Initialize JWT service and file store
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);
    let file_store = FileStore::from_env();

    let app_state = AppState {
        db_pool: pool.clone(),
        redis_pool,
        jwt_service,
        file_store,
        user_repository: UserRepository::new(pool.clone()),
        group_repository: GroupRepository::new(pool.clone()),
        event_repository: EventRepository::new(pool.clone()),
        survey_repository: SurveyRepository::new(pool.clone()),
        answer_repository: AnswerRepository::new(pool.clone()),
        recap_repository: RecapRepository::new(pool.clone()),
        customer_repository: CustomerRepository::new(pool.clone()),
        image_repository: ImageRepository::new(pool),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
