//! Application state - shared across all handlers.

use std::io;
use std::sync::Arc;

use playgrade_core::ports::{
    FollowRepository, ImageStore, LikeRepository, PasswordService, PostRepository,
    ReplyRepository, TokenService, UserRepository,
};
use playgrade_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, LocalImageStore};

use crate::config::AppConfig;

/// The five repositories, backed by one storage engine.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub replies: Arc<dyn ReplyRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    /// In-memory repositories; data is lost on restart.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            replies: store.clone(),
            likes: store.clone(),
            follows: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: playgrade_infra::database::DbConn) -> Self {
        use playgrade_infra::database::{
            PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
            PostgresReplyRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            replies: Arc::new(PostgresReplyRepository::new(db.clone())),
            likes: Arc::new(PostgresLikeRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db)),
        }
    }

    /// Connect to Postgres when configured, falling back to memory otherwise.
    pub async fn from_config(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(settings) = &config.database {
                match connect_postgres(settings).await {
                    Ok(db) => return Self::postgres(db),
                    Err(e) => tracing::error!(
                        "Failed to initialize database: {}. Using in-memory fallback.",
                        e
                    ),
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
        }

        Self::in_memory()
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(
    settings: &crate::config::DatabaseSettings,
) -> Result<playgrade_infra::database::DbConn, String> {
    use migration::{Migrator, MigratorTrait};
    use playgrade_infra::database::{DatabaseConfig, connect};

    let mut db_config = DatabaseConfig::new(settings.url.clone());
    db_config.max_connections = settings.max_connections;
    db_config.min_connections = settings.min_connections;

    let db = connect(&db_config).await.map_err(|e| e.to_string())?;

    if settings.run_migrations {
        Migrator::up(&db, None).await.map_err(|e| e.to_string())?;
        tracing::info!("Database migrations applied");
    }

    Ok(db)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub replies: Arc<dyn ReplyRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Upper bound on the size of one multipart request body.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        images: Arc<dyn ImageStore>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            users: repos.users,
            posts: repos.posts,
            replies: repos.replies,
            likes: repos.likes,
            follows: repos.follows,
            images,
            tokens,
            passwords,
            max_upload_bytes,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn from_config(config: &AppConfig) -> io::Result<Self> {
        let repos = Repositories::from_config(config).await;

        let images = LocalImageStore::new(config.upload_dir.clone())
            .await
            .map_err(io::Error::other)?;

        tracing::info!("Application state initialized");

        Ok(Self::new(
            repos,
            Arc::new(images),
            Arc::new(JwtTokenService::from_env()),
            Arc::new(Argon2PasswordService::new()),
            config.max_upload_bytes,
        ))
    }

    /// Best-effort removal of stored images; failures are only logged.
    pub async fn discard_images<I>(&self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        for url in urls {
            if let Err(e) = self.images.remove(&url).await {
                tracing::warn!(image = %url, error = %e, "Failed to remove image");
            }
        }
    }
}
