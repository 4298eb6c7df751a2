use crate::config::DatabaseConfig;
use crate::utils::AppError;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

pub const USERS: &str = "users";
pub const ARTICLES: &str = "articles";
pub const STUDENTS: &str = "students";

/// Shared connection to the catalog database. Acquired once before the first
/// operation and released with [`MongoDB::close`] after the last one.
#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(config.url.as_str())
            .await
            .map_err(|e| AppError::ConnectionError(format!("invalid connection string: {}", e)))?;

        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        client_options.max_pool_size = Some(config.max_pool_size);
        client_options.connect_timeout = Some(config.connect_timeout);
        client_options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(client_options)
            .map_err(|e| AppError::ConnectionError(e.to_string()))?;

        let db = client.database(&config.name);

        // Fail fast: nothing runs against an unreachable server
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::ConnectionError(format!("ping failed: {}", e)))?;

        log::info!("✅ Connected to MongoDB database: {}", config.name);

        Ok(Self { client, db })
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Waits for in-flight operations and closes every pooled connection.
    pub async fn close(self) {
        self.client.shutdown().await;
        log::info!("🔌 MongoDB connection closed");
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::time::Duration;

    /// Connects to a throwaway database on `MONGODB_TEST_URI`.
    pub async fn test_database() -> MongoDB {
        let _ = env_logger::builder().is_test(true).try_init();
        dotenv::dotenv().ok();

        let url = std::env::var("MONGODB_TEST_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = DatabaseConfig {
            url,
            name: format!("catalog_test_{}", uuid::Uuid::new_v4().simple()),
            max_pool_size: 2,
            connect_timeout: Duration::from_secs(3),
        };

        MongoDB::connect(&config).await.expect("MongoDB must be reachable")
    }

    pub async fn drop_test_database(db: MongoDB) {
        db.database().drop().await.expect("drop test database");
        db.close().await;
    }
}
