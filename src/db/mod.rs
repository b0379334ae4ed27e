use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{markers, users};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn marker_repo(&self) -> repositories::marker::MarkerRepository {
        repositories::marker::MarkerRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo()
            .get_by_username_with_password(username)
            .await
    }

    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
        is_approved: bool,
    ) -> Result<User> {
        self.user_repo()
            .insert(username, password_hash, is_admin, is_approved)
            .await
    }

    pub async fn list_pending_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_pending().await
    }

    pub async fn approve_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().approve(id).await
    }

    // ========================================================================
    // Markers
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_marker(
        &self,
        lat: f64,
        lon: f64,
        kind: &str,
        label: &str,
        description: Option<&str>,
        created_by: i32,
        created_at: &str,
    ) -> Result<i32> {
        self.marker_repo()
            .insert(lat, lon, kind, label, description, created_by, created_at)
            .await
    }

    pub async fn list_markers_with_creators(
        &self,
    ) -> Result<Vec<(markers::Model, Option<users::Model>)>> {
        self.marker_repo().list_with_creators().await
    }
}
