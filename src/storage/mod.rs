pub mod fixtures;
pub mod object_store;
pub mod reader;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Event, Pod, ReplicationController};

use crate::error::Result;
use crate::models::DeploymentConfig;

pub use self::object_store::{ObjectStore, StoredObject};
pub use self::reader::ClusterReader;

#[derive(Clone)]
pub struct Storage {
    pub pool: Arc<SqlitePool>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// A private database that lives as long as the returned storage.
    pub async fn in_memory() -> Result<Self> {
        // Each sqlite memory connection is its own database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self {
            pool: Arc::new(pool),
        };
        storage.migrate().await?;
        Ok(storage)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&*self.pool).await?;
        Ok(())
    }

    pub fn deployment_configs(&self) -> ObjectStore<DeploymentConfig> {
        ObjectStore::new((*self.pool).clone())
    }

    pub fn replication_controllers(&self) -> ObjectStore<ReplicationController> {
        ObjectStore::new((*self.pool).clone())
    }

    pub fn pods(&self) -> ObjectStore<Pod> {
        ObjectStore::new((*self.pool).clone())
    }

    pub fn autoscalers(&self) -> ObjectStore<HorizontalPodAutoscaler> {
        ObjectStore::new((*self.pool).clone())
    }

    pub fn events(&self) -> ObjectStore<Event> {
        ObjectStore::new((*self.pool).clone())
    }
}
