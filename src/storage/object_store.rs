use std::marker::PhantomData;

use chrono::Utc;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Event, Pod, ReplicationController};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{DeploymentConfig, LabelSelector};

/// An object kind that can be kept in its own table as a JSON document.
pub trait StoredObject: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;
    const TABLE: &'static str;

    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;
}

macro_rules! stored_object {
    ($ty:ty, $kind:expr, $table:expr) => {
        impl StoredObject for $ty {
            const KIND: &'static str = $kind;
            const TABLE: &'static str = $table;

            fn meta(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn meta_mut(&mut self) -> &mut ObjectMeta {
                &mut self.metadata
            }
        }
    };
}

stored_object!(DeploymentConfig, "DeploymentConfig", "deployment_configs");
stored_object!(ReplicationController, "ReplicationController", "replication_controllers");
stored_object!(Pod, "Pod", "pods");
stored_object!(HorizontalPodAutoscaler, "HorizontalPodAutoscaler", "horizontal_pod_autoscalers");
stored_object!(Event, "Event", "cluster_events");

pub struct ObjectStore<T> {
    pool: SqlitePool,
    _kind: PhantomData<fn() -> T>,
}

impl<T: StoredObject> ObjectStore<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    pub async fn create(&self, namespace: &str, mut object: T) -> Result<T> {
        let name = object
            .meta()
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Invalid(format!("{} name is required", T::KIND)))?;
        let uid = Uuid::new_v4().to_string();

        // Set metadata fields, keeping a creation timestamp the caller supplied
        let meta = object.meta_mut();
        meta.uid = Some(uid.clone());
        meta.namespace = Some(namespace.to_string());
        meta.resource_version = Some("1".to_string());
        let created = meta
            .creation_timestamp
            .get_or_insert_with(|| Time(Utc::now()))
            .0;

        let labels = serde_json::to_string(&object.meta().labels)?;
        let document = serde_json::to_string(&object)?;

        let sql = format!(
            "INSERT INTO {} (uid, name, namespace, resource_version, creation_timestamp, labels, object)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            T::TABLE
        );
        sqlx::query(&sql)
            .bind(&uid)
            .bind(&name)
            .bind(namespace)
            .bind(1i64)
            .bind(created.to_rfc3339())
            .bind(&labels)
            .bind(&document)
            .execute(&self.pool)
            .await?;

        debug!("Stored {} {}/{}", T::KIND, namespace, name);
        Ok(object)
    }

    pub async fn get(&self, namespace: &str, name: &str) -> Result<T> {
        let sql = format!(
            "SELECT object FROM {} WHERE namespace = ? AND name = ? AND deletion_timestamp IS NULL",
            T::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(namespace)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(serde_json::from_str(&row.get::<String, _>("object"))?),
            None => Err(Error::not_found(T::KIND, name)),
        }
    }

    /// Lists objects in insertion order, keeping those the selector matches.
    pub async fn list(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<T>> {
        let rows = if let Some(ns) = namespace {
            let sql = format!(
                "SELECT object FROM {} WHERE namespace = ? AND deletion_timestamp IS NULL ORDER BY id ASC",
                T::TABLE
            );
            sqlx::query(&sql).bind(ns).fetch_all(&self.pool).await?
        } else {
            let sql = format!(
                "SELECT object FROM {} WHERE deletion_timestamp IS NULL ORDER BY id ASC",
                T::TABLE
            );
            sqlx::query(&sql).fetch_all(&self.pool).await?
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let object: T = serde_json::from_str(&row.get::<String, _>("object"))?;
            if selector.matches(object.meta().labels.as_ref()) {
                items.push(object);
            }
        }
        Ok(items)
    }

    pub async fn delete(&self, namespace: &str, name: &str) -> Result<T> {
        let object = self.get(namespace, name).await?;
        let sql = format!(
            "UPDATE {} SET deletion_timestamp = ? WHERE namespace = ? AND name = ? AND deletion_timestamp IS NULL",
            T::TABLE
        );
        sqlx::query(&sql)
            .bind(Utc::now().to_rfc3339())
            .bind(namespace)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(object)
    }
}

impl ObjectStore<Event> {
    /// Events whose involved object is `kind/name`, oldest first.
    pub async fn search(&self, namespace: &str, kind: &str, name: &str) -> Result<Vec<Event>> {
        let events = self.list(Some(namespace), &LabelSelector::everything()).await?;
        Ok(events
            .into_iter()
            .filter(|event| {
                event.involved_object.kind.as_deref() == Some(kind)
                    && event.involved_object.name.as_deref() == Some(name)
            })
            .collect())
    }
}
