use anyhow::Result;
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use thiserror::Error;

use crate::models::MetricModel;

/// Raised by `insert` and `update` when another model already holds the
/// (group, name) pair.
#[derive(Debug, Error)]
#[error("{display}")]
pub struct NameConflict {
    pub display: String,
}

impl NameConflict {
    fn new(group_name: &str, name: &str) -> Self {
        let display =
            if group_name.is_empty() { name.to_string() } else { format!("{}/{}", group_name, name) };
        Self { display }
    }
}

/// Persistence boundary for metric models.
///
/// The service only talks to storage through this trait, so a database-backed
/// store can replace the in-memory one without touching admission logic.
/// Name uniqueness within a group is owned by the store: `insert` and `update`
/// must fail with [`NameConflict`] atomically with the write.
#[async_trait]
pub trait MetricModelStore: Send + Sync {
    async fn insert(&self, model: &MetricModel) -> Result<()>;
    async fn update(&self, model: &MetricModel) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<MetricModel>>;
    async fn list(&self) -> Result<Vec<MetricModel>>;
    /// Returns whether a model was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}

type NameKey = (String, String);

fn name_key(model: &MetricModel) -> NameKey {
    (model.draft.group_name.clone(), model.draft.name.clone())
}

#[derive(Debug, Default)]
pub struct MemoryMetricModelStore {
    models: DashMap<String, MetricModel>,
    // (group, name) -> id
    names: DashMap<NameKey, String>,
}

impl MemoryMetricModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for `id`. Succeeds when the key is free or already held by `id`.
    fn reserve_name(&self, key: NameKey, id: &str) -> Result<()> {
        match self.names.entry(key) {
            Entry::Occupied(entry) if entry.get() != id => {
                let (group_name, name) = entry.key();
                Err(NameConflict::new(group_name, name).into())
            },
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(id.to_string());
                Ok(())
            },
        }
    }

    fn release_name(&self, key: &NameKey, id: &str) {
        self.names.remove_if(key, |_, holder| holder == id);
    }
}

#[async_trait]
impl MetricModelStore for MemoryMetricModelStore {
    async fn insert(&self, model: &MetricModel) -> Result<()> {
        if self.models.contains_key(&model.id) {
            anyhow::bail!("metric model {} already stored", model.id);
        }
        self.reserve_name(name_key(model), &model.id)?;
        self.models.insert(model.id.clone(), model.clone());
        Ok(())
    }

    async fn update(&self, model: &MetricModel) -> Result<()> {
        let Some(old_key) = self.models.get(&model.id).map(|entry| name_key(entry.value())) else {
            anyhow::bail!("metric model {} is not stored", model.id);
        };

        let new_key = name_key(model);
        self.reserve_name(new_key.clone(), &model.id)?;

        match self.models.get_mut(&model.id) {
            Some(mut entry) => *entry = model.clone(),
            None => {
                self.release_name(&new_key, &model.id);
                anyhow::bail!("metric model {} is not stored", model.id);
            },
        }

        if old_key != new_key {
            self.release_name(&old_key, &model.id);
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<MetricModel>> {
        Ok(self.models.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<MetricModel>> {
        Ok(self.models.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.models.remove(id) {
            Some((_, model)) => {
                self.release_name(&name_key(&model), id);
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
