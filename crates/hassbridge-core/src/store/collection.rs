// ── Ordered entity list ──
//
// Insertion-ordered storage with push-based change notification via
// `watch` channels. Lists are small, so lookups are linear scans.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{Entity, EntityId};

/// Entities in arrival order, plus the categories they introduced.
///
/// Every mutation rebuilds the snapshot that subscribers receive.
pub(crate) struct EntityList {
    entities: Vec<Entity>,

    /// Category labels in first-seen order, each recorded once.
    categories: Vec<String>,
    snapshot: watch::Sender<Arc<Vec<Entity>>>,
}

impl EntityList {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entities: Vec::new(),
            categories: Vec::new(),
            snapshot,
        }
    }

    /// Append `entity`, or replace the record with the same id in place.
    /// Returns `true` if the id was new.
    pub(crate) fn upsert(&mut self, entity: Entity) -> bool {
        if let Some(existing) = self.entities.iter_mut().find(|e| e.id == entity.id) {
            *existing = entity;
            self.publish();
            return false;
        }

        if !self.categories.iter().any(|c| c == entity.category()) {
            self.categories.push(entity.category().to_owned());
        }
        self.entities.push(entity);
        self.publish();
        true
    }

    /// Set the state of a known entity. Returns `false` for unknown ids.
    pub(crate) fn set_state(&mut self, id: &EntityId, state: &str) -> bool {
        let Some(entity) = self.entities.iter_mut().find(|e| &e.id == id) else {
            return false;
        };
        state.clone_into(&mut entity.state);
        self.publish();
        true
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    pub(crate) fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn categories(&self) -> &[String] {
        &self.categories
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<Entity>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Entity>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.categories.clear();
        self.publish();
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn publish(&self) {
        self.snapshot.send_replace(Arc::new(self.entities.clone()));
    }
}
