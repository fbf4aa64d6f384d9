//! Per-user cache of created entity IDs

use crate::tasks::Entity;
use rand::seq::IndexedRandom;
use rand::Rng;

/// IDs a single virtual user has created. Never shared between users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    hospitals: Vec<u64>,
    doctors: Vec<u64>,
    patients: Vec<u64>,
}

impl UserSession {
    pub fn remember(&mut self, entity: Entity, id: u64) {
        self.ids_mut(entity).push(id);
    }

    pub fn ids(&self, entity: Entity) -> &[u64] {
        match entity {
            Entity::Hospital => &self.hospitals,
            Entity::Doctor => &self.doctors,
            Entity::Patient => &self.patients,
        }
    }

    /// A previously created ID, picked uniformly
    pub fn random_id<R: Rng + ?Sized>(&self, entity: Entity, rng: &mut R) -> Option<u64> {
        self.ids(entity).choose(rng).copied()
    }

    fn ids_mut(&mut self, entity: Entity) -> &mut Vec<u64> {
        match entity {
            Entity::Hospital => &mut self.hospitals,
            Entity::Doctor => &mut self.doctors,
            Entity::Patient => &mut self.patients,
        }
    }
}
