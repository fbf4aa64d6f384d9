//! Immutable weighted task catalog shared by every virtual user

use crate::tasks::{hospital_tasks, Task};
use rand::Rng;
use std::collections::BTreeMap;
use triage_core::{CatalogError, WeightedTable};

/// Tasks plus the cumulative weight table used to pick among them
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
    table: WeightedTable,
}

impl TaskCatalog {
    /// Build a catalog from tasks in selection order
    pub fn new(tasks: Vec<Task>) -> Result<Self, CatalogError> {
        let table = WeightedTable::new(tasks.iter().map(|t| (t.name, t.weight)))?;
        Ok(Self { tasks, table })
    }

    /// The hospital API catalog with default weights
    pub fn hospital() -> Result<Self, CatalogError> {
        Self::new(hospital_tasks())
    }

    /// The hospital API catalog with weights overridden by task name.
    ///
    /// A weight of 0 drops the task; naming a task that does not exist is an
    /// error, as is dropping every task.
    pub fn hospital_with_weights(overrides: &BTreeMap<String, u32>) -> Result<Self, CatalogError> {
        let mut tasks = hospital_tasks();
        for name in overrides.keys() {
            if !tasks.iter().any(|t| t.name == name) {
                return Err(CatalogError::UnknownTask(name.clone()));
            }
        }
        for task in &mut tasks {
            if let Some(weight) = overrides.get(task.name) {
                task.weight = *weight;
            }
        }
        tasks.retain(|t| t.weight > 0);
        Self::new(tasks)
    }

    /// Pick one task with probability proportional to its weight
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Task {
        &self.tasks[self.table.sample(rng)]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.to_string()).collect()
    }

    pub fn total_weight(&self) -> u64 {
        self.table.total()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_default_catalog() {
        let catalog = TaskCatalog::hospital().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.total_weight(), 40);
        assert_eq!(catalog.names()[2], "create_hospital");
    }

    #[test]
    fn test_weight_overrides() {
        let overrides = BTreeMap::from([
            ("create_patient".to_string(), 0),
            ("view_main_page".to_string(), 1),
        ]);
        let catalog = TaskCatalog::hospital_with_weights(&overrides).unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(!catalog.names().contains(&"create_patient".to_string()));
        assert_eq!(catalog.tasks()[0].weight, 1);
        assert_eq!(catalog.total_weight(), 40 - 4 - 9);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let overrides = BTreeMap::from([("delete_hospital".to_string(), 3)]);
        assert_eq!(
            TaskCatalog::hospital_with_weights(&overrides).unwrap_err(),
            CatalogError::UnknownTask("delete_hospital".to_string())
        );
    }

    #[test]
    fn test_disabling_everything_is_empty() {
        let overrides: BTreeMap<String, u32> = hospital_tasks()
            .iter()
            .map(|t| (t.name.to_string(), 0))
            .collect();
        assert_eq!(
            TaskCatalog::hospital_with_weights(&overrides).unwrap_err(),
            CatalogError::Empty
        );
    }

    #[test]
    fn test_pick_follows_weights() {
        let catalog = TaskCatalog::hospital().unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let mut counts: HashMap<&str, u32> = HashMap::new();
        let draws = 40_000;
        for _ in 0..draws {
            *counts.entry(catalog.pick(&mut rng).name).or_default() += 1;
        }
        let share = |name: &str| counts[name] as f64 / draws as f64;
        assert!((share("view_main_page") - 0.25).abs() < 0.02);
        assert!((share("view_doctor_patient_relations") - 0.05).abs() < 0.02);
    }
}
