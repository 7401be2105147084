//! Scenario store

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{read_lock, write_lock, ScenarioRepository};
use crate::models::Scenario;

#[derive(Debug, Default)]
pub struct ScenarioStore {
    scenarios: RwLock<HashMap<Uuid, Scenario>>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioRepository for ScenarioStore {
    fn insert_scenario(&self, scenario: Scenario) {
        write_lock(&self.scenarios, "scenarios").insert(scenario.id, scenario);
    }

    fn find_scenario(&self, id: Uuid) -> Option<Scenario> {
        read_lock(&self.scenarios, "scenarios").get(&id).cloned()
    }

    fn list_scenarios(&self) -> Vec<Scenario> {
        let mut scenarios: Vec<Scenario> = read_lock(&self.scenarios, "scenarios")
            .values()
            .cloned()
            .collect();
        scenarios.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        scenarios
    }

    fn delete_scenario(&self, id: Uuid) -> Option<Scenario> {
        write_lock(&self.scenarios, "scenarios").remove(&id)
    }
}
