//! Scenario, side and role models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role that can be dealt to a player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    /// Minimum player count at which the role becomes eligible
    #[serde(default, skip_serializing_if = "is_zero")]
    pub added_at: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Name of the contributing side; only set on expanded copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            added_at: 0,
            image_id: None,
            side: None,
        }
    }

    pub fn added_at(mut self, added_at: u32) -> Self {
        self.added_at = added_at;
        self
    }

    /// Copy of this role labelled with its side
    pub fn stamped(&self, side: &str) -> Self {
        Self {
            side: Some(side.to_string()),
            ..self.clone()
        }
    }

    /// Whether the role is eligible for a game of `players`
    pub fn is_eligible(&self, players: usize) -> bool {
        players >= self.added_at as usize
    }
}

/// A faction within a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_role: Option<Role>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Side {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            population_rate: None,
            default_role: None,
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_default(mut self, role: Role) -> Self {
        self.default_role = Some(role);
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.population_rate = Some(rate);
        self
    }
}

/// The document an administrator submits to define a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub name: String,
    #[serde(default)]
    pub sides: Vec<Side>,
}

/// A validated, stored game variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub sides: Vec<Side>,
}

impl Scenario {
    /// Every role name the scenario can ever deal, in document order
    pub fn role_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for side in &self.sides {
            for role in side.roles.iter().chain(side.default_role.iter()) {
                if !names.contains(&role.name.as_str()) {
                    names.push(role.name.as_str());
                }
            }
        }
        names
    }
}
