//! Scenario ingest, validation and role expansion
//!
//! A scenario arrives as a [`ScenarioDocument`] (JSON from chat, JSON or
//! TOML from the catalog directory). Validation rejects documents that
//! could never deal a role for some side; expansion lives in [`expand`].

mod catalog;
pub mod expand;

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Role, Scenario, ScenarioDocument, Side};

pub use catalog::{CatalogEntry, ScenarioCatalog};
pub use expand::{canonical_sort, expand_roles, side_quota, RATE_MAX, RATE_MIN};

/// Parse a JSON scenario document
pub fn parse_document(text: &str) -> Result<ScenarioDocument> {
    serde_json::from_str(text)
        .map_err(|e| Error::InvalidInput(format!("malformed scenario document: {}", e)))
}

/// Parse a TOML scenario document
pub fn parse_toml_document(text: &str) -> Result<ScenarioDocument> {
    toml::from_str(text)
        .map_err(|e| Error::InvalidInput(format!("malformed scenario document: {}", e)))
}

impl ScenarioDocument {
    /// Check the structural rules every stored scenario satisfies
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.name) {
            return Err(invalid("scenario name is empty"));
        }
        if self.sides.is_empty() {
            return Err(invalid("scenario has no sides"));
        }

        let mut seen = HashSet::new();
        for (index, side) in self.sides.iter().enumerate() {
            if is_blank(&side.name) {
                return Err(invalid(&format!("side #{} has an empty name", index + 1)));
            }
            if !seen.insert(side.name.as_str()) {
                return Err(invalid(&format!("side '{}' is declared twice", side.name)));
            }
            if side.roles.is_empty() && side.default_role.is_none() {
                return Err(invalid(&format!(
                    "side '{}' has neither roles nor a default role",
                    side.name
                )));
            }
            if side.roles.iter().any(|r| is_blank(&r.name)) {
                return Err(invalid(&format!(
                    "side '{}' has a role with an empty name",
                    side.name
                )));
            }
            if side.default_role.as_ref().is_some_and(|r| is_blank(&r.name)) {
                return Err(invalid(&format!(
                    "side '{}' has a default role with an empty name",
                    side.name
                )));
            }
        }
        Ok(())
    }
}

impl Scenario {
    /// Validate a document and give it a fresh identifier.
    ///
    /// Any `side` label present on incoming roles is dropped; labels are
    /// only written during expansion.
    pub fn from_document(document: ScenarioDocument) -> Result<Self> {
        document.validate()?;
        let sides = document.sides.into_iter().map(unlabel_side).collect();
        Ok(Self {
            id: Uuid::new_v4(),
            name: document.name,
            sides,
        })
    }

    /// The document this scenario was ingested from
    pub fn to_document(&self) -> ScenarioDocument {
        ScenarioDocument {
            name: self.name.clone(),
            sides: self.sides.clone(),
        }
    }

    /// Roles to deal for `players`, in canonical order.
    ///
    /// Fails with [`Error::PlayerRoleMismatch`] unless exactly one role per
    /// player comes out of the expansion.
    pub fn expand(&self, players: usize) -> Result<Vec<Role>> {
        let roles = expand_roles(self, players);
        if roles.len() != players {
            return Err(Error::PlayerRoleMismatch {
                players,
                roles: roles.len(),
            });
        }
        Ok(roles)
    }
}

fn unlabel_side(mut side: Side) -> Side {
    for role in side.roles.iter_mut().chain(side.default_role.iter_mut()) {
        role.side = None;
    }
    side
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn invalid(reason: &str) -> Error {
    Error::InvalidInput(reason.to_string())
}
