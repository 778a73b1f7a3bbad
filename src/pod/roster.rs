use serde::{Deserialize, Serialize};

use super::unit::{LaborUnit, UnitPatch};
use crate::error::{HivemindError, Result};

/// Maximum number of units a pod can recruit.
pub const MAX_UNITS: usize = 8;

/// Ordered registry of labor units. Insertion order matters: the first entry
/// becomes the manager on deploy, and work fans out to the first four.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    units: Vec<LaborUnit>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[LaborUnit] {
        &self.units
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LaborUnit> {
        self.units.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&LaborUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LaborUnit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&LaborUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Append a unit. Returns its id.
    pub fn add(&mut self, unit: LaborUnit) -> Result<String> {
        if self.units.len() >= MAX_UNITS {
            return Err(HivemindError::RosterFull { max: MAX_UNITS });
        }
        let id = unit.id.clone();
        self.units.push(unit);
        Ok(id)
    }

    /// Apply `patch` to the unit with `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: &str, patch: UnitPatch) -> bool {
        match self.get_mut(id) {
            Some(unit) => {
                patch.apply(unit);
                true
            }
            None => false,
        }
    }

    /// Remove a unit and drop it from everyone else's handoff targets.
    pub fn remove(&mut self, id: &str) -> Option<LaborUnit> {
        let pos = self.units.iter().position(|u| u.id == id)?;
        let removed = self.units.remove(pos);
        for unit in &mut self.units {
            unit.connections.retain(|c| c != id);
        }
        Some(removed)
    }

    /// Toggle the handoff from `source_id` to `target_id`.
    ///
    /// If the target is already connected it is removed; otherwise it
    /// replaces the whole list, so a unit hands off to at most one peer.
    /// Returns `false` when `source_id` is unknown.
    pub fn toggle_connection(&mut self, source_id: &str, target_id: &str) -> bool {
        let Some(source) = self.get_mut(source_id) else {
            return false;
        };
        if source.connections.iter().any(|c| c == target_id) {
            source.connections.retain(|c| c != target_id);
        } else {
            source.connections = vec![target_id.to_string()];
        }
        true
    }
}
