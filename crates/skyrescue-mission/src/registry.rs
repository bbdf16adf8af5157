//! Target registry: the deduplicated set of discovered survivors.
//!
//! Records are created on first detection and never removed while the
//! episode runs — resolved targets are marked, keeping identity stable
//! for telemetry. Staleness (handles deactivated externally) is filtered
//! lazily at query time through the spatial liveness capability, not
//! eagerly on mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use skyrescue_core::enums::TargetStatus;
use skyrescue_core::services::SpatialQuery;
use skyrescue_core::types::{Position, SurvivorId};

/// One discovered survivor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: SurvivorId,
    /// Position at detection time.
    pub position: Position,
    pub status: TargetStatus,
    /// Sequence number of detection — the deterministic tie-break for
    /// equal-distance prioritization.
    pub detection_order: u32,
}

/// All survivor records for the episode's lifetime.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    records: Vec<TargetRecord>,
    index: HashMap<SurvivorId, usize>,
    next_order: u32,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly detected target. Idempotent: duplicates by id are
    /// ignored and return false.
    pub fn register(&mut self, id: SurvivorId, position: Position) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.records.len());
        self.records.push(TargetRecord {
            id,
            position,
            status: TargetStatus::Detected,
            detection_order: self.next_order,
        });
        self.next_order += 1;
        true
    }

    pub fn contains(&self, id: SurvivorId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: SurvivorId) -> Option<&TargetRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    pub fn status(&self, id: SurvivorId) -> Option<TargetStatus> {
        self.get(id).map(|r| r.status)
    }

    pub fn set_status(&mut self, id: SurvivorId, status: TargetStatus) {
        if let Some(&i) = self.index.get(&id) {
            self.records[i].status = status;
        }
    }

    /// Flip a target to Resolved. The record stays; the queue drops it at
    /// the next reprioritization (and pop skips it meanwhile).
    pub fn mark_resolved(&mut self, id: SurvivorId) {
        self.set_status(id, TargetStatus::Resolved);
    }

    /// Lazy, restartable sequence of all non-Resolved records whose
    /// handles the environment still considers live.
    pub fn active_targets<'a>(
        &'a self,
        spatial: &'a dyn SpatialQuery,
    ) -> impl Iterator<Item = &'a TargetRecord> + 'a {
        self.records
            .iter()
            .filter(|r| r.status != TargetStatus::Resolved)
            .filter(|r| spatial.is_active(r.id))
    }

    /// All records, resolved included (telemetry view).
    pub fn iter(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == TargetStatus::Resolved)
            .count()
    }
}
