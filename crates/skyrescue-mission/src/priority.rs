//! Target prioritization and the resource-recipient partition.
//!
//! Produces a total order over active targets by ascending straight-line
//! distance from the agent at recomputation time, ties broken by
//! detection order so the result is reproducible across runs. The
//! farthest-ranked fraction of that order is frozen as the
//! resource-delivery set until the next reprioritization.

use std::collections::VecDeque;

use skyrescue_core::enums::TargetStatus;
use skyrescue_core::services::SpatialQuery;
use skyrescue_core::types::{Position, SurvivorId};

use crate::registry::TargetRegistry;

/// Number of targets that receive resource delivery for `active` known
/// targets: the farthest `max(1, floor(fraction * active))`, or zero when
/// nothing is known.
pub fn resource_recipient_count(active: usize, fraction: f64) -> usize {
    if active == 0 {
        return 0;
    }
    ((active as f64 * fraction).floor() as usize).max(1)
}

/// Priority queue plus the frozen resource partition.
#[derive(Debug, Default)]
pub struct Prioritizer {
    queue: VecDeque<SurvivorId>,
    resource_recipients: Vec<SurvivorId>,
}

impl Prioritizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the total order and the resource partition.
    ///
    /// The in-progress target (if any) participates in the ordering —
    /// and therefore in the partition — but is excluded from the queue
    /// so it cannot be assigned twice. Queued targets have their status
    /// updated; the invariant that the queue holds no Resolved or
    /// inactive target is re-established here by construction.
    pub fn reprioritize(
        &mut self,
        agent: Position,
        registry: &mut TargetRegistry,
        spatial: &dyn SpatialQuery,
        current: Option<SurvivorId>,
        fraction: f64,
    ) {
        let mut ordered: Vec<(SurvivorId, f64, u32)> = registry
            .active_targets(spatial)
            .map(|r| {
                let pos = spatial.position_of(r.id).unwrap_or(r.position);
                (r.id, agent.range_to(&pos), r.detection_order)
            })
            .collect();

        ordered.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.cmp(&b.2))
        });

        let recipients = resource_recipient_count(ordered.len(), fraction);
        self.resource_recipients = ordered
            .iter()
            .skip(ordered.len() - recipients)
            .map(|(id, _, _)| *id)
            .collect();

        self.queue.clear();
        for (id, _, _) in &ordered {
            if Some(*id) != current {
                self.queue.push_back(*id);
                registry.set_status(*id, TargetStatus::Queued);
            }
        }

        debug_assert!(self.queue_invariant_holds(registry, spatial));
    }

    /// Head of the queue, skipping anything resolved or deactivated since
    /// the last recomputation.
    pub fn pop_next(
        &mut self,
        registry: &TargetRegistry,
        spatial: &dyn SpatialQuery,
    ) -> Option<SurvivorId> {
        while let Some(id) = self.queue.pop_front() {
            if registry.status(id) == Some(TargetStatus::Resolved) {
                continue;
            }
            if !spatial.is_active(id) {
                continue;
            }
            return Some(id);
        }
        None
    }

    /// Whether a target was in the farthest-ranked partition at the last
    /// recomputation. Membership is frozen between recomputations.
    pub fn is_resource_recipient(&self, id: SurvivorId) -> bool {
        self.resource_recipients.contains(&id)
    }

    pub fn queue(&self) -> impl Iterator<Item = SurvivorId> + '_ {
        self.queue.iter().copied()
    }

    pub fn resource_recipients(&self) -> &[SurvivorId] {
        &self.resource_recipients
    }

    /// Check the queue invariant: no Resolved or inactive entries.
    pub fn queue_invariant_holds(
        &self,
        registry: &TargetRegistry,
        spatial: &dyn SpatialQuery,
    ) -> bool {
        self.queue.iter().all(|&id| {
            registry.status(id).is_some_and(|s| s != TargetStatus::Resolved)
                && spatial.is_active(id)
        })
    }
}
