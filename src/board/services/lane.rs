//! Per-project FIFO ordering of board mutations.
//!
//! Each operation that must not interleave with in-flight moves takes a
//! [`LaneSlot`]. A slot holds the completion receiver of the operation queued
//! before it and the sender that releases the one queued after it. Dropping
//! the slot releases the lane, so a panicking or dropped operation never
//! wedges the project.

use crate::board::domain::ProjectId;
use std::collections::HashMap;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Tail receivers of every project's lane.
pub(super) type Lanes = HashMap<ProjectId, oneshot::Receiver<()>>;

/// A position in a project's lane.
#[derive(Debug)]
pub(super) struct LaneSlot {
    previous: Option<oneshot::Receiver<()>>,
    _release: oneshot::Sender<()>,
}

impl LaneSlot {
    /// Appends a slot to the project's lane.
    pub(super) fn join(lanes: &mut Lanes, project_id: ProjectId) -> Self {
        let (release, tail) = oneshot::channel();
        let previous = lanes
            .insert(project_id, tail)
            .and_then(|mut receiver| (!is_released(&mut receiver)).then_some(receiver));
        Self {
            previous,
            _release: release,
        }
    }

    /// Returns `true` while some operation still holds the project's lane.
    pub(super) fn is_busy(lanes: &mut Lanes, project_id: ProjectId) -> bool {
        lanes
            .get_mut(&project_id)
            .is_some_and(|tail| !is_released(tail))
    }

    /// Returns `true` when no earlier operation is still holding the lane.
    pub(super) const fn is_first(&self) -> bool {
        self.previous.is_none()
    }

    /// Waits until every earlier operation has released the lane.
    pub(super) async fn wait_turn(&mut self) {
        if let Some(previous) = self.previous.as_mut() {
            // Senders are only ever dropped, so completion shows up as Err.
            previous.await.unwrap_or_default();
            self.previous = None;
        }
    }
}

fn is_released(receiver: &mut oneshot::Receiver<()>) -> bool {
    !matches!(receiver.try_recv(), Err(TryRecvError::Empty))
}

#[cfg(test)]
mod tests {
    use super::{LaneSlot, Lanes};
    use crate::board::domain::ProjectId;
    use std::time::Duration;

    #[tokio::test]
    async fn first_slot_in_empty_lane_does_not_wait() {
        let mut lanes = Lanes::new();
        let slot = LaneSlot::join(&mut lanes, ProjectId::new(1));
        assert!(slot.is_first());
    }

    #[tokio::test]
    async fn released_slot_does_not_block_successor() {
        let mut lanes = Lanes::new();
        let first = LaneSlot::join(&mut lanes, ProjectId::new(1));
        drop(first);
        let second = LaneSlot::join(&mut lanes, ProjectId::new(1));
        assert!(second.is_first());
    }

    #[tokio::test]
    async fn successor_waits_until_predecessor_drops() {
        let mut lanes = Lanes::new();
        let first = LaneSlot::join(&mut lanes, ProjectId::new(1));
        let mut second = LaneSlot::join(&mut lanes, ProjectId::new(1));
        assert!(!second.is_first());

        let blocked = tokio::time::timeout(Duration::from_millis(20), second.wait_turn()).await;
        assert!(blocked.is_err(), "second slot must wait for the first");
        assert!(!second.is_first(), "an abandoned wait keeps its place");

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), second.wait_turn())
            .await
            .expect("second slot proceeds once the first is released");
    }

    #[tokio::test]
    async fn lanes_are_independent_per_project() {
        let mut lanes = Lanes::new();
        let _first = LaneSlot::join(&mut lanes, ProjectId::new(1));
        let other = LaneSlot::join(&mut lanes, ProjectId::new(2));
        assert!(other.is_first());
    }

    #[tokio::test]
    async fn lane_is_busy_only_while_a_slot_is_held() {
        let mut lanes = Lanes::new();
        assert!(!LaneSlot::is_busy(&mut lanes, ProjectId::new(1)));
        let held = LaneSlot::join(&mut lanes, ProjectId::new(1));
        assert!(LaneSlot::is_busy(&mut lanes, ProjectId::new(1)));
        drop(held);
        assert!(!LaneSlot::is_busy(&mut lanes, ProjectId::new(1)));
    }
}
