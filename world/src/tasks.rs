//! Single-shot task queue for deferred simulation work.
//!
//! The only deferred work in the match is the grenade lifecycle: a release a
//! fixed delay after the throw command, then a detonation a fixed fuse after
//! the release. Tasks fire during `Command::Tick` in fire-time order, with
//! insertion order breaking ties.

use std::time::Duration;

use ar_skirmish_core::{FighterId, GrenadeId, WorldPoint};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TaskKind {
    /// The thrower's grenade leaves the hand, its velocity derived from the
    /// stored drag length and the thrower's facing at release time.
    ReleaseGrenade {
        thrower: FighterId,
        drag_length: f32,
    },
    /// The projectile detonates at its ballistic position.
    DetonateGrenade {
        grenade: GrenadeId,
        origin: WorldPoint,
        velocity: WorldPoint,
        released_at: Duration,
    },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ScheduledTask {
    pub(crate) fire_at: Duration,
    pub(crate) kind: TaskKind,
    sequence: u64,
}

#[derive(Debug)]
pub(crate) struct TaskQueue {
    tasks: Vec<ScheduledTask>,
    next_sequence: u64,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_sequence: 0,
        }
    }

    pub(crate) fn schedule(&mut self, fire_at: Duration, kind: TaskKind) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.tasks.push(ScheduledTask {
            fire_at,
            kind,
            sequence,
        });
    }

    /// Removes and returns every task due at or before `now`, ordered by
    /// fire time and then by scheduling order.
    pub(crate) fn drain_due(&mut self, now: Duration) -> Vec<ScheduledTask> {
        let mut due: Vec<ScheduledTask> = Vec::new();
        let mut index = 0;
        while index < self.tasks.len() {
            if self.tasks[index].fire_at <= now {
                due.push(self.tasks.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|task| (task.fire_at, task.sequence));
        due
    }

    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskKind, TaskQueue};
    use ar_skirmish_core::FighterId;
    use std::time::Duration;

    fn release(fighter: u32) -> TaskKind {
        TaskKind::ReleaseGrenade {
            thrower: FighterId::new(fighter),
            drag_length: 80.0,
        }
    }

    #[test]
    fn due_tasks_fire_in_time_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_millis(300), release(1));
        queue.schedule(Duration::from_millis(100), release(2));
        queue.schedule(Duration::from_millis(200), release(3));

        let due = queue.drain_due(Duration::from_millis(250));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].fire_at, Duration::from_millis(100));
        assert_eq!(due[1].fire_at, Duration::from_millis(200));

        let rest = queue.drain_due(Duration::from_secs(1));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].fire_at, Duration::from_millis(300));
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut queue = TaskQueue::new();
        let instant = Duration::from_millis(100);
        queue.schedule(instant, release(1));
        queue.schedule(instant, release(2));

        let due = queue.drain_due(instant);
        assert_eq!(due[0].kind, release(1));
        assert_eq!(due[1].kind, release(2));
    }

    #[test]
    fn clearing_cancels_pending_tasks() {
        let mut queue = TaskQueue::new();
        queue.schedule(Duration::from_millis(100), release(1));
        queue.clear();
        assert!(queue.drain_due(Duration::from_secs(10)).is_empty());
    }
}
