#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure tracking system that reconciles provider anchor reports into
//! world commands.
//!
//! The tracker observes the batch of [`AnchorReport`] values the external
//! provider produced for a tick and keeps the world's plane candidates,
//! anchor bindings, and the marker obstacle in step with it. It never
//! touches world state directly; every effect is a command.

use ar_skirmish_core::{
    palette_color, AnchorId, AnchorKind, AnchorPose, AnchorReport, Command, Event, GamePhase,
    ObstacleOrigin, Pose, TrackingState,
};

/// Configuration parameters required to construct the tracking system.
#[derive(Clone, Debug)]
pub struct Config {
    obstacle_marker: String,
}

impl Config {
    /// Creates a new configuration recognising the provided image marker.
    #[must_use]
    pub const fn new(obstacle_marker: String) -> Self {
        Self { obstacle_marker }
    }
}

/// Stateful pure system that mirrors provider anchors into the world.
#[derive(Debug)]
pub struct AnchorTracker {
    obstacle_marker: String,
    phase: GamePhase,
    plane_selected: bool,
    bound: Vec<AnchorId>,
    marker_spawned: bool,
    color_index: usize,
}

impl AnchorTracker {
    /// Creates a new tracking system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            obstacle_marker: config.obstacle_marker,
            phase: GamePhase::Menu,
            plane_selected: false,
            bound: Vec::new(),
            marker_spawned: false,
            color_index: 0,
        }
    }

    /// Consumes world events and one provider report batch to emit
    /// reconciliation commands.
    ///
    /// `provider_failed` signals a fatal session error; the tracker then
    /// requests a tracking reset and discards its bound set.
    pub fn handle(
        &mut self,
        events: &[Event],
        reports: &[AnchorReportRef<'_>],
        provider_failed: bool,
        out: &mut Vec<Command>,
    ) {
        self.absorb(events);

        if provider_failed {
            self.bound.clear();
            self.plane_selected = false;
            out.push(Command::ResetTracking);
            return;
        }

        let mut sync: Vec<AnchorPose> = Vec::new();
        for report in reports {
            if report.subsumed_by.is_some() || report.state == TrackingState::StoppedTracking {
                if let Some(index) = self.bound.iter().position(|bound| *bound == report.anchor) {
                    let _ = self.bound.swap_remove(index);
                    out.push(Command::DespawnPlaneCandidate {
                        anchor: report.anchor,
                    });
                }
                if report.state == TrackingState::StoppedTracking {
                    out.push(Command::ClearAnchorBinding {
                        anchor: report.anchor,
                    });
                }
                continue;
            }

            match report.kind {
                AnchorKind::Plane => {
                    if report.state == TrackingState::Tracking
                        && self.phase == GamePhase::PlaneSetup
                        && !self.plane_selected
                        && !self.bound.contains(&report.anchor)
                    {
                        let color = palette_color(self.color_index);
                        self.color_index += 1;
                        self.bound.push(report.anchor);
                        out.push(Command::SpawnPlaneCandidate {
                            anchor: report.anchor,
                            color,
                            pose: report.pose,
                        });
                    }
                }
                AnchorKind::Image { marker } => {
                    if *marker == self.obstacle_marker
                        && report.state == TrackingState::Tracking
                        && !self.marker_spawned
                        && self.phase != GamePhase::Menu
                    {
                        self.marker_spawned = true;
                        out.push(Command::SpawnObstacle {
                            anchor: Some(report.anchor),
                            pose: report.pose,
                            origin: ObstacleOrigin::Marker,
                        });
                    }
                }
            }

            if report.state == TrackingState::Tracking {
                sync.push(AnchorPose {
                    anchor: report.anchor,
                    pose: report.pose,
                });
            }
        }

        if !sync.is_empty() {
            out.push(Command::SyncAnchorPoses { poses: sync });
        }
    }

    fn absorb(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PhaseChanged { phase } => self.phase = *phase,
                Event::PlaneSelected { .. } => self.plane_selected = true,
                Event::PlaneCandidateDespawned { anchor, .. } => {
                    self.bound.retain(|bound| bound != anchor);
                }
                Event::TrackingReset => {
                    self.bound.clear();
                    self.plane_selected = false;
                }
                Event::MatchReset => {
                    self.bound.clear();
                    self.plane_selected = false;
                    self.marker_spawned = false;
                    self.color_index = 0;
                }
                _ => {}
            }
        }
    }
}

/// Borrowed form of one provider anchor report for a tick.
///
/// Mirrors [`ar_skirmish_core::AnchorReport`] but borrows the marker name so
/// adapters can replay a report batch without cloning it per system.
#[derive(Clone, Copy, Debug)]
pub struct AnchorReportRef<'a> {
    /// Provider-assigned identifier for the anchor.
    pub anchor: AnchorId,
    /// Classification of the anchor geometry.
    pub kind: &'a AnchorKind,
    /// Tracking quality for this tick.
    pub state: TrackingState,
    /// Latest world pose of the anchor.
    pub pose: Pose,
    /// Anchor this one was merged into, if the provider subsumed it.
    pub subsumed_by: Option<AnchorId>,
}

impl<'a> AnchorReportRef<'a> {
    /// Borrows the fields of an owned report.
    #[must_use]
    pub fn from_report(report: &'a AnchorReport) -> Self {
        Self {
            anchor: report.anchor,
            kind: &report.kind,
            state: report.state,
            pose: report.pose,
            subsumed_by: report.subsumed_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnchorReportRef, AnchorTracker, Config};
    use ar_skirmish_core::{
        palette_color, AnchorId, AnchorKind, Command, Event, GamePhase, Pose, TrackingState,
        WorldPoint, PLANE_PALETTE,
    };

    const MARKER: &str = "gallery-portrait";

    fn tracker() -> AnchorTracker {
        let mut tracker = AnchorTracker::new(Config::new(String::from(MARKER)));
        tracker.handle(
            &[Event::PhaseChanged {
                phase: GamePhase::PlaneSetup,
            }],
            &[],
            false,
            &mut Vec::new(),
        );
        tracker
    }

    fn plane(anchor: u64, state: TrackingState) -> (AnchorKind, AnchorId, TrackingState) {
        (AnchorKind::Plane, AnchorId::new(anchor), state)
    }

    fn report<'a>(
        (kind, anchor, state): &'a (AnchorKind, AnchorId, TrackingState),
    ) -> AnchorReportRef<'a> {
        AnchorReportRef {
            anchor: *anchor,
            kind,
            state: *state,
            pose: Pose::at(WorldPoint::new(anchor.get() as f32, 0.0, 0.0)),
            subsumed_by: None,
        }
    }

    #[test]
    fn new_planes_spawn_candidates_with_cycling_colors() {
        let mut tracker = tracker();
        let first = plane(1, TrackingState::Tracking);
        let second = plane(2, TrackingState::Tracking);
        let mut out = Vec::new();

        tracker.handle(&[], &[report(&first), report(&second)], false, &mut out);

        let colors: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::SpawnPlaneCandidate { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![palette_color(0), palette_color(1)]);
    }

    #[test]
    fn known_planes_are_not_respawned() {
        let mut tracker = tracker();
        let anchor = plane(1, TrackingState::Tracking);
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&anchor)], false, &mut out);

        let mut out = Vec::new();
        tracker.handle(&[], &[report(&anchor)], false, &mut out);
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::SpawnPlaneCandidate { .. })));
    }

    #[test]
    fn no_candidates_spawn_after_plane_selection() {
        let mut tracker = tracker();
        let anchor = plane(3, TrackingState::Tracking);
        let mut out = Vec::new();
        tracker.handle(
            &[Event::PlaneSelected {
                anchor: AnchorId::new(9),
            }],
            &[report(&anchor)],
            false,
            &mut out,
        );
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::SpawnPlaneCandidate { .. })));
    }

    #[test]
    fn subsumed_anchors_despawn_their_candidate() {
        let mut tracker = tracker();
        let anchor = plane(1, TrackingState::Tracking);
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&anchor)], false, &mut out);

        let subsumed = AnchorReportRef {
            subsumed_by: Some(AnchorId::new(2)),
            ..report(&anchor)
        };
        let mut out = Vec::new();
        tracker.handle(&[], &[subsumed], false, &mut out);
        assert!(out.contains(&Command::DespawnPlaneCandidate {
            anchor: AnchorId::new(1)
        }));
    }

    #[test]
    fn stopped_anchors_clear_their_bindings() {
        let mut tracker = tracker();
        let stopped = plane(4, TrackingState::StoppedTracking);
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&stopped)], false, &mut out);
        assert!(out.contains(&Command::ClearAnchorBinding {
            anchor: AnchorId::new(4)
        }));
    }

    #[test]
    fn paused_anchors_are_left_out_of_the_pose_sync() {
        let mut tracker = tracker();
        let tracking = plane(1, TrackingState::Tracking);
        let paused = plane(2, TrackingState::NotTracking);
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&tracking), report(&paused)], false, &mut out);

        let synced = out
            .iter()
            .find_map(|command| match command {
                Command::SyncAnchorPoses { poses } => Some(poses.clone()),
                _ => None,
            })
            .expect("sync batch");
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].anchor, AnchorId::new(1));
    }

    #[test]
    fn the_marker_obstacle_spawns_exactly_once() {
        let mut tracker = tracker();
        let marker = (
            AnchorKind::Image {
                marker: String::from(MARKER),
            },
            AnchorId::new(40),
            TrackingState::Tracking,
        );
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&marker)], false, &mut out);
        assert!(out
            .iter()
            .any(|command| matches!(command, Command::SpawnObstacle { .. })));

        let mut out = Vec::new();
        tracker.handle(&[], &[report(&marker)], false, &mut out);
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::SpawnObstacle { .. })));
        assert!(out
            .iter()
            .any(|command| matches!(command, Command::SyncAnchorPoses { .. })));
    }

    #[test]
    fn unknown_markers_are_ignored() {
        let mut tracker = tracker();
        let marker = (
            AnchorKind::Image {
                marker: String::from("someone-elses-poster"),
            },
            AnchorId::new(41),
            TrackingState::Tracking,
        );
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&marker)], false, &mut out);
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::SpawnObstacle { .. })));
    }

    #[test]
    fn provider_failure_requests_a_tracking_reset() {
        let mut tracker = tracker();
        let anchor = plane(1, TrackingState::Tracking);
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&anchor)], false, &mut out);

        let mut out = Vec::new();
        tracker.handle(&[], &[], true, &mut out);
        assert_eq!(out, vec![Command::ResetTracking]);

        // The bound set was discarded, so the same anchor spawns again.
        let mut out = Vec::new();
        tracker.handle(&[], &[report(&anchor)], false, &mut out);
        assert!(out
            .iter()
            .any(|command| matches!(command, Command::SpawnPlaneCandidate { .. })));
    }

    #[test]
    fn a_match_reset_rewinds_the_palette() {
        let mut tracker = tracker();
        for index in 0..3u64 {
            let anchor = plane(index + 1, TrackingState::Tracking);
            tracker.handle(&[], &[report(&anchor)], false, &mut Vec::new());
        }

        let mut out = Vec::new();
        tracker.handle(
            &[
                Event::MatchReset,
                Event::PhaseChanged {
                    phase: GamePhase::PlaneSetup,
                },
            ],
            &[report(&plane(10, TrackingState::Tracking))],
            false,
            &mut out,
        );
        let color = out.iter().find_map(|command| match command {
            Command::SpawnPlaneCandidate { color, .. } => Some(*color),
            _ => None,
        });
        assert_eq!(color, Some(PLANE_PALETTE[0]));
    }
}
