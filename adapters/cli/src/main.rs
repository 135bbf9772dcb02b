#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted AR Skirmish match.
//!
//! The binary stands in for the real device loop: it fabricates anchor
//! reports where a tracking provider would deliver them and taps where a
//! player would, then prints every event the world broadcasts. Useful for
//! eyeballing the full command/event flow without any AR hardware.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use ar_skirmish_core::{
    AnchorId, AnchorKind, AnchorReport, Command, Event, FighterId, GamePhase, MatchConfig, Pose,
    Team, TrackingState, TurnAction, WorldPoint,
};
use ar_skirmish_system_anchor_tracking::{AnchorReportRef, AnchorTracker, Config as TrackerConfig};
use ar_skirmish_system_turn_flow::{FrameInput, TapInput, TurnFlow};
use ar_skirmish_world::{apply, query, World};

const PLAY_PLANE: AnchorId = AnchorId::new(1);
const SIDE_PLANE: AnchorId = AnchorId::new(2);
const FRAME: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(
    name = "ar-skirmish",
    about = "Runs a scripted AR Skirmish match and prints the event log."
)]
struct Args {
    /// Seed for the deterministic combat RNG.
    #[arg(long)]
    seed: Option<u64>,

    /// Fighters per team.
    #[arg(long, default_value_t = 2)]
    pawns_per_team: usize,

    /// Maximum number of tap-placed obstacles.
    #[arg(long, default_value_t = 1)]
    obstacle_limit: usize,

    /// Rounds of shooting before the demo gives up on a decision.
    #[arg(long, default_value_t = 64)]
    max_rounds: u32,
}

/// Wires the world and both pure systems into a frame loop.
struct Driver {
    world: World,
    tracker: AnchorTracker,
    router: TurnFlow,
    pending_events: Vec<Event>,
    pawns_per_team: usize,
}

impl Driver {
    fn new(config: MatchConfig) -> Self {
        let pawns_per_team = config.pawns_per_team;
        let tracker = AnchorTracker::new(TrackerConfig::new(config.obstacle_marker.clone()));
        Self {
            world: World::new(config),
            tracker,
            router: TurnFlow::new(),
            pending_events: Vec::new(),
            pawns_per_team,
        }
    }

    /// Runs one frame: systems consume last frame's events plus this
    /// frame's input and reports, and the world executes what they emit.
    fn frame(&mut self, input: FrameInput, reports: &[AnchorReport]) {
        let borrowed: Vec<AnchorReportRef<'_>> =
            reports.iter().map(AnchorReportRef::from_report).collect();
        let mut commands = Vec::new();
        self.tracker
            .handle(&self.pending_events, &borrowed, false, &mut commands);

        let fighters = query::fighter_view(&self.world);
        let selected = query::selected_plane(&self.world);
        self.router.handle(
            &self.pending_events,
            &input,
            &fighters,
            self.pawns_per_team,
            selected,
            &mut commands,
        );
        commands.push(Command::Tick { dt: FRAME });

        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut events);
        }
        for event in &events {
            println!("{:>7.2}s  {event:?}", query::clock(&self.world).as_secs_f32());
        }
        self.pending_events = events;
    }

    fn idle_frames(&mut self, count: u32) {
        for _ in 0..count {
            self.frame(FrameInput::default(), &[]);
        }
    }

    fn phase(&self) -> GamePhase {
        query::phase(&self.world)
    }

    fn living_enemy_of(&self, team: Team) -> Option<FighterId> {
        query::fighter_view(&self.world)
            .iter()
            .find(|fighter| fighter.team == team.opponent() && !fighter.dead)
            .map(|fighter| fighter.id)
    }
}

fn tap_ground(point: WorldPoint) -> FrameInput {
    FrameInput {
        tap: Some(TapInput {
            plane_anchor: None,
            ground: Some(point),
            fighter: None,
        }),
        ..FrameInput::default()
    }
}

fn plane_reports() -> Vec<AnchorReport> {
    vec![
        AnchorReport {
            anchor: PLAY_PLANE,
            kind: AnchorKind::Plane,
            state: TrackingState::Tracking,
            pose: Pose::at(WorldPoint::ORIGIN),
            subsumed_by: None,
        },
        AnchorReport {
            anchor: SIDE_PLANE,
            kind: AnchorKind::Plane,
            state: TrackingState::Tracking,
            pose: Pose::at(WorldPoint::new(400.0, 0.0, 0.0)),
            subsumed_by: None,
        },
    ]
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = MatchConfig::default();
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.pawns_per_team = args.pawns_per_team.max(1);
    config.obstacle_limit = args.obstacle_limit.max(1);

    let mut driver = Driver::new(config.clone());
    println!("{}", query::welcome_banner(&driver.world));

    driver.frame(
        FrameInput {
            start_pressed: true,
            ..FrameInput::default()
        },
        &[],
    );
    driver.frame(FrameInput::default(), &plane_reports());
    driver.frame(
        FrameInput {
            tap: Some(TapInput {
                plane_anchor: Some(PLAY_PLANE),
                ground: None,
                fighter: None,
            }),
            ..FrameInput::default()
        },
        &plane_reports(),
    );

    // Obstacles go off to the side so the duel's firing lanes stay clear.
    for index in 0..config.obstacle_limit {
        driver.frame(
            tap_ground(WorldPoint::new(150.0 + index as f32 * 70.0, 0.0, 60.0)),
            &[],
        );
    }
    if driver.phase() == GamePhase::ObstacleSetup {
        driver.frame(
            FrameInput {
                finish_obstacles_pressed: true,
                ..FrameInput::default()
            },
            &[],
        );
    }

    for index in 0..config.pawns_per_team {
        driver.frame(tap_ground(WorldPoint::new(index as f32 * 40.0, 0.0, 0.0)), &[]);
    }
    for index in 0..config.pawns_per_team {
        driver.frame(
            tap_ground(WorldPoint::new(index as f32 * 40.0, 0.0, 150.0)),
            &[],
        );
    }
    if driver.phase() != GamePhase::TurnIdle {
        bail!("scripted setup did not reach the first turn");
    }

    for _ in 0..args.max_rounds {
        let Some((team, _)) = query::active_turn(&driver.world) else {
            break;
        };
        let Some(target) = driver.living_enemy_of(team) else {
            break;
        };

        driver.frame(
            FrameInput {
                action: Some(TurnAction::Shoot),
                ..FrameInput::default()
            },
            &[],
        );
        driver.frame(
            FrameInput {
                tap: Some(TapInput {
                    plane_anchor: None,
                    ground: None,
                    fighter: Some(target),
                }),
                ..FrameInput::default()
            },
            &[],
        );
        driver.frame(
            FrameInput {
                fire_pressed: true,
                ..FrameInput::default()
            },
            &[],
        );
        if driver.phase() == GamePhase::GameEnd {
            break;
        }
        driver.frame(
            FrameInput {
                end_turn_pressed: true,
                ..FrameInput::default()
            },
            &[],
        );
        driver.idle_frames(2);
    }

    match driver.phase() {
        GamePhase::GameEnd => Ok(()),
        _ => bail!("the duel did not reach a decision in {} rounds", args.max_rounds),
    }
}
