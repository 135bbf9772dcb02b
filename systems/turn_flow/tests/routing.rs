//! Frame input driving a live world from menu to the first turn.

use ar_skirmish_core::{
    palette_color, AnchorId, Command, Event, GamePhase, MatchConfig, Pose, Team, WorldPoint,
};
use ar_skirmish_system_turn_flow::{FrameInput, TapInput, TurnFlow};
use ar_skirmish_world::{apply, query, World};

const PLANE: AnchorId = AnchorId::new(1);

fn frame(world: &mut World, router: &mut TurnFlow, pending: &[Event], input: FrameInput) -> Vec<Event> {
    let quota = 1;
    let fighters = query::fighter_view(world);
    let selected = query::selected_plane(world);
    let mut commands = Vec::new();
    router.handle(pending, &input, &fighters, quota, selected, &mut commands);

    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
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

#[test]
fn tapped_input_walks_the_match_into_its_first_turn() {
    let mut config = MatchConfig::default();
    config.pawns_per_team = 1;
    let mut world = World::new(config);
    let mut router = TurnFlow::new();

    let events = frame(
        &mut world,
        &mut router,
        &[],
        FrameInput {
            start_pressed: true,
            ..FrameInput::default()
        },
    );
    assert_eq!(query::phase(&world), GamePhase::PlaneSetup);

    // The tracker would normally propose this candidate; inject it directly.
    let mut candidate_events = Vec::new();
    apply(
        &mut world,
        Command::SpawnPlaneCandidate {
            anchor: PLANE,
            color: palette_color(0),
            pose: Pose::at(WorldPoint::ORIGIN),
        },
        &mut candidate_events,
    );
    let pending: Vec<Event> = events.into_iter().chain(candidate_events).collect();

    let events = frame(
        &mut world,
        &mut router,
        &pending,
        FrameInput {
            tap: Some(TapInput {
                plane_anchor: Some(PLANE),
                ground: None,
                fighter: None,
            }),
            ..FrameInput::default()
        },
    );
    assert_eq!(query::phase(&world), GamePhase::ObstacleSetup);

    let events = frame(
        &mut world,
        &mut router,
        &events,
        FrameInput {
            finish_obstacles_pressed: true,
            ..FrameInput::default()
        },
    );
    assert_eq!(query::phase(&world), GamePhase::PawnSetup);

    let events = frame(
        &mut world,
        &mut router,
        &events,
        tap_ground(WorldPoint::ORIGIN),
    );
    let red_spawned = query::fighter_view(&world)
        .iter()
        .any(|fighter| fighter.team == Team::Red);
    assert!(red_spawned);

    let _ = frame(
        &mut world,
        &mut router,
        &events,
        tap_ground(WorldPoint::new(40.0, 0.0, 0.0)),
    );
    assert_eq!(query::phase(&world), GamePhase::TurnIdle);
    assert_eq!(
        query::active_turn(&world).map(|(team, _)| team),
        Some(Team::Red)
    );
}
