#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input-routing system that translates frame input into commands.
//!
//! Adapters resolve raycasts against the rendered scene before calling in,
//! so a tap arrives here already classified: the plane candidate it hit, the
//! point where it met the play plane, and the fighter it picked, if any. The
//! router decides what those hits mean in the current phase and answers with
//! commands; it holds no opinion about whether they are legal, which is the
//! world's job.

use ar_skirmish_core::{
    AnchorId, Command, Event, FighterId, FighterView, GamePhase, ObstacleOrigin, Pose, Team,
    TurnAction, WorldPoint,
};

/// Resolved tap data for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapInput {
    /// Anchor of the plane candidate the tap ray hit, if any.
    pub plane_anchor: Option<AnchorId>,
    /// Point where the tap ray met the selected play plane, if it did.
    pub ground: Option<WorldPoint>,
    /// Fighter the tap ray picked, if any.
    pub fighter: Option<FighterId>,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Tap resolved against the scene on this frame, if one landed.
    pub tap: Option<TapInput>,
    /// Completed drag vector in world units, if a drag ended this frame.
    pub drag: Option<WorldPoint>,
    /// Indicates whether the start button was pressed on this frame.
    pub start_pressed: bool,
    /// Indicates whether the menu button was pressed on this frame.
    pub menu_pressed: bool,
    /// Action the player picked from the turn menu on this frame, if any.
    pub action: Option<TurnAction>,
    /// Indicates whether the fire button was pressed on this frame.
    pub fire_pressed: bool,
    /// Indicates whether the end-turn button was pressed on this frame.
    pub end_turn_pressed: bool,
    /// Indicates whether the player closed obstacle placement early.
    pub finish_obstacles_pressed: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            tap: None,
            drag: None,
            start_pressed: false,
            menu_pressed: false,
            action: None,
            fire_pressed: false,
            end_turn_pressed: false,
            finish_obstacles_pressed: false,
        }
    }
}

/// Input-routing system that dispatches frame input by game phase.
#[derive(Clone, Debug)]
pub struct TurnFlow {
    phase: GamePhase,
}

impl Default for TurnFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnFlow {
    /// Creates a new router starting at the menu.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: GamePhase::Menu,
        }
    }

    /// Consumes world events and one frame of input to emit commands.
    ///
    /// `selected_plane` should mirror the world's `query::selected_plane` so
    /// placement taps can be registered to the play-plane anchor.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: &FrameInput,
        fighters: &FighterView,
        pawns_per_team: usize,
        selected_plane: Option<AnchorId>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::PhaseChanged { phase } = event {
                self.phase = *phase;
            }
        }

        if self.phase == GamePhase::Menu {
            if input.start_pressed {
                out.push(Command::StartGame);
            }
            return;
        }
        if input.menu_pressed {
            out.push(Command::ReturnToMenu);
            return;
        }

        match self.phase {
            GamePhase::Menu => {}
            GamePhase::PlaneSetup => {
                if let Some(anchor) = input.tap.and_then(|tap| tap.plane_anchor) {
                    out.push(Command::SelectPlane { anchor });
                }
            }
            GamePhase::ObstacleSetup => {
                if input.finish_obstacles_pressed {
                    out.push(Command::FinishObstacleSetup);
                    return;
                }
                if let Some(point) = input.tap.and_then(|tap| tap.ground) {
                    if let Some(anchor) = selected_plane {
                        out.push(Command::SpawnObstacle {
                            anchor: Some(anchor),
                            pose: Pose::at(point),
                            origin: ObstacleOrigin::Placed,
                        });
                    }
                }
            }
            GamePhase::PawnSetup => {
                if let Some(point) = input.tap.and_then(|tap| tap.ground) {
                    if let Some(anchor) = selected_plane {
                        let team = next_team_to_fill(fighters, pawns_per_team);
                        out.push(Command::SpawnFighter {
                            team,
                            anchor,
                            pose: Pose::at(point),
                        });
                    }
                }
            }
            GamePhase::TurnIdle => {
                if input.end_turn_pressed {
                    out.push(Command::EndTurn);
                    return;
                }
                if let Some(action) = input.action {
                    out.push(Command::ChooseAction { action });
                }
            }
            GamePhase::TurnShoot => {
                if input.end_turn_pressed {
                    out.push(Command::EndTurn);
                    return;
                }
                if let Some(fighter) = input.tap.and_then(|tap| tap.fighter) {
                    out.push(Command::SelectTarget { target: fighter });
                }
                if input.fire_pressed {
                    out.push(Command::Shoot);
                }
            }
            GamePhase::TurnGrenade => {
                if input.end_turn_pressed {
                    out.push(Command::EndTurn);
                    return;
                }
                if let Some(direction) = input.drag {
                    out.push(Command::ThrowGrenade { direction });
                }
            }
            GamePhase::TurnMovement => {
                if input.end_turn_pressed {
                    out.push(Command::EndTurn);
                    return;
                }
                if let Some(point) = input.tap.and_then(|tap| tap.ground) {
                    out.push(Command::MoveTo { destination: point });
                }
            }
            GamePhase::GameEnd => {}
        }
    }
}

/// Roster the next placement tap should fill: red until it reaches quota,
/// then blue.
#[must_use]
pub fn next_team_to_fill(fighters: &FighterView, pawns_per_team: usize) -> Team {
    let red = fighters
        .iter()
        .filter(|fighter| fighter.team == Team::Red)
        .count();
    if red < pawns_per_team {
        Team::Red
    } else {
        Team::Blue
    }
}
