#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared vocabulary of the AR Skirmish engine.
//!
//! Everything that crosses a crate boundary lives here: identifiers, the
//! phase and team enums, geometry, provider report types, match tuning, and
//! the [`Command`]/[`Event`] unions. The world is the only writer of match
//! state and accepts mutations solely as commands; whatever it did in
//! response comes back out as events. Systems and adapters speak this
//! vocabulary to each other without depending on the world's internals, so
//! this crate stays dependency-light and serializable end to end.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to AR Skirmish.";

/// Hit-chance and damage-multiplier penalty applied when the line of sight
/// between an attacker and its target is obstructed.
pub const OBSTRUCTION_PENALTY: f32 = 0.5;

/// Unique identifier assigned to a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId(u32);

impl FighterId {
    /// Creates a new fighter identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a plane-candidate entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaneCandidateId(u32);

impl PlaneCandidateId {
    /// Creates a new plane-candidate identifier with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a grenade projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrenadeId(u32);

impl GrenadeId {
    /// Creates a new grenade identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned by the external tracking provider to an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(u64);

impl AnchorId {
    /// Creates a new anchor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Team membership determining roster and turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The red team, which always acts first.
    Red,
    /// The blue team.
    Blue,
}

impl Team {
    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

/// Top-level stage of the match state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-game menu; no simulation input is processed.
    Menu,
    /// Waiting for the player to choose the play-area plane.
    PlaneSetup,
    /// Obstacles are placed by tapping the selected plane.
    ObstacleSetup,
    /// Fighters are placed by tapping the selected plane.
    PawnSetup,
    /// A turn is underway and the acting player has not chosen an action.
    TurnIdle,
    /// The acting fighter is aiming a shot.
    TurnShoot,
    /// The acting fighter is aiming a grenade throw.
    TurnGrenade,
    /// The acting fighter is walking toward a tapped destination.
    TurnMovement,
    /// One team has been eliminated; only a return to the menu is accepted.
    GameEnd,
}

impl GamePhase {
    /// Reports whether the phase is one of the per-turn action stages.
    #[must_use]
    pub const fn is_turn_phase(self) -> bool {
        matches!(
            self,
            Self::TurnIdle | Self::TurnShoot | Self::TurnGrenade | Self::TurnMovement
        )
    }
}

/// Action category the acting player may enter from an idle turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAction {
    /// Aim and fire at an enemy fighter.
    Shoot,
    /// Aim and throw the fighter's single grenade.
    Grenade,
    /// Walk toward a tapped point on the play plane.
    Move,
}

/// Highlight state attached to a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionState {
    /// The fighter is neither acting nor targeted.
    None,
    /// The fighter is the current actor.
    Selected,
    /// The fighter is targeted by the current actor.
    Targeted,
}

/// Tracking quality reported by the external provider for an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// The anchor is actively tracked and its pose is current.
    Tracking,
    /// Tracking is temporarily lost; the last known pose remains valid.
    NotTracking,
    /// Tracking has been permanently lost for this anchor.
    StoppedTracking,
}

/// Position expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
    z: f32,
}

impl WorldPoint {
    /// The world origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new point from explicit components. The `y` axis points up.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal component along the `x` axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal component along the `z` axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        self.minus(other).length()
    }

    /// Distance to another point measured on the ground plane, ignoring the
    /// vertical axis.
    #[must_use]
    pub fn horizontal_distance_to(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Length of the vector from the origin to this point.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Component-wise sum.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise difference.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Uniformly scaled copy of the point.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// Position and ground-plane facing of an entity.
///
/// The yaw is measured in radians on the ground plane; a yaw of zero faces
/// along positive `x`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    position: WorldPoint,
    yaw: f32,
}

impl Pose {
    /// Creates a new pose from a position and a ground-plane yaw.
    #[must_use]
    pub const fn new(position: WorldPoint, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Creates a pose at the provided position facing along positive `x`.
    #[must_use]
    pub const fn at(position: WorldPoint) -> Self {
        Self::new(position, 0.0)
    }

    /// Position of the pose.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Ground-plane facing in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Unit vector on the ground plane pointing along the pose's facing.
    #[must_use]
    pub fn forward(&self) -> WorldPoint {
        WorldPoint::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }
}

/// Ground-plane yaw that makes an entity at `from` face `to`.
///
/// Degenerate inputs (both points on the same vertical line) yield zero.
#[must_use]
pub fn yaw_toward(from: WorldPoint, to: WorldPoint) -> f32 {
    let dx = to.x() - from.x();
    let dz = to.z() - from.z();
    if dx == 0.0 && dz == 0.0 {
        0.0
    } else {
        dz.atan2(dx)
    }
}

/// Classification of an anchor reported by the tracking provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorKind {
    /// A detected horizontal surface usable as the play area.
    Plane,
    /// A recognized image marker identified by the provider-facing name.
    Image {
        /// Name the provider assigned to the recognized image.
        marker: String,
    },
}

/// One anchor's state as reported by the tracking provider for a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorReport {
    /// Provider-assigned identifier for the anchor.
    pub anchor: AnchorId,
    /// Classification of the anchor geometry.
    pub kind: AnchorKind,
    /// Tracking quality for this tick.
    pub state: TrackingState,
    /// Latest world pose of the anchor.
    pub pose: Pose,
    /// Anchor this one was merged into, if the provider subsumed it.
    pub subsumed_by: Option<AnchorId>,
}

/// Latest pose of a tracked anchor, batched for per-tick synchronisation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPose {
    /// Anchor whose pose advanced.
    pub anchor: AnchorId,
    /// Current world pose of the anchor.
    pub pose: Pose,
}

/// Visual appearance applied to a plane-candidate entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl PlaneColor {
    /// Creates a new plane color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Fixed palette cycled through when spawning plane candidates.
pub const PLANE_PALETTE: [PlaneColor; 11] = [
    PlaneColor::from_rgb(0x00, 0x00, 0xff),
    PlaneColor::from_rgb(0xff, 0x00, 0x00),
    PlaneColor::from_rgb(0x00, 0xff, 0x00),
    PlaneColor::from_rgb(0x00, 0xff, 0xff),
    PlaneColor::from_rgb(0xff, 0x00, 0xff),
    PlaneColor::from_rgb(0x00, 0xc8, 0x57),
    PlaneColor::from_rgb(0xff, 0xa5, 0x00),
    PlaneColor::from_rgb(0x80, 0x00, 0x80),
    PlaneColor::from_rgb(0x40, 0xe0, 0xd0),
    PlaneColor::from_rgb(0xff, 0xff, 0xff),
    PlaneColor::from_rgb(0xff, 0xff, 0x00),
];

/// Returns the palette entry for the provided spawn index, wrapping
/// cyclically past the end of [`PLANE_PALETTE`].
#[must_use]
pub fn palette_color(index: usize) -> PlaneColor {
    PLANE_PALETTE[index % PLANE_PALETTE.len()]
}

/// Records how an obstacle entered the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleOrigin {
    /// Placed by a player tap during obstacle setup; counts against the
    /// obstacle limit.
    Placed,
    /// Spawned from the distinguished image marker; exempt from the limit.
    Marker,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SpawnRejection {
    /// The team's roster already holds the configured number of pawns.
    #[error("team roster is already at quota")]
    RosterFull,
    /// The configured obstacle limit has been reached.
    #[error("obstacle limit reached")]
    ObstacleLimit,
    /// The requested placement point lies inside an obstacle footprint.
    #[error("placement point is obstructed")]
    Obstructed,
}

/// Reasons a turn action may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum ActionRejection {
    /// The acting fighter already fired this turn.
    #[error("fighter has already shot this turn")]
    AlreadyShot,
    /// No target is currently acquired.
    #[error("no target selected")]
    NoTarget,
    /// The fighter's single grenade has already been thrown.
    #[error("grenade already spent")]
    GrenadeSpent,
    /// The requested target is dead or otherwise not attackable.
    #[error("target is not attackable")]
    InvalidTarget,
}

/// Reason the acting fighter stopped walking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementStop {
    /// The fighter reached its destination.
    Arrived,
    /// The per-turn movement budget was exhausted mid-walk.
    BudgetExhausted,
    /// A forward trace hit an obstacle.
    Obstructed,
}

/// Tuning for targeting and shooting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    /// Distance at or below which a shot always hits.
    pub min_range: f32,
    /// Distance at or beyond which a shot never hits.
    pub max_range: f32,
    /// Smallest rollable damage per hit.
    pub min_damage: u32,
    /// Largest rollable damage per hit.
    pub max_damage: u32,
}

impl CombatTuning {
    /// Probability in `[0, 1]` that a shot at the given distance hits,
    /// before any obstruction penalty.
    ///
    /// The chance is a linear map of distance from `[min_range, max_range]`
    /// onto `[1, 0]`, clamped at both ends. A degenerate range where
    /// `max_range <= min_range` collapses to a step function.
    #[must_use]
    pub fn hit_chance(&self, distance: f32) -> f32 {
        if self.max_range <= self.min_range {
            return if distance <= self.min_range { 1.0 } else { 0.0 };
        }
        ((self.max_range - distance) / (self.max_range - self.min_range)).clamp(0.0, 1.0)
    }
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            min_range: 30.0,
            max_range: 300.0,
            min_damage: 25,
            max_damage: 35,
        }
    }
}

/// Tuning for the grenade lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrenadeTuning {
    /// Delay between the throw command and the projectile leaving the hand.
    pub release_delay: Duration,
    /// Fuse between release and detonation.
    pub fuse: Duration,
    /// Radius of the detonation area query.
    pub explosion_radius: f32,
    /// Damage applied to every fighter inside the radius.
    pub damage: f32,
    /// Multiplier converting drag magnitude into release speed.
    pub throw_power: f32,
    /// Drags shorter than this are ignored in the grenade phase.
    pub min_drag: f32,
    /// Downward acceleration applied to the projectile in flight.
    pub gravity: f32,
}

impl Default for GrenadeTuning {
    fn default() -> Self {
        Self {
            release_delay: Duration::from_millis(820),
            fuse: Duration::from_millis(1500),
            explosion_radius: 150.0,
            damage: 75.0,
            throw_power: 0.2,
            min_drag: 50.0,
            gravity: 980.0,
        }
    }
}

/// Tuning for per-turn fighter movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementTuning {
    /// Total distance a fighter may walk per turn.
    pub budget: f32,
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Horizontal distance at which the destination counts as reached.
    pub arrival_epsilon: f32,
    /// Forward-trace length expressed as a multiple of the frame step.
    pub lookahead: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            budget: 100.0,
            walk_speed: 60.0,
            arrival_epsilon: 1.0,
            lookahead: 5.0,
        }
    }
}

/// Complete configuration for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Fighters per team; rosters are fixed at this size once full.
    pub pawns_per_team: usize,
    /// Maximum number of tap-placed obstacles.
    pub obstacle_limit: usize,
    /// Footprint radius used for obstruction traces against obstacles.
    pub obstacle_radius: f32,
    /// Health every fighter starts the match with.
    pub starting_health: f32,
    /// Provider name of the image marker that spawns the bonus obstacle.
    pub obstacle_marker: String,
    /// Seed for the world's deterministic combat RNG.
    pub rng_seed: u64,
    /// Targeting and shooting tuning.
    pub combat: CombatTuning,
    /// Grenade lifecycle tuning.
    pub grenade: GrenadeTuning,
    /// Movement tuning.
    pub movement: MovementTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            pawns_per_team: 3,
            obstacle_limit: 3,
            obstacle_radius: 25.0,
            starting_health: 100.0,
            obstacle_marker: String::from("gallery-portrait"),
            rng_seed: 0x5eed_ab1e_0000_0001,
            combat: CombatTuning::default(),
            grenade: GrenadeTuning::default(),
            movement: MovementTuning::default(),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leaves the menu and enters plane setup with the red team active.
    StartGame,
    /// Returns to the menu from any phase and fully resets the match.
    ReturnToMenu,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time elapsed since the previous tick.
        dt: Duration,
    },
    /// Chooses the play-area plane; every other candidate is destroyed.
    SelectPlane {
        /// Anchor of the chosen plane.
        anchor: AnchorId,
    },
    /// Ends obstacle setup before the limit is reached.
    FinishObstacleSetup,
    /// Requests an obstacle at the provided pose.
    SpawnObstacle {
        /// Anchor the obstacle should stay registered to, if any.
        anchor: Option<AnchorId>,
        /// World pose of the obstacle.
        pose: Pose,
        /// How the obstacle entered the match.
        origin: ObstacleOrigin,
    },
    /// Requests a fighter for the provided team at the provided pose.
    SpawnFighter {
        /// Team the fighter joins.
        team: Team,
        /// Anchor the fighter is bound to.
        anchor: AnchorId,
        /// World pose of the fighter.
        pose: Pose,
    },
    /// Enters one of the per-turn action phases from an idle turn.
    ChooseAction {
        /// Action category the acting player selected.
        action: TurnAction,
    },
    /// Acquires a target for the acting fighter.
    SelectTarget {
        /// Fighter to target.
        target: FighterId,
    },
    /// Fires the acting fighter's weapon at its acquired target.
    Shoot,
    /// Begins the acting fighter's grenade throw.
    ThrowGrenade {
        /// Drag vector whose magnitude scales the release velocity.
        direction: WorldPoint,
    },
    /// Sets the acting fighter's walk destination.
    MoveTo {
        /// Destination on the play plane.
        destination: WorldPoint,
    },
    /// Ends the acting team's turn and rotates to the next fighter.
    EndTurn,
    /// Spawns a plane-candidate entity bound to a newly tracked anchor.
    SpawnPlaneCandidate {
        /// Anchor the candidate is bound to.
        anchor: AnchorId,
        /// Palette color assigned by the tracker.
        color: PlaneColor,
        /// Initial world pose of the candidate.
        pose: Pose,
    },
    /// Destroys the plane candidate bound to the provided anchor.
    DespawnPlaneCandidate {
        /// Anchor whose candidate should be destroyed.
        anchor: AnchorId,
    },
    /// Applies the latest poses of tracked anchors to bound entities.
    SyncAnchorPoses {
        /// Poses batched by the tracker for this tick.
        poses: Vec<AnchorPose>,
    },
    /// Permanently clears every binding to the provided anchor.
    ClearAnchorBinding {
        /// Anchor whose tracking stopped.
        anchor: AnchorId,
    },
    /// Clears candidates and plane selection after a provider fatal error.
    ResetTracking,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the match entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: GamePhase,
    },
    /// Confirms that a plane candidate was spawned for a tracked anchor.
    PlaneCandidateSpawned {
        /// Identifier assigned to the candidate by the world.
        id: PlaneCandidateId,
        /// Anchor the candidate is bound to.
        anchor: AnchorId,
        /// Palette color assigned to the candidate.
        color: PlaneColor,
    },
    /// Confirms that a plane candidate was destroyed.
    PlaneCandidateDespawned {
        /// Identifier of the destroyed candidate.
        id: PlaneCandidateId,
        /// Anchor the candidate was bound to.
        anchor: AnchorId,
    },
    /// Confirms that the play-area plane was chosen for the match.
    PlaneSelected {
        /// Anchor of the chosen plane.
        anchor: AnchorId,
    },
    /// Confirms that candidates and plane selection were cleared.
    TrackingReset,
    /// Confirms that an obstacle was spawned.
    ObstacleSpawned {
        /// Identifier assigned to the obstacle by the world.
        id: ObstacleId,
        /// How the obstacle entered the match.
        origin: ObstacleOrigin,
    },
    /// Reports that an obstacle spawn request was rejected.
    ObstacleRejected {
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Confirms that a fighter joined a roster.
    FighterSpawned {
        /// Identifier assigned to the fighter by the world.
        id: FighterId,
        /// Team the fighter joined.
        team: Team,
        /// Pose the fighter spawned at.
        pose: Pose,
    },
    /// Reports that a fighter spawn request was rejected.
    FighterRejected {
        /// Team the request was for.
        team: Team,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Announces that both rosters are full and turns have begun.
    SetupCompleted,
    /// Announces the fighter acting this turn.
    TurnStarted {
        /// Team whose turn began.
        team: Team,
        /// Fighter selected to act.
        fighter: FighterId,
    },
    /// Announces that the acting team finished its turn.
    TurnEnded {
        /// Team whose turn ended.
        team: Team,
    },
    /// Confirms that the acting player entered an action phase.
    ActionChosen {
        /// Action category that was chosen.
        action: TurnAction,
    },
    /// Confirms that the acting fighter acquired a target.
    TargetAcquired {
        /// Fighter doing the targeting.
        actor: FighterId,
        /// Fighter now targeted.
        target: FighterId,
        /// Hit chance after range mapping and obstruction penalty.
        hit_chance: f32,
        /// Indicates whether the line of sight is obstructed.
        obstructed: bool,
    },
    /// Confirms that a previously targeted fighter was released.
    TargetCleared {
        /// Fighter that is no longer targeted.
        target: FighterId,
    },
    /// Reports the outcome of a shot.
    ShotFired {
        /// Fighter that fired.
        actor: FighterId,
        /// Fighter that was shot at.
        target: FighterId,
        /// Indicates whether the shot connected.
        hit: bool,
    },
    /// Reports that a turn action was rejected.
    ActionRejected {
        /// Fighter the action was requested for.
        fighter: FighterId,
        /// Specific reason the action failed.
        reason: ActionRejection,
    },
    /// Reports damage applied to a fighter.
    FighterDamaged {
        /// Fighter that took damage.
        fighter: FighterId,
        /// Amount subtracted from health before clamping.
        amount: f32,
        /// Health remaining after the hit.
        health: f32,
    },
    /// Announces that a fighter's health reached zero.
    FighterDied {
        /// Fighter that died.
        fighter: FighterId,
    },
    /// Confirms that the acting fighter began its throw animation.
    GrenadeThrown {
        /// Fighter that is throwing.
        fighter: FighterId,
    },
    /// Announces that the grenade left the thrower's hand.
    GrenadeReleased {
        /// Identifier assigned to the projectile.
        grenade: GrenadeId,
        /// Pose the projectile was released at.
        pose: Pose,
        /// Initial velocity of the projectile.
        velocity: WorldPoint,
    },
    /// Announces a detonation.
    GrenadeExploded {
        /// Projectile that detonated.
        grenade: GrenadeId,
        /// Position of the detonation.
        position: WorldPoint,
    },
    /// Announces that every binding to an anchor was cleared.
    AnchorBindingCleared {
        /// Anchor whose tracking stopped.
        anchor: AnchorId,
    },
    /// Announces that the acting fighter stopped walking.
    MovementStopped {
        /// Fighter that stopped.
        fighter: FighterId,
        /// Why the fighter stopped.
        reason: MovementStop,
    },
    /// Announces that one team eliminated the other.
    MatchEnded {
        /// Team that won the match.
        winner: Team,
    },
    /// Confirms that the match state returned to menu defaults.
    MatchReset,
}

/// Immutable representation of a single fighter's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FighterSnapshot {
    /// Unique identifier assigned to the fighter.
    pub id: FighterId,
    /// Team the fighter belongs to.
    pub team: Team,
    /// Current world pose.
    pub pose: Pose,
    /// Remaining health, clamped at zero.
    pub health: f32,
    /// Indicates whether the fighter is permanently dead.
    pub dead: bool,
    /// Highlight state of the fighter.
    pub selection: SelectionState,
    /// Indicates whether the fighter fired this turn.
    pub has_shot: bool,
    /// Indicates whether the fighter still carries its grenade.
    pub has_grenade: bool,
    /// Distance walked this turn.
    pub distance_moved: f32,
    /// Fighter currently targeted by this one, if any.
    pub target: Option<FighterId>,
    /// Anchor the fighter is bound to, if tracking has not been lost.
    pub anchor: Option<AnchorId>,
}

/// Read-only snapshot describing all fighters in the match.
#[derive(Clone, Debug, Default)]
pub struct FighterView {
    snapshots: Vec<FighterSnapshot>,
}

impl FighterView {
    /// Creates a new fighter view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<FighterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &FighterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided fighter.
    #[must_use]
    pub fn get(&self, id: FighterId) -> Option<&FighterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<FighterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single obstacle used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Unique identifier assigned to the obstacle.
    pub id: ObstacleId,
    /// Current world pose.
    pub pose: Pose,
    /// Footprint radius used for obstruction traces.
    pub radius: f32,
    /// How the obstacle entered the match.
    pub origin: ObstacleOrigin,
    /// Anchor the obstacle is bound to, if tracking has not been lost.
    pub anchor: Option<AnchorId>,
}

/// Read-only snapshot describing all obstacles in the match.
#[derive(Clone, Debug, Default)]
pub struct ObstacleView {
    snapshots: Vec<ObstacleSnapshot>,
}

impl ObstacleView {
    /// Creates a new obstacle view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ObstacleSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ObstacleSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ObstacleSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a plane candidate used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneCandidateSnapshot {
    /// Unique identifier assigned to the candidate.
    pub id: PlaneCandidateId,
    /// Anchor the candidate is bound to.
    pub anchor: AnchorId,
    /// Palette color assigned to the candidate.
    pub color: PlaneColor,
    /// Current world pose.
    pub pose: Pose,
}

/// Read-only snapshot describing all plane candidates.
#[derive(Clone, Debug, Default)]
pub struct PlaneCandidateView {
    snapshots: Vec<PlaneCandidateSnapshot>,
}

impl PlaneCandidateView {
    /// Creates a new candidate view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PlaneCandidateSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PlaneCandidateSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PlaneCandidateSnapshot> {
        self.snapshots
    }
}
