#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state management for AR Skirmish.
//!
//! The world owns every fighter, obstacle, and plane candidate, the phase
//! state machine, the turn rotation, and the combat RNG. Mutation happens
//! exclusively through [`apply`]; adapters and systems read back through the
//! [`query`] module.

use std::time::Duration;

use ar_skirmish_core::{
    yaw_toward, ActionRejection, AnchorId, AnchorPose, Command, Event, FighterId, GamePhase,
    GrenadeId, MatchConfig, MovementStop, ObstacleId, ObstacleOrigin, PlaneCandidateId, PlaneColor,
    Pose, SelectionState, SpawnRejection, Team, TurnAction, WorldPoint, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod combat;
mod scheduler;
mod tasks;

use scheduler::{RosterEntry, TurnScheduler};
use tasks::{TaskKind, TaskQueue};

/// Height above a fighter's base at which a thrown grenade leaves the hand.
const GRENADE_RELEASE_HEIGHT: f32 = 40.0;

/// Represents the authoritative AR Skirmish match state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: MatchConfig,
    phase: GamePhase,
    clock: Duration,
    rng: ChaCha8Rng,
    fighters: Vec<Fighter>,
    obstacles: Vec<Obstacle>,
    plane_candidates: Vec<PlaneCandidate>,
    known_anchors: Vec<KnownAnchor>,
    selected_plane: Option<AnchorId>,
    placed_obstacles: usize,
    next_fighter_id: u32,
    next_obstacle_id: u32,
    next_candidate_id: u32,
    next_grenade_id: u32,
    scheduler: TurnScheduler,
    tasks: TaskQueue,
    movement: Option<MovementPlan>,
}

impl World {
    /// Creates a new world at the menu, ready for a match.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            banner: WELCOME_BANNER,
            phase: GamePhase::Menu,
            clock: Duration::ZERO,
            rng,
            fighters: Vec::new(),
            obstacles: Vec::new(),
            plane_candidates: Vec::new(),
            known_anchors: Vec::new(),
            selected_plane: None,
            placed_obstacles: 0,
            next_fighter_id: 0,
            next_obstacle_id: 0,
            next_candidate_id: 0,
            next_grenade_id: 0,
            scheduler: TurnScheduler::new(),
            tasks: TaskQueue::new(),
            movement: None,
            config,
        }
    }

    fn set_phase(&mut self, phase: GamePhase, out_events: &mut Vec<Event>) {
        if self.phase != phase {
            self.phase = phase;
            out_events.push(Event::PhaseChanged { phase });
        }
    }

    fn fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.iter().find(|fighter| fighter.id == id)
    }

    fn fighter_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.iter_mut().find(|fighter| fighter.id == id)
    }

    fn roster_entries(&self) -> Vec<RosterEntry> {
        self.fighters
            .iter()
            .map(|fighter| RosterEntry {
                id: fighter.id,
                team: fighter.team,
                dead: fighter.dead,
            })
            .collect()
    }

    fn team_count(&self, team: Team) -> usize {
        self.fighters
            .iter()
            .filter(|fighter| fighter.team == team)
            .count()
    }

    fn team_alive(&self, team: Team) -> bool {
        self.fighters
            .iter()
            .any(|fighter| fighter.team == team && !fighter.dead)
    }

    fn obstructed(&self, from: WorldPoint, to: WorldPoint) -> bool {
        self.obstacles.iter().any(|obstacle| {
            combat::segment_hits_circle(from, to, obstacle.pose.position(), obstacle.radius)
        })
    }

    fn remember_anchor(&mut self, anchor: AnchorId, position: WorldPoint) {
        if !self.known_anchors.iter().any(|known| known.id == anchor) {
            self.known_anchors.push(KnownAnchor {
                id: anchor,
                position,
            });
        }
    }

    fn reset_match(&mut self) {
        self.fighters.clear();
        self.obstacles.clear();
        self.plane_candidates.clear();
        self.known_anchors.clear();
        self.selected_plane = None;
        self.placed_obstacles = 0;
        self.next_fighter_id = 0;
        self.next_obstacle_id = 0;
        self.next_candidate_id = 0;
        self.next_grenade_id = 0;
        self.scheduler.reset();
        self.tasks.clear();
        self.movement = None;
        self.clock = Duration::ZERO;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
    }

    fn select_plane(&mut self, anchor: AnchorId, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::PlaneSetup || self.selected_plane.is_some() {
            return;
        }
        if !self
            .plane_candidates
            .iter()
            .any(|candidate| candidate.anchor == anchor)
        {
            return;
        }

        self.selected_plane = Some(anchor);
        let removed: Vec<(PlaneCandidateId, AnchorId)> = self
            .plane_candidates
            .iter()
            .filter(|candidate| candidate.anchor != anchor)
            .map(|candidate| (candidate.id, candidate.anchor))
            .collect();
        self.plane_candidates
            .retain(|candidate| candidate.anchor == anchor);
        for (id, removed_anchor) in removed {
            out_events.push(Event::PlaneCandidateDespawned {
                id,
                anchor: removed_anchor,
            });
        }
        out_events.push(Event::PlaneSelected { anchor });
        self.set_phase(GamePhase::ObstacleSetup, out_events);
    }

    fn spawn_plane_candidate(
        &mut self,
        anchor: AnchorId,
        color: PlaneColor,
        pose: Pose,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != GamePhase::PlaneSetup || self.selected_plane.is_some() {
            return;
        }
        if self
            .plane_candidates
            .iter()
            .any(|candidate| candidate.anchor == anchor)
        {
            return;
        }

        let id = PlaneCandidateId::new(self.next_candidate_id);
        self.next_candidate_id += 1;
        self.plane_candidates.push(PlaneCandidate {
            id,
            anchor,
            color,
            pose,
        });
        self.remember_anchor(anchor, pose.position());
        out_events.push(Event::PlaneCandidateSpawned { id, anchor, color });
    }

    fn despawn_plane_candidate(&mut self, anchor: AnchorId, out_events: &mut Vec<Event>) {
        if let Some(index) = self
            .plane_candidates
            .iter()
            .position(|candidate| candidate.anchor == anchor)
        {
            let candidate = self.plane_candidates.remove(index);
            out_events.push(Event::PlaneCandidateDespawned {
                id: candidate.id,
                anchor,
            });
        }
    }

    fn spawn_obstacle(
        &mut self,
        anchor: Option<AnchorId>,
        pose: Pose,
        origin: ObstacleOrigin,
        out_events: &mut Vec<Event>,
    ) {
        match origin {
            ObstacleOrigin::Placed => {
                if self.phase != GamePhase::ObstacleSetup {
                    return;
                }
                if self.placed_obstacles >= self.config.obstacle_limit {
                    out_events.push(Event::ObstacleRejected {
                        reason: SpawnRejection::ObstacleLimit,
                    });
                    return;
                }
            }
            ObstacleOrigin::Marker => {
                if self.phase == GamePhase::Menu {
                    return;
                }
            }
        }

        let id = ObstacleId::new(self.next_obstacle_id);
        self.next_obstacle_id += 1;
        self.obstacles.push(Obstacle {
            id,
            pose,
            radius: self.config.obstacle_radius,
            origin,
            anchor,
        });
        if let Some(anchor) = anchor {
            self.remember_anchor(anchor, pose.position());
        }
        out_events.push(Event::ObstacleSpawned { id, origin });

        if origin == ObstacleOrigin::Placed {
            self.placed_obstacles += 1;
            if self.placed_obstacles >= self.config.obstacle_limit {
                self.set_phase(GamePhase::PawnSetup, out_events);
            }
        }
    }

    fn spawn_fighter(
        &mut self,
        team: Team,
        anchor: AnchorId,
        pose: Pose,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != GamePhase::PawnSetup {
            return;
        }
        if self.team_count(team) >= self.config.pawns_per_team {
            out_events.push(Event::FighterRejected {
                team,
                reason: SpawnRejection::RosterFull,
            });
            return;
        }
        let point = pose.position();
        if self.obstacles.iter().any(|obstacle| {
            obstacle.pose.position().horizontal_distance_to(point) <= obstacle.radius
        }) {
            out_events.push(Event::FighterRejected {
                team,
                reason: SpawnRejection::Obstructed,
            });
            return;
        }

        let id = FighterId::new(self.next_fighter_id);
        self.next_fighter_id += 1;
        self.fighters.push(Fighter {
            id,
            team,
            pose,
            health: self.config.starting_health,
            dead: false,
            selection: SelectionState::None,
            has_shot: false,
            has_grenade: true,
            distance_moved: 0.0,
            target: None,
            anchor: Some(anchor),
        });
        out_events.push(Event::FighterSpawned { id, team, pose });

        let quota = self.config.pawns_per_team;
        if self.team_count(Team::Red) >= quota && self.team_count(Team::Blue) >= quota {
            self.face_rosters();
            out_events.push(Event::SetupCompleted);
            let roster = self.roster_entries();
            let (first_team, first_fighter) = self.scheduler.start(&roster);
            self.begin_turn(first_team, first_fighter, out_events);
            self.set_phase(GamePhase::TurnIdle, out_events);
        }
    }

    fn team_centroid(&self, team: Team) -> Option<WorldPoint> {
        let positions: Vec<WorldPoint> = self
            .fighters
            .iter()
            .filter(|fighter| fighter.team == team)
            .map(|fighter| fighter.pose.position())
            .collect();
        if positions.is_empty() {
            return None;
        }
        let sum = positions
            .iter()
            .fold(WorldPoint::ORIGIN, |acc, position| acc.plus(*position));
        Some(sum.scaled(1.0 / positions.len() as f32))
    }

    fn face_rosters(&mut self) {
        let red_centroid = self.team_centroid(Team::Red);
        let blue_centroid = self.team_centroid(Team::Blue);
        for fighter in self.fighters.iter_mut() {
            let facing = match fighter.team {
                Team::Red => blue_centroid,
                Team::Blue => red_centroid,
            };
            if let Some(toward) = facing {
                let position = fighter.pose.position();
                fighter.pose = Pose::new(position, yaw_toward(position, toward));
            }
        }
    }

    fn begin_turn(&mut self, team: Team, fighter: FighterId, out_events: &mut Vec<Event>) {
        for other in self.fighters.iter_mut() {
            if other.selection == SelectionState::Selected {
                other.selection = SelectionState::None;
            }
        }
        if let Some(actor) = self.fighter_mut(fighter) {
            actor.selection = SelectionState::Selected;
            actor.has_shot = false;
            actor.distance_moved = 0.0;
            actor.target = None;
        }
        out_events.push(Event::TurnStarted { team, fighter });
    }

    fn choose_action(&mut self, action: TurnAction, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnIdle {
            return;
        }
        let Some((_, actor_id)) = self.scheduler.active() else {
            return;
        };
        let Some(actor) = self.fighter(actor_id) else {
            return;
        };
        if actor.dead {
            return;
        }

        match action {
            TurnAction::Shoot if actor.has_shot => {
                out_events.push(Event::ActionRejected {
                    fighter: actor_id,
                    reason: ActionRejection::AlreadyShot,
                });
                return;
            }
            TurnAction::Grenade if !actor.has_grenade => {
                out_events.push(Event::ActionRejected {
                    fighter: actor_id,
                    reason: ActionRejection::GrenadeSpent,
                });
                return;
            }
            _ => {}
        }

        out_events.push(Event::ActionChosen { action });
        let phase = match action {
            TurnAction::Shoot => GamePhase::TurnShoot,
            TurnAction::Grenade => GamePhase::TurnGrenade,
            TurnAction::Move => GamePhase::TurnMovement,
        };
        self.set_phase(phase, out_events);
    }

    fn select_target(&mut self, target: FighterId, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnShoot {
            return;
        }
        let Some((team, actor_id)) = self.scheduler.active() else {
            return;
        };
        let attackable = self
            .fighter(target)
            .map_or(false, |candidate| !candidate.dead && candidate.team != team);
        if !attackable {
            out_events.push(Event::ActionRejected {
                fighter: actor_id,
                reason: ActionRejection::InvalidTarget,
            });
            return;
        }

        let previous = self.fighter(actor_id).and_then(|actor| actor.target);
        if let Some(previous) = previous {
            if previous != target {
                if let Some(released) = self.fighter_mut(previous) {
                    if released.selection == SelectionState::Targeted {
                        released.selection = SelectionState::None;
                    }
                }
                out_events.push(Event::TargetCleared { target: previous });
            }
        }

        let Some(actor_position) = self.fighter(actor_id).map(|actor| actor.pose.position())
        else {
            return;
        };
        let Some(target_position) = self.fighter(target).map(|found| found.pose.position())
        else {
            return;
        };
        let obstructed = self.obstructed(actor_position, target_position);
        let profile = combat::shot_profile(
            &self.config.combat,
            actor_position.distance_to(target_position),
            obstructed,
        );

        if let Some(actor) = self.fighter_mut(actor_id) {
            actor.target = Some(target);
            actor.pose = Pose::new(actor_position, yaw_toward(actor_position, target_position));
        }
        if let Some(marked) = self.fighter_mut(target) {
            marked.selection = SelectionState::Targeted;
        }
        out_events.push(Event::TargetAcquired {
            actor: actor_id,
            target,
            hit_chance: profile.hit_chance,
            obstructed,
        });
    }

    fn shoot(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnShoot {
            return;
        }
        let Some((_, actor_id)) = self.scheduler.active() else {
            return;
        };
        let Some((has_shot, target)) = self
            .fighter(actor_id)
            .filter(|actor| !actor.dead)
            .map(|actor| (actor.has_shot, actor.target))
        else {
            return;
        };

        if has_shot {
            out_events.push(Event::ActionRejected {
                fighter: actor_id,
                reason: ActionRejection::AlreadyShot,
            });
            return;
        }
        let Some(target) = target else {
            out_events.push(Event::ActionRejected {
                fighter: actor_id,
                reason: ActionRejection::NoTarget,
            });
            return;
        };
        let target_alive = self.fighter(target).map_or(false, |found| !found.dead);
        if !target_alive {
            if let Some(actor) = self.fighter_mut(actor_id) {
                actor.target = None;
            }
            out_events.push(Event::ActionRejected {
                fighter: actor_id,
                reason: ActionRejection::InvalidTarget,
            });
            return;
        }

        let Some(actor_position) = self.fighter(actor_id).map(|actor| actor.pose.position())
        else {
            return;
        };
        let Some(target_position) = self.fighter(target).map(|found| found.pose.position())
        else {
            return;
        };
        let obstructed = self.obstructed(actor_position, target_position);
        let profile = combat::shot_profile(
            &self.config.combat,
            actor_position.distance_to(target_position),
            obstructed,
        );
        let damage = combat::roll_shot(&mut self.rng, &self.config.combat, profile);

        if let Some(actor) = self.fighter_mut(actor_id) {
            actor.has_shot = true;
            actor.target = None;
        }
        if let Some(released) = self.fighter_mut(target) {
            if released.selection == SelectionState::Targeted {
                released.selection = SelectionState::None;
            }
        }
        out_events.push(Event::ShotFired {
            actor: actor_id,
            target,
            hit: damage.is_some(),
        });
        out_events.push(Event::TargetCleared { target });
        if let Some(damage) = damage {
            self.damage_fighter(target, damage, out_events);
        }
        self.set_phase(GamePhase::TurnIdle, out_events);
        self.check_victory(out_events);
    }

    fn throw_grenade(&mut self, direction: WorldPoint, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnGrenade {
            return;
        }
        let Some((_, actor_id)) = self.scheduler.active() else {
            return;
        };
        let Some(has_grenade) = self
            .fighter(actor_id)
            .filter(|actor| !actor.dead)
            .map(|actor| actor.has_grenade)
        else {
            return;
        };
        if !has_grenade {
            out_events.push(Event::ActionRejected {
                fighter: actor_id,
                reason: ActionRejection::GrenadeSpent,
            });
            return;
        }
        let drag_length = direction.length();
        if drag_length < self.config.grenade.min_drag {
            return;
        }

        if let Some(actor) = self.fighter_mut(actor_id) {
            actor.has_grenade = false;
            let position = actor.pose.position();
            actor.pose = Pose::new(position, yaw_toward(position, position.plus(direction)));
        }
        out_events.push(Event::GrenadeThrown { fighter: actor_id });
        self.tasks.schedule(
            self.clock.saturating_add(self.config.grenade.release_delay),
            TaskKind::ReleaseGrenade {
                thrower: actor_id,
                drag_length,
            },
        );
        self.set_phase(GamePhase::TurnIdle, out_events);
    }

    fn release_grenade(
        &mut self,
        fire_at: Duration,
        thrower: FighterId,
        drag_length: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(pose) = self
            .fighter(thrower)
            .filter(|fighter| !fighter.dead)
            .map(|fighter| fighter.pose)
        else {
            return;
        };

        let velocity = combat::release_velocity(&self.config.grenade, pose.forward(), drag_length);
        let origin = pose
            .position()
            .plus(WorldPoint::new(0.0, GRENADE_RELEASE_HEIGHT, 0.0));
        let grenade = GrenadeId::new(self.next_grenade_id);
        self.next_grenade_id += 1;
        out_events.push(Event::GrenadeReleased {
            grenade,
            pose: Pose::new(origin, pose.yaw()),
            velocity,
        });
        self.tasks.schedule(
            fire_at.saturating_add(self.config.grenade.fuse),
            TaskKind::DetonateGrenade {
                grenade,
                origin,
                velocity,
                released_at: fire_at,
            },
        );
    }

    fn detonate_grenade(
        &mut self,
        grenade: GrenadeId,
        origin: WorldPoint,
        velocity: WorldPoint,
        elapsed: f32,
        out_events: &mut Vec<Event>,
    ) {
        let flight =
            combat::ballistic_position(origin, velocity, self.config.grenade.gravity, elapsed);
        // Projectiles come to rest on the play plane rather than falling
        // through it.
        let ground = origin.y() - GRENADE_RELEASE_HEIGHT;
        let position = WorldPoint::new(flight.x(), flight.y().max(ground), flight.z());
        out_events.push(Event::GrenadeExploded { grenade, position });

        let radius = self.config.grenade.explosion_radius;
        let damage = self.config.grenade.damage;
        let victims: Vec<FighterId> = self
            .fighters
            .iter()
            .filter(|fighter| {
                !fighter.dead && fighter.pose.position().distance_to(position) <= radius
            })
            .map(|fighter| fighter.id)
            .collect();
        for victim in victims {
            self.damage_fighter(victim, damage, out_events);
        }
        self.check_victory(out_events);
        self.retire_dead_actor(out_events);
    }

    /// Hands the turn over when a detonation killed the acting fighter and
    /// the match is still running.
    fn retire_dead_actor(&mut self, out_events: &mut Vec<Event>) {
        if !self.phase.is_turn_phase() {
            return;
        }
        let Some((team, actor_id)) = self.scheduler.active() else {
            return;
        };
        if !self.fighter(actor_id).map_or(false, |actor| actor.dead) {
            return;
        }

        self.movement = None;
        out_events.push(Event::TurnEnded { team });
        let roster = self.roster_entries();
        let (next_team, next_fighter) = self.scheduler.advance(&roster);
        self.begin_turn(next_team, next_fighter, out_events);
        self.set_phase(GamePhase::TurnIdle, out_events);
    }

    fn damage_fighter(&mut self, id: FighterId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(fighter) = self.fighter_mut(id) else {
            return;
        };
        if fighter.dead {
            return;
        }
        fighter.health = (fighter.health - amount).max(0.0);
        let health = fighter.health;
        let died = health == 0.0;
        if died {
            fighter.dead = true;
            fighter.selection = SelectionState::None;
            fighter.target = None;
        }
        out_events.push(Event::FighterDamaged {
            fighter: id,
            amount,
            health,
        });
        if died {
            out_events.push(Event::FighterDied { fighter: id });
            let mut was_targeted = false;
            for other in self.fighters.iter_mut() {
                if other.target == Some(id) {
                    other.target = None;
                    was_targeted = true;
                }
            }
            if was_targeted {
                out_events.push(Event::TargetCleared { target: id });
            }
        }
    }

    fn check_victory(&mut self, out_events: &mut Vec<Event>) {
        if !self.phase.is_turn_phase() {
            return;
        }
        let red_alive = self.team_alive(Team::Red);
        let blue_alive = self.team_alive(Team::Blue);
        let winner = match (red_alive, blue_alive) {
            (true, true) => return,
            (true, false) => Team::Red,
            (false, true) => Team::Blue,
            // One detonation emptied both rosters; the team holding the
            // turn takes the match.
            (false, false) => match self.scheduler.active() {
                Some((team, _)) => team,
                None => Team::Blue,
            },
        };
        self.movement = None;
        out_events.push(Event::MatchEnded { winner });
        self.set_phase(GamePhase::GameEnd, out_events);
    }

    fn move_to(&mut self, destination: WorldPoint, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnMovement {
            return;
        }
        let Some((_, actor_id)) = self.scheduler.active() else {
            return;
        };
        let Some((position, distance_moved)) = self
            .fighter(actor_id)
            .filter(|actor| !actor.dead)
            .map(|actor| (actor.pose.position(), actor.distance_moved))
        else {
            return;
        };

        if distance_moved >= self.config.movement.budget {
            out_events.push(Event::MovementStopped {
                fighter: actor_id,
                reason: MovementStop::BudgetExhausted,
            });
            self.set_phase(GamePhase::TurnIdle, out_events);
            return;
        }
        if position.horizontal_distance_to(destination) <= self.config.movement.arrival_epsilon {
            out_events.push(Event::MovementStopped {
                fighter: actor_id,
                reason: MovementStop::Arrived,
            });
            self.set_phase(GamePhase::TurnIdle, out_events);
            return;
        }

        if let Some(actor) = self.fighter_mut(actor_id) {
            actor.pose = Pose::new(position, yaw_toward(position, destination));
        }
        self.movement = Some(MovementPlan {
            fighter: actor_id,
            destination,
        });
    }

    fn step_movement(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::TurnMovement {
            return;
        }
        let Some(plan) = self.movement else {
            return;
        };
        let Some((position, distance_moved)) = self
            .fighter(plan.fighter)
            .filter(|actor| !actor.dead)
            .map(|actor| (actor.pose.position(), actor.distance_moved))
        else {
            self.movement = None;
            return;
        };

        let tuning = self.config.movement;
        let remaining = position.horizontal_distance_to(plan.destination);
        let budget_left = (tuning.budget - distance_moved).max(0.0);
        let step = (tuning.walk_speed * dt.as_secs_f32())
            .min(remaining)
            .min(budget_left);
        let yaw = yaw_toward(position, plan.destination);
        let heading = WorldPoint::new(yaw.cos(), 0.0, yaw.sin());

        let probe = position.plus(heading.scaled((step * tuning.lookahead).max(step)));
        if self.obstructed(position, probe) {
            self.movement = None;
            out_events.push(Event::MovementStopped {
                fighter: plan.fighter,
                reason: MovementStop::Obstructed,
            });
            self.set_phase(GamePhase::TurnIdle, out_events);
            return;
        }

        let next = position.plus(heading.scaled(step));
        if let Some(actor) = self.fighter_mut(plan.fighter) {
            actor.pose = Pose::new(next, yaw);
            actor.distance_moved += step;
        }

        let arrived = next.horizontal_distance_to(plan.destination) <= tuning.arrival_epsilon;
        let exhausted = distance_moved + step >= tuning.budget;
        if arrived || exhausted {
            self.movement = None;
            let reason = if arrived {
                MovementStop::Arrived
            } else {
                MovementStop::BudgetExhausted
            };
            out_events.push(Event::MovementStopped {
                fighter: plan.fighter,
                reason,
            });
            self.set_phase(GamePhase::TurnIdle, out_events);
        }
    }

    fn end_turn(&mut self, out_events: &mut Vec<Event>) {
        if !self.phase.is_turn_phase() {
            return;
        }
        let Some((team, actor_id)) = self.scheduler.active() else {
            return;
        };
        self.movement = None;

        if let Some(target) = self.fighter(actor_id).and_then(|actor| actor.target) {
            if let Some(released) = self.fighter_mut(target) {
                if released.selection == SelectionState::Targeted {
                    released.selection = SelectionState::None;
                }
            }
            if let Some(actor) = self.fighter_mut(actor_id) {
                actor.target = None;
            }
            out_events.push(Event::TargetCleared { target });
        }
        out_events.push(Event::TurnEnded { team });

        let roster = self.roster_entries();
        let (next_team, next_fighter) = self.scheduler.advance(&roster);
        self.begin_turn(next_team, next_fighter, out_events);
        self.set_phase(GamePhase::TurnIdle, out_events);
    }

    fn sync_anchor_poses(&mut self, poses: Vec<AnchorPose>) {
        for update in poses {
            let delta = match self
                .known_anchors
                .iter_mut()
                .find(|known| known.id == update.anchor)
            {
                Some(known) => {
                    let delta = update.pose.position().minus(known.position);
                    known.position = update.pose.position();
                    delta
                }
                None => {
                    self.known_anchors.push(KnownAnchor {
                        id: update.anchor,
                        position: update.pose.position(),
                    });
                    WorldPoint::ORIGIN
                }
            };

            for candidate in self.plane_candidates.iter_mut() {
                if candidate.anchor == update.anchor {
                    candidate.pose = update.pose;
                }
            }
            if delta == WorldPoint::ORIGIN {
                continue;
            }
            for fighter in self.fighters.iter_mut() {
                if fighter.anchor == Some(update.anchor) {
                    fighter.pose = Pose::new(
                        fighter.pose.position().plus(delta),
                        fighter.pose.yaw(),
                    );
                }
            }
            for obstacle in self.obstacles.iter_mut() {
                if obstacle.anchor == Some(update.anchor) {
                    obstacle.pose = Pose::new(
                        obstacle.pose.position().plus(delta),
                        obstacle.pose.yaw(),
                    );
                }
            }
        }
    }

    fn clear_anchor_binding(&mut self, anchor: AnchorId, out_events: &mut Vec<Event>) {
        let mut cleared = false;
        for fighter in self.fighters.iter_mut() {
            if fighter.anchor == Some(anchor) {
                fighter.anchor = None;
                cleared = true;
            }
        }
        for obstacle in self.obstacles.iter_mut() {
            if obstacle.anchor == Some(anchor) {
                obstacle.anchor = None;
                cleared = true;
            }
        }
        self.known_anchors.retain(|known| known.id != anchor);
        if cleared {
            out_events.push(Event::AnchorBindingCleared { anchor });
        }
    }

    fn reset_tracking(&mut self, out_events: &mut Vec<Event>) {
        let removed: Vec<(PlaneCandidateId, AnchorId)> = self
            .plane_candidates
            .drain(..)
            .map(|candidate| (candidate.id, candidate.anchor))
            .collect();
        for (id, anchor) in removed {
            out_events.push(Event::PlaneCandidateDespawned { id, anchor });
        }
        self.selected_plane = None;
        self.known_anchors.clear();
        for fighter in self.fighters.iter_mut() {
            fighter.anchor = None;
        }
        for obstacle in self.obstacles.iter_mut() {
            obstacle.anchor = None;
        }
        out_events.push(Event::TrackingReset);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => {
            if world.phase == GamePhase::Menu {
                world.set_phase(GamePhase::PlaneSetup, out_events);
            }
        }
        Command::ReturnToMenu => {
            if world.phase != GamePhase::Menu {
                world.reset_match();
                out_events.push(Event::MatchReset);
                world.set_phase(GamePhase::Menu, out_events);
            }
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            let due = world.tasks.drain_due(world.clock);
            for task in due {
                match task.kind {
                    TaskKind::ReleaseGrenade {
                        thrower,
                        drag_length,
                    } => world.release_grenade(task.fire_at, thrower, drag_length, out_events),
                    TaskKind::DetonateGrenade {
                        grenade,
                        origin,
                        velocity,
                        released_at,
                    } => {
                        let elapsed = task.fire_at.saturating_sub(released_at).as_secs_f32();
                        world.detonate_grenade(grenade, origin, velocity, elapsed, out_events);
                    }
                }
            }
            world.step_movement(dt, out_events);
            world.check_victory(out_events);
        }
        Command::SelectPlane { anchor } => world.select_plane(anchor, out_events),
        Command::FinishObstacleSetup => {
            if world.phase == GamePhase::ObstacleSetup {
                world.set_phase(GamePhase::PawnSetup, out_events);
            }
        }
        Command::SpawnObstacle {
            anchor,
            pose,
            origin,
        } => world.spawn_obstacle(anchor, pose, origin, out_events),
        Command::SpawnFighter { team, anchor, pose } => {
            world.spawn_fighter(team, anchor, pose, out_events);
        }
        Command::ChooseAction { action } => world.choose_action(action, out_events),
        Command::SelectTarget { target } => world.select_target(target, out_events),
        Command::Shoot => world.shoot(out_events),
        Command::ThrowGrenade { direction } => world.throw_grenade(direction, out_events),
        Command::MoveTo { destination } => world.move_to(destination, out_events),
        Command::EndTurn => world.end_turn(out_events),
        Command::SpawnPlaneCandidate {
            anchor,
            color,
            pose,
        } => world.spawn_plane_candidate(anchor, color, pose, out_events),
        Command::DespawnPlaneCandidate { anchor } => {
            world.despawn_plane_candidate(anchor, out_events);
        }
        Command::SyncAnchorPoses { poses } => world.sync_anchor_poses(poses),
        Command::ClearAnchorBinding { anchor } => world.clear_anchor_binding(anchor, out_events),
        Command::ResetTracking => world.reset_tracking(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use ar_skirmish_core::{
        AnchorId, FighterId, FighterSnapshot, FighterView, GamePhase, ObstacleSnapshot,
        ObstacleView, PlaneCandidateSnapshot, PlaneCandidateView, Team, WorldPoint,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Phase the match is currently in.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Anchor of the chosen play plane, once one has been selected.
    #[must_use]
    pub fn selected_plane(world: &World) -> Option<AnchorId> {
        world.selected_plane
    }

    /// Team and fighter currently holding the turn, if a match is underway.
    #[must_use]
    pub fn active_turn(world: &World) -> Option<(Team, FighterId)> {
        world.scheduler.active()
    }

    /// Total simulated time accumulated since the match started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Reports whether the ground-plane segment between the two points
    /// crosses an obstacle footprint.
    #[must_use]
    pub fn obstructed(world: &World, from: WorldPoint, to: WorldPoint) -> bool {
        world.obstructed(from, to)
    }

    /// Captures a read-only view of the fighters in the match.
    #[must_use]
    pub fn fighter_view(world: &World) -> FighterView {
        let snapshots: Vec<FighterSnapshot> = world
            .fighters
            .iter()
            .map(|fighter| FighterSnapshot {
                id: fighter.id,
                team: fighter.team,
                pose: fighter.pose,
                health: fighter.health,
                dead: fighter.dead,
                selection: fighter.selection,
                has_shot: fighter.has_shot,
                has_grenade: fighter.has_grenade,
                distance_moved: fighter.distance_moved,
                target: fighter.target,
                anchor: fighter.anchor,
            })
            .collect();
        FighterView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the obstacles in the match.
    #[must_use]
    pub fn obstacle_view(world: &World) -> ObstacleView {
        let snapshots: Vec<ObstacleSnapshot> = world
            .obstacles
            .iter()
            .map(|obstacle| ObstacleSnapshot {
                id: obstacle.id,
                pose: obstacle.pose,
                radius: obstacle.radius,
                origin: obstacle.origin,
                anchor: obstacle.anchor,
            })
            .collect();
        ObstacleView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the plane candidates awaiting selection.
    #[must_use]
    pub fn plane_candidate_view(world: &World) -> PlaneCandidateView {
        let snapshots: Vec<PlaneCandidateSnapshot> = world
            .plane_candidates
            .iter()
            .map(|candidate| PlaneCandidateSnapshot {
                id: candidate.id,
                anchor: candidate.anchor,
                color: candidate.color,
                pose: candidate.pose,
            })
            .collect();
        PlaneCandidateView::from_snapshots(snapshots)
    }
}

#[derive(Clone, Debug)]
struct Fighter {
    id: FighterId,
    team: Team,
    pose: Pose,
    health: f32,
    dead: bool,
    selection: SelectionState,
    has_shot: bool,
    has_grenade: bool,
    distance_moved: f32,
    target: Option<FighterId>,
    anchor: Option<AnchorId>,
}

#[derive(Clone, Debug)]
struct Obstacle {
    id: ObstacleId,
    pose: Pose,
    radius: f32,
    origin: ObstacleOrigin,
    anchor: Option<AnchorId>,
}

#[derive(Clone, Debug)]
struct PlaneCandidate {
    id: PlaneCandidateId,
    anchor: AnchorId,
    color: PlaneColor,
    pose: Pose,
}

#[derive(Clone, Copy, Debug)]
struct KnownAnchor {
    id: AnchorId,
    position: WorldPoint,
}

#[derive(Clone, Copy, Debug)]
struct MovementPlan {
    fighter: FighterId,
    destination: WorldPoint,
}
