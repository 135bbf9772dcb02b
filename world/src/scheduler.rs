//! Round-robin turn rotation across the two rosters.

use ar_skirmish_core::{FighterId, Team};

/// Minimal roster line used to pick the next acting fighter.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RosterEntry {
    pub(crate) id: FighterId,
    pub(crate) team: Team,
    pub(crate) dead: bool,
}

/// Rotates turns between teams, cycling through each roster in id order and
/// skipping dead fighters.
#[derive(Debug)]
pub(crate) struct TurnScheduler {
    active: Option<(Team, FighterId)>,
    red_cursor: usize,
    blue_cursor: usize,
}

impl TurnScheduler {
    pub(crate) fn new() -> Self {
        Self {
            active: None,
            red_cursor: 0,
            blue_cursor: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.active = None;
        self.red_cursor = 0;
        self.blue_cursor = 0;
    }

    /// Team and fighter currently holding the turn, if a match is underway.
    pub(crate) fn active(&self) -> Option<(Team, FighterId)> {
        self.active
    }

    /// Begins the first turn of the match with the red team.
    ///
    /// # Panics
    ///
    /// Panics when the red roster holds no living fighter; the world only
    /// starts turns after both rosters fill, so this cannot happen.
    pub(crate) fn start(&mut self, roster: &[RosterEntry]) -> (Team, FighterId) {
        self.pick(Team::Red, roster)
    }

    /// Hands the turn to the opposing team and selects its next living
    /// fighter, scanning at most one full pass of that roster.
    ///
    /// # Panics
    ///
    /// Panics when the opposing roster holds no living fighter. The world
    /// checks for victory after every death, so a turn is never handed to an
    /// eliminated team.
    pub(crate) fn advance(&mut self, roster: &[RosterEntry]) -> (Team, FighterId) {
        let team = match self.active {
            Some((team, _)) => team.opponent(),
            None => Team::Red,
        };
        self.pick(team, roster)
    }

    fn pick(&mut self, team: Team, roster: &[RosterEntry]) -> (Team, FighterId) {
        let members: Vec<&RosterEntry> = roster
            .iter()
            .filter(|entry| entry.team == team)
            .collect();
        assert!(
            !members.is_empty(),
            "turn handed to a team with an empty roster"
        );

        let cursor = self.cursor_mut(team);
        let start = *cursor % members.len();
        for offset in 0..members.len() {
            let index = (start + offset) % members.len();
            let entry = members[index];
            if !entry.dead {
                *cursor = index + 1;
                self.active = Some((team, entry.id));
                return (team, entry.id);
            }
        }
        panic!("turn handed to a team with no living fighter");
    }

    fn cursor_mut(&mut self, team: Team) -> &mut usize {
        match team {
            Team::Red => &mut self.red_cursor,
            Team::Blue => &mut self.blue_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RosterEntry, TurnScheduler};
    use ar_skirmish_core::{FighterId, Team};

    fn roster() -> Vec<RosterEntry> {
        (0..6)
            .map(|index| RosterEntry {
                id: FighterId::new(index),
                team: if index % 2 == 0 { Team::Red } else { Team::Blue },
                dead: false,
            })
            .collect()
    }

    #[test]
    fn first_turn_goes_to_the_red_team() {
        let mut scheduler = TurnScheduler::new();
        let (team, fighter) = scheduler.start(&roster());
        assert_eq!(team, Team::Red);
        assert_eq!(fighter, FighterId::new(0));
    }

    #[test]
    fn turns_alternate_between_teams_and_cycle_rosters() {
        let mut scheduler = TurnScheduler::new();
        let roster = roster();
        let _ = scheduler.start(&roster);

        let turns: Vec<(Team, FighterId)> =
            (0..4).map(|_| scheduler.advance(&roster)).collect();
        assert_eq!(
            turns,
            vec![
                (Team::Blue, FighterId::new(1)),
                (Team::Red, FighterId::new(2)),
                (Team::Blue, FighterId::new(3)),
                (Team::Red, FighterId::new(4)),
            ]
        );
    }

    #[test]
    fn rotation_wraps_back_to_the_roster_head() {
        let mut scheduler = TurnScheduler::new();
        let roster = roster();
        let _ = scheduler.start(&roster);
        for _ in 0..5 {
            let _ = scheduler.advance(&roster);
        }
        assert_eq!(scheduler.advance(&roster), (Team::Red, FighterId::new(0)));
    }

    #[test]
    fn dead_fighters_are_skipped() {
        let mut scheduler = TurnScheduler::new();
        let mut roster = roster();
        roster[2].dead = true;

        let _ = scheduler.start(&roster);
        let _ = scheduler.advance(&roster);
        assert_eq!(scheduler.advance(&roster), (Team::Red, FighterId::new(4)));
    }

    #[test]
    fn a_lone_survivor_keeps_receiving_turns() {
        let mut scheduler = TurnScheduler::new();
        let mut roster = roster();
        roster[0].dead = true;
        roster[4].dead = true;

        let _ = scheduler.start(&roster);
        let _ = scheduler.advance(&roster);
        assert_eq!(scheduler.advance(&roster), (Team::Red, FighterId::new(2)));
        let _ = scheduler.advance(&roster);
        assert_eq!(scheduler.advance(&roster), (Team::Red, FighterId::new(2)));
    }

    #[test]
    #[should_panic(expected = "no living fighter")]
    fn handing_a_turn_to_an_eliminated_team_panics() {
        let mut scheduler = TurnScheduler::new();
        let mut roster = roster();
        roster[1].dead = true;
        roster[3].dead = true;
        roster[5].dead = true;

        let _ = scheduler.start(&roster);
        let _ = scheduler.advance(&roster);
    }
}
