//! Scoreboard objectives, scores, display slots and teams.

use std::collections::{BTreeSet, HashMap};

use mc_sync_proto::packets::display_scoreboard::DisplayScoreboard;
use mc_sync_proto::packets::scoreboard_objective::{ObjectiveAction, ScoreboardObjective};
use mc_sync_proto::packets::teams::{TeamAction, TeamInfo, Teams};
use mc_sync_proto::packets::update_score::UpdateScore;
use tracing::warn;

use crate::error::ReplicaError;
use crate::registry::DESYNC_TARGET;

/// List, sidebar, below-name, then one sidebar per team color.
pub const DISPLAY_SLOTS: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub name: String,
    pub display_name: String,
    pub render_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub info: TeamInfo,
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    objectives: HashMap<String, Objective>,
    /// (entry, objective) to value.
    scores: HashMap<(String, String), i32>,
    display: [Option<String>; DISPLAY_SLOTS],
    teams: HashMap<String, Team>,
    /// Entry name to team name.
    memberships: HashMap<String, String>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objective(&self, name: &str) -> Option<&Objective> {
        self.objectives.get(name)
    }

    pub fn score(&self, entry: &str, objective: &str) -> Option<i32> {
        self.scores
            .get(&(entry.to_string(), objective.to_string()))
            .copied()
    }

    pub fn displayed(&self, slot: usize) -> Option<&str> {
        self.display.get(slot).and_then(|s| s.as_deref())
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn team_of(&self, entry: &str) -> Option<&str> {
        self.memberships.get(entry).map(String::as_str)
    }

    pub fn apply_objective(&mut self, msg: &ScoreboardObjective) -> Result<(), ReplicaError> {
        match &msg.action {
            ObjectiveAction::Create {
                display_name,
                render_type,
            } => {
                if self.objectives.contains_key(&msg.name) {
                    warn!(target: DESYNC_TARGET, "Objective '{}' created twice", msg.name);
                }
                self.objectives.insert(
                    msg.name.clone(),
                    Objective {
                        name: msg.name.clone(),
                        display_name: display_name.clone(),
                        render_type: render_type.clone(),
                    },
                );
            }
            ObjectiveAction::Remove => {
                if self.objectives.remove(&msg.name).is_none() {
                    return Err(ReplicaError::UnknownObjective(msg.name.clone()));
                }
                self.scores.retain(|(_, objective), _| objective != &msg.name);
                for slot in self.display.iter_mut() {
                    if slot.as_deref() == Some(msg.name.as_str()) {
                        *slot = None;
                    }
                }
            }
            ObjectiveAction::Update {
                display_name,
                render_type,
            } => {
                let objective = self
                    .objectives
                    .get_mut(&msg.name)
                    .ok_or_else(|| ReplicaError::UnknownObjective(msg.name.clone()))?;
                objective.display_name = display_name.clone();
                objective.render_type = render_type.clone();
            }
        }
        Ok(())
    }

    /// A missing value removes the score; an empty objective name removes
    /// the entry from every objective.
    pub fn apply_score(&mut self, msg: &UpdateScore) -> Result<(), ReplicaError> {
        match msg.value {
            Some(value) => {
                if !self.objectives.contains_key(&msg.objective) {
                    return Err(ReplicaError::UnknownObjective(msg.objective.clone()));
                }
                self.scores
                    .insert((msg.entry.clone(), msg.objective.clone()), value);
            }
            None if msg.objective.is_empty() => {
                self.scores.retain(|(entry, _), _| entry != &msg.entry);
            }
            None => {
                if self.objectives.contains_key(&msg.objective) {
                    self.scores
                        .remove(&(msg.entry.clone(), msg.objective.clone()));
                }
            }
        }
        Ok(())
    }

    /// An empty or unknown objective name clears the slot.
    pub fn apply_display(&mut self, msg: &DisplayScoreboard) {
        let Some(slot) = usize::try_from(msg.position)
            .ok()
            .and_then(|p| self.display.get_mut(p))
        else {
            return;
        };
        *slot = (!msg.objective.is_empty() && self.objectives.contains_key(&msg.objective))
            .then(|| msg.objective.clone());
    }

    pub fn apply_team(&mut self, msg: &Teams) -> Result<(), ReplicaError> {
        match &msg.action {
            TeamAction::Create { info, players } => {
                if self.teams.contains_key(&msg.name) {
                    warn!(target: DESYNC_TARGET, "Team '{}' created twice", msg.name);
                }
                self.teams.insert(
                    msg.name.clone(),
                    Team {
                        name: msg.name.clone(),
                        info: info.clone(),
                        members: BTreeSet::new(),
                    },
                );
                for player in players {
                    self.join_team(player, &msg.name);
                }
            }
            TeamAction::Remove => {
                let team = self
                    .teams
                    .remove(&msg.name)
                    .ok_or_else(|| ReplicaError::UnknownTeam(msg.name.clone()))?;
                for member in team.members {
                    self.memberships.remove(&member);
                }
            }
            TeamAction::UpdateInfo(info) => {
                let team = self
                    .teams
                    .get_mut(&msg.name)
                    .ok_or_else(|| ReplicaError::UnknownTeam(msg.name.clone()))?;
                team.info = info.clone();
            }
            TeamAction::AddPlayers(players) => {
                if !self.teams.contains_key(&msg.name) {
                    return Err(ReplicaError::UnknownTeam(msg.name.clone()));
                }
                for player in players {
                    self.join_team(player, &msg.name);
                }
            }
            TeamAction::RemovePlayers(players) => {
                let team = self
                    .teams
                    .get_mut(&msg.name)
                    .ok_or_else(|| ReplicaError::UnknownTeam(msg.name.clone()))?;
                for player in players {
                    if team.members.remove(player) {
                        self.memberships.remove(player);
                    }
                }
            }
        }
        Ok(())
    }

    /// An entry belongs to at most one team.
    fn join_team(&mut self, entry: &str, team: &str) {
        if let Some(previous) = self.memberships.insert(entry.to_string(), team.to_string()) {
            if let Some(old) = self.teams.get_mut(&previous) {
                old.members.remove(entry);
            }
        }
        if let Some(t) = self.teams.get_mut(team) {
            t.members.insert(entry.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> ScoreboardObjective {
        ScoreboardObjective {
            name: name.into(),
            action: ObjectiveAction::Create {
                display_name: name.to_uppercase(),
                render_type: "integer".into(),
            },
        }
    }

    fn info() -> TeamInfo {
        TeamInfo {
            display_name: "Red".into(),
            prefix: "[R]".into(),
            suffix: String::new(),
            friendly_flags: 1,
            name_tag_visibility: "always".into(),
            color: 12,
        }
    }

    #[test]
    fn objective_lifecycle() {
        let mut sb = Scoreboard::new();
        sb.apply_objective(&create("kills")).unwrap();
        sb.apply_score(&UpdateScore {
            entry: "alice".into(),
            objective: "kills".into(),
            value: Some(3),
        })
        .unwrap();
        sb.apply_display(&DisplayScoreboard {
            position: 1,
            objective: "kills".into(),
        });
        assert_eq!(sb.score("alice", "kills"), Some(3));
        assert_eq!(sb.displayed(1), Some("kills"));

        sb.apply_objective(&ScoreboardObjective {
            name: "kills".into(),
            action: ObjectiveAction::Remove,
        })
        .unwrap();
        assert!(sb.objective("kills").is_none());
        assert_eq!(sb.score("alice", "kills"), None);
        assert_eq!(sb.displayed(1), None);
    }

    #[test]
    fn score_for_unknown_objective_is_rejected() {
        let mut sb = Scoreboard::new();
        let err = sb
            .apply_score(&UpdateScore {
                entry: "alice".into(),
                objective: "nope".into(),
                value: Some(1),
            })
            .unwrap_err();
        assert!(matches!(err, ReplicaError::UnknownObjective(_)));
    }

    #[test]
    fn empty_objective_removes_entry_everywhere() {
        let mut sb = Scoreboard::new();
        sb.apply_objective(&create("a")).unwrap();
        sb.apply_objective(&create("b")).unwrap();
        for objective in ["a", "b"] {
            sb.apply_score(&UpdateScore {
                entry: "bob".into(),
                objective: objective.into(),
                value: Some(1),
            })
            .unwrap();
        }
        sb.apply_score(&UpdateScore {
            entry: "bob".into(),
            objective: String::new(),
            value: None,
        })
        .unwrap();
        assert_eq!(sb.score("bob", "a"), None);
        assert_eq!(sb.score("bob", "b"), None);
    }

    #[test]
    fn teams_move_members() {
        let mut sb = Scoreboard::new();
        sb.apply_team(&Teams {
            name: "red".into(),
            action: TeamAction::Create {
                info: info(),
                players: vec!["alice".into()],
            },
        })
        .unwrap();
        sb.apply_team(&Teams {
            name: "blue".into(),
            action: TeamAction::Create {
                info: info(),
                players: vec![],
            },
        })
        .unwrap();
        sb.apply_team(&Teams {
            name: "blue".into(),
            action: TeamAction::AddPlayers(vec!["alice".into()]),
        })
        .unwrap();
        assert_eq!(sb.team_of("alice"), Some("blue"));
        assert!(sb.team("red").is_some_and(|t| t.members.is_empty()));

        sb.apply_team(&Teams {
            name: "blue".into(),
            action: TeamAction::Remove,
        })
        .unwrap();
        assert_eq!(sb.team_of("alice"), None);
    }

    #[test]
    fn unknown_team_update_is_rejected() {
        let mut sb = Scoreboard::new();
        let err = sb
            .apply_team(&Teams {
                name: "ghost".into(),
                action: TeamAction::UpdateInfo(info()),
            })
            .unwrap_err();
        assert!(matches!(err, ReplicaError::UnknownTeam(_)));
    }
}
