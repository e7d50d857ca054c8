use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub type TeamId = i64;
pub type DivisionId = i64;
pub type EventId = i64;
pub type MatchId = i64;

/// Competition team, keyed by its stable id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub number: String,
}

impl Team {
    /// Empty alliance slot
    pub const NONE: Team = Team {
        id: 0,
        number: String::new(),
    };

    pub fn new(id: TeamId, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.id == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub fn opponent(self) -> Self {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    Practice,
    Qualification,
    QuarterFinals,
    SemiFinals,
    Finals,
    RoundOf16,
    TopN,
}

impl Round {
    /// Map the numeric round code used by the competition data service
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Round::Practice),
            2 => Some(Round::Qualification),
            3 => Some(Round::QuarterFinals),
            4 => Some(Round::SemiFinals),
            5 => Some(Round::Finals),
            6 => Some(Round::RoundOf16),
            7 => Some(Round::TopN),
            _ => None,
        }
    }

    pub fn is_elimination(&self) -> bool {
        !matches!(self, Round::Practice | Round::Qualification)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Round::Practice => "practice",
            Round::Qualification => "qualification",
            Round::QuarterFinals => "quarterfinals",
            Round::SemiFinals => "semifinals",
            Round::Finals => "finals",
            Round::RoundOf16 => "round_of_16",
            Round::TopN => "top_n",
        }
    }
}

impl std::str::FromStr for Round {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "practice" => Ok(Round::Practice),
            "qualification" | "qual" => Ok(Round::Qualification),
            "quarterfinals" | "qf" => Ok(Round::QuarterFinals),
            "semifinals" | "sf" => Ok(Round::SemiFinals),
            "finals" | "f" => Ok(Round::Finals),
            "round_of_16" | "r16" => Ok(Round::RoundOf16),
            "top_n" => Ok(Round::TopN),
            other => Err(format!("unknown round: {}", other)),
        }
    }
}

/// Winner of a match, by comparing two alliance scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Red,
    Blue,
    Tie,
}

impl Outcome {
    pub fn from_scores(red_score: i64, blue_score: i64) -> Self {
        if red_score > blue_score {
            Outcome::Red
        } else if blue_score > red_score {
            Outcome::Blue
        } else {
            Outcome::Tie
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub event_id: EventId,
    pub division_id: DivisionId,
    pub round: Round,
    pub instance: i64,
    pub number: i64,
    pub name: String,
    pub red: [Team; 2],
    pub blue: [Team; 2],
    #[serde(default)]
    pub red_score: i64,
    #[serde(default)]
    pub blue_score: i64,
    #[serde(default)]
    pub scheduled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted: bool,
    #[serde(default)]
    pub predicted_red_score: i64,
    #[serde(default)]
    pub predicted_blue_score: i64,
}

impl Match {
    pub fn new(
        id: MatchId,
        division_id: DivisionId,
        round: Round,
        red: [Team; 2],
        blue: [Team; 2],
    ) -> Self {
        Self {
            id,
            event_id: 0,
            division_id,
            round,
            instance: 1,
            number: id,
            name: String::new(),
            red,
            blue,
            red_score: 0,
            blue_score: 0,
            scheduled: None,
            started: None,
            predicted: false,
            predicted_red_score: 0,
            predicted_blue_score: 0,
        }
    }

    pub fn with_scores(mut self, red_score: i64, blue_score: i64) -> Self {
        self.red_score = red_score;
        self.blue_score = blue_score;
        self
    }

    pub fn with_started(mut self, started: DateTime<Utc>) -> Self {
        self.started = Some(started);
        self
    }

    pub fn alliance(&self, alliance: Alliance) -> &[Team; 2] {
        match alliance {
            Alliance::Red => &self.red,
            Alliance::Blue => &self.blue,
        }
    }

    pub fn score(&self, alliance: Alliance) -> i64 {
        match alliance {
            Alliance::Red => self.red_score,
            Alliance::Blue => self.blue_score,
        }
    }

    pub fn predicted_score(&self, alliance: Alliance) -> i64 {
        match alliance {
            Alliance::Red => self.predicted_red_score,
            Alliance::Blue => self.predicted_blue_score,
        }
    }

    /// Teams in occupied slots of both alliances
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.red.iter().chain(self.blue.iter()).filter(|t| !t.is_none())
    }

    /// Whether a real score has been recorded
    pub fn is_scored(&self) -> bool {
        self.red_score != 0 || self.blue_score != 0
    }

    /// A match counts as completed once it has a score, or once it started
    /// more than `threshold` before `now`.
    pub fn completed_at(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        if self.is_scored() {
            return true;
        }

        match self.started {
            Some(started) => now.signed_duration_since(started) > threshold,
            None => false,
        }
    }

    pub fn completed(&self, threshold: Duration) -> bool {
        self.completed_at(Utc::now(), threshold)
    }

    pub fn winner(&self) -> Outcome {
        Outcome::from_scores(self.red_score, self.blue_score)
    }

    pub fn predicted_winner(&self) -> Outcome {
        Outcome::from_scores(self.predicted_red_score, self.predicted_blue_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
}

impl Division {
    pub fn new(id: DivisionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Event with its divisions and the full match corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub sku: String,
    pub name: String,
    pub divisions: Vec<Division>,
    pub matches: Vec<Match>,
}

impl Event {
    pub fn division(&self, division_id: DivisionId) -> Option<&Division> {
        self.divisions.iter().find(|d| d.id == division_id)
    }

    pub fn matches_for(&self, division_id: DivisionId) -> Vec<Match> {
        self.matches
            .iter()
            .filter(|m| m.division_id == division_id)
            .cloned()
            .collect()
    }
}
