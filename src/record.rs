use crate::constants::*;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("unparseable timestamp {0:?}")]
    Timestamp(String),
    #[error("outcome {0:?} is not one of 0, 0.5, 1")]
    Outcome(String),
    #[error("outcomes {a} and {b} do not sum to 1")]
    Sum { a: Outcome, b: Outcome },
    #[error("unknown result code {0:?}, expected A, B or remis")]
    UnknownCode(String),
}

/// A decoding failure located in a match log.
#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {error}")]
pub struct LogError {
    pub line: usize,
    pub error: RecordError,
}

/// One player's result in a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

impl Outcome {
    pub fn score(self) -> f64 {
        match self {
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
            Outcome::Win => 1.0,
        }
    }

    pub fn half_points(self) -> u32 {
        match self {
            Outcome::Loss => 0,
            Outcome::Draw => 1,
            Outcome::Win => 2,
        }
    }

    pub fn from_score(score: f64) -> Option<Self> {
        if score == 0.0 {
            Some(Outcome::Loss)
        } else if score == 0.5 {
            Some(Outcome::Draw)
        } else if score == 1.0 {
            Some(Outcome::Win)
        } else {
            None
        }
    }
}

impl FromStr for Outcome {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<f64>()
            .ok()
            .and_then(Outcome::from_score)
            .ok_or_else(|| RecordError::Outcome(s.to_string()))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Loss => "0",
            Outcome::Draw => "0.5",
            Outcome::Win => "1",
        })
    }
}

/// Result as submitted by a player: who won, or a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    A,
    B,
    Draw,
}

impl ResultCode {
    pub fn outcomes(self) -> (Outcome, Outcome) {
        match self {
            ResultCode::A => (Outcome::Win, Outcome::Loss),
            ResultCode::B => (Outcome::Loss, Outcome::Win),
            ResultCode::Draw => (Outcome::Draw, Outcome::Draw),
        }
    }
}

impl FromStr for ResultCode {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(ResultCode::A),
            "B" => Ok(ResultCode::B),
            "remis" | "draw" => Ok(ResultCode::Draw),
            _ => Err(RecordError::UnknownCode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub timestamp: NaiveDateTime,
    pub a: Outcome,
    pub b: Outcome,
}

impl MatchRecord {
    pub fn new(timestamp: NaiveDateTime, a: Outcome, b: Outcome) -> Result<Self, RecordError> {
        if a.half_points() + b.half_points() != 2 {
            return Err(RecordError::Sum { a, b });
        }
        Ok(Self { timestamp, a, b })
    }

    pub fn from_code(timestamp: NaiveDateTime, code: ResultCode) -> Self {
        let (a, b) = code.outcomes();
        Self { timestamp, a, b }
    }

    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let fields: Vec<_> = line.split(',').map(str::trim).collect();
        let [timestamp, a, b] = fields[..] else {
            return Err(RecordError::FieldCount(fields.len()));
        };
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIME_FORMAT)
            .map_err(|_| RecordError::Timestamp(timestamp.to_string()))?;
        Self::new(timestamp, a.parse()?, b.parse()?)
    }

    pub fn to_line(&self) -> String {
        format!("{}, {}, {}", self.timestamp.format(TIME_FORMAT), self.a, self.b)
    }
}

/// Decodes a whole match log. The first line is a header and is skipped.
pub fn parse_log(text: &str) -> Result<Vec<MatchRecord>, LogError> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            MatchRecord::parse_line(line).map_err(|error| LogError { line: i + 1, error })
        })
        .collect()
}
