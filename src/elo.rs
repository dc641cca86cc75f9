use crate::constants::*;
use crate::record::MatchRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
}

/// When the running rating is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Accumulate in real numbers, round only the reported values.
    #[default]
    Accumulate,
    /// Round the rating itself after every match. Reproduces ratings shown by
    /// old versions of the tracker for the same logs.
    PerMatch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloConfig {
    pub initial_elo: f64,
    pub k_factor: f64,
    pub rounding: Rounding,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_elo: INITIAL_ELO,
            k_factor: K_FACTOR,
            rounding: Rounding::Accumulate,
        }
    }
}

impl EloConfig {
    pub fn new(initial_elo: f64, k_factor: f64, rounding: Rounding) -> Result<Self, ConfigError> {
        for (name, value) in [("initial Elo", initial_elo), ("k-factor", k_factor)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        Ok(Self {
            initial_elo,
            k_factor,
            rounding,
        })
    }
}

/// Ratings of players A and B after some prefix of the history.
pub type RatingPair = (i64, i64);

/// Expected score of a player rated `a` against one rated `b`.
pub fn expected(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((b - a) / ELO_STEP))
}

pub fn delta(k: f64, score: f64, expected: f64) -> f64 {
    k * (score - expected)
}

/// Round half to even. Symmetric under negation, so both sides of a
/// zero-sum pair round to opposite values.
pub fn round(rating: f64) -> f64 {
    rating.round_ties_even()
}

fn display(rating: f64) -> i64 {
    round(rating) as i64
}

/// Replays the whole history and returns the ratings after every prefix,
/// starting with the empty one.
pub fn trajectory(config: &EloConfig, history: &[MatchRecord]) -> Vec<RatingPair> {
    let mut a = config.initial_elo;
    let mut b = config.initial_elo;

    let mut ratings = Vec::with_capacity(history.len() + 1);
    ratings.push((display(a), display(b)));

    for m in history {
        let pa = expected(a, b);
        let pb = expected(b, a);
        a += delta(config.k_factor, m.a.score(), pa);
        b += delta(config.k_factor, m.b.score(), pb);
        if config.rounding == Rounding::PerMatch {
            a = round(a);
            b = round(b);
        }
        ratings.push((display(a), display(b)));
    }

    ratings
}

/// Points a player rated `a` would gain by beating one rated `b`.
pub fn win_projection(config: &EloConfig, a: i64, b: i64) -> i64 {
    display(delta(config.k_factor, 1.0, expected(a as f64, b as f64)))
}
