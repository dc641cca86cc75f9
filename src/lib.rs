//! Elo ratings and daily scores for pairs of players.
//!
//! Every pairing keeps an append-only match log. Ratings and scores are
//! never stored: they are recomputed from the full log on each read.

pub mod constants;
pub mod elo;
pub mod pairing;
pub mod record;
pub mod score;
pub mod stats;
