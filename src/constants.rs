pub const INITIAL_ELO: f64 = 0.0;
pub const K_FACTOR: f64 = 16.0;
pub const ELO_STEP: f64 = 400.0;

pub const TIME_FORMAT: &str = "%d-%m-%Y %H:%M";
pub const DAY_FORMAT: &str = "%d-%m-%Y";
pub const LOG_HEADER: &str = "Date, A, B";

/// Key of the current day in the daily breakdown.
pub const TODAY_KEY: &str = "today";

pub const GAMES_DIR: &str = "games";
pub const SITE_DIR: &str = "site";
