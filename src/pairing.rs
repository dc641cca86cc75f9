use crate::constants::*;
use crate::record::{parse_log, MatchRecord, ResultCode};
use chrono::{DurationRound, NaiveDateTime, TimeDelta};
use color_eyre::eyre::{bail, ensure, Result, WrapErr};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// An unordered pair of players, stored with the names sorted. Result code
/// `A` always refers to `a`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pairing {
    pub a: String,
    pub b: String,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['_', '/', '\\', ','])
        && !name.chars().any(char::is_control)
}

impl Pairing {
    pub fn new(p1: &str, p2: &str) -> Result<Self> {
        for name in [p1, p2] {
            ensure!(valid_name(name), "invalid player name {name:?}");
        }
        ensure!(p1 != p2, "a player cannot be paired with themselves");
        let (a, b) = if p1 < p2 { (p1, p2) } else { (p2, p1) };
        Ok(Self {
            a: a.to_string(),
            b: b.to_string(),
        })
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".csv")?;
        let (a, b) = stem.split_once('_')?;
        Self::new(a, b).ok().filter(|p| p.stem() == stem)
    }

    pub fn stem(&self) -> String {
        format!("{}_{}", self.a, self.b)
    }

    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.csv", self.stem()))
    }
}

/// Creates an empty log for the pairing. An existing log is never replaced.
pub fn add_pairing(dir: &Path, pairing: &Pairing) -> Result<PathBuf> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("cannot create {}", dir.display()))?;
    let path = pairing.log_path(dir);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("pairing {} vs {} already exists", pairing.a, pairing.b)
        }
        Err(e) => return Err(e).wrap_err_with(|| format!("cannot create {}", path.display())),
    };
    writeln!(file, "{LOG_HEADER}")?;
    info!("Created pairing {} vs {}", pairing.a, pairing.b);
    Ok(path)
}

/// Appends one result, stamped with `now` to the minute.
pub fn record_result(
    dir: &Path,
    pairing: &Pairing,
    code: ResultCode,
    now: NaiveDateTime,
) -> Result<MatchRecord> {
    let path = pairing.log_path(dir);
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("unknown pairing {} vs {}", pairing.a, pairing.b))?;
    let record = MatchRecord::from_code(now.duration_trunc(TimeDelta::minutes(1))?, code);
    if !ends_with_newline(&mut file)? {
        writeln!(file)?;
    }
    writeln!(file, "{}", record.to_line())?;
    info!(
        "Recorded {} - {} for {} vs {}",
        record.a, record.b, pairing.a, pairing.b
    );
    Ok(record)
}

fn ends_with_newline(file: &mut (impl Read + Seek)) -> Result<bool> {
    if file.seek(SeekFrom::End(0))? == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

pub fn load(dir: &Path, pairing: &Pairing) -> Result<Vec<MatchRecord>> {
    let path = pairing.log_path(dir);
    let text = fs::read_to_string(&path)
        .wrap_err_with(|| format!("unknown pairing {} vs {}", pairing.a, pairing.b))?;
    let history = parse_log(&text).wrap_err_with(|| format!("malformed log {}", path.display()))?;
    debug!("Read {} matches from {}", history.len(), path.display());
    Ok(history)
}

/// Every pairing with a log in `dir`, sorted by name.
pub fn list(dir: &Path) -> Result<Vec<Pairing>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).wrap_err_with(|| format!("cannot list {}", dir.display())),
    };
    let mut pairings = Vec::new();
    for entry in entries {
        let name = entry?.file_name();
        match name.to_str().and_then(Pairing::from_file_name) {
            Some(p) => pairings.push(p),
            None => debug!("Skipping {}", name.to_string_lossy()),
        }
    }
    pairings.sort();
    Ok(pairings)
}
