use crate::constants::*;
use crate::record::MatchRecord;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A sum of match outcomes, stored exactly as a count of half points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Points(u32);

impl Points {
    pub fn from_half_points(half: u32) -> Self {
        Self(half)
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub fn is_whole(self) -> bool {
        self.0 % 2 == 0
    }
}

impl Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_u32(self.0 / 2)
        } else {
            serializer.serialize_f64(self.value())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScorePair {
    pub a: Points,
    pub b: Points,
}

impl ScorePair {
    pub fn add_match(&mut self, m: &MatchRecord) {
        self.a += Points(m.a.half_points());
        self.b += Points(m.b.half_points());
    }
}

impl Add for ScorePair {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            a: self.a + rhs.a,
            b: self.b + rhs.b,
        }
    }
}

impl Sum for ScorePair {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.a, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelector {
    Today,
    Date(NaiveDate),
}

impl DaySelector {
    pub fn date(self, today: NaiveDate) -> NaiveDate {
        match self {
            DaySelector::Today => today,
            DaySelector::Date(date) => date,
        }
    }
}

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn total(history: &[MatchRecord]) -> ScorePair {
    let mut sum = ScorePair::default();
    for m in history {
        sum.add_match(m);
    }
    sum
}

/// Sums the matches played between 00:00:00 and 23:59:59 of the selected day.
pub fn on_day(history: &[MatchRecord], day: DaySelector, today: NaiveDate) -> ScorePair {
    let day = day.date(today);
    let mut sum = ScorePair::default();
    for m in history.iter().filter(|m| m.timestamp.date() == day) {
        sum.add_match(m);
    }
    sum
}

/// Per-day sums. The current day, if played, is kept apart from the
/// calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyScores {
    pub today: Option<ScorePair>,
    pub days: BTreeMap<NaiveDate, ScorePair>,
}

impl DailyScores {
    pub fn is_empty(&self) -> bool {
        self.today.is_none() && self.days.is_empty()
    }

    pub fn sum(&self) -> ScorePair {
        self.days.values().copied().chain(self.today).sum()
    }

    /// The breakdown under external day keys, `today` for the current day.
    pub fn keyed(&self) -> BTreeMap<String, ScorePair> {
        let mut keyed: BTreeMap<_, _> = self
            .days
            .iter()
            .map(|(day, score)| (day_key(*day), *score))
            .collect();
        if let Some(score) = self.today {
            keyed.insert(TODAY_KEY.to_string(), score);
        }
        keyed
    }
}

impl Serialize for DailyScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keyed().serialize(serializer)
    }
}

pub fn daily(history: &[MatchRecord], today: NaiveDate) -> DailyScores {
    let mut days: BTreeMap<NaiveDate, ScorePair> = BTreeMap::new();
    for m in history {
        days.entry(m.timestamp.date()).or_default().add_match(m);
    }
    let today = days.remove(&today);
    DailyScores { today, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Outcome, ResultCode};
    use chrono::NaiveDateTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn pair(a: u32, b: u32) -> ScorePair {
        ScorePair {
            a: Points::from_half_points(a),
            b: Points::from_half_points(b),
        }
    }

    fn scenario() -> Vec<MatchRecord> {
        vec![
            MatchRecord::from_code(at(1, 0, 0), ResultCode::A),
            MatchRecord::from_code(at(1, 23, 59), ResultCode::B),
            MatchRecord::new(at(2, 12, 0), Outcome::Draw, Outcome::Draw).unwrap(),
        ]
    }

    #[test]
    fn empty_history() {
        assert_eq!(total(&[]), pair(0, 0));
        let d = daily(&[], date(1));
        assert!(d.is_empty());
        assert!(d.keyed().is_empty());
    }

    #[test]
    fn scenario_totals() {
        let h = scenario();
        assert_eq!(total(&h), pair(3, 3));
        assert_eq!(on_day(&h, DaySelector::Date(date(1)), date(30)), pair(2, 2));
        assert_eq!(on_day(&h, DaySelector::Date(date(2)), date(30)), pair(1, 1));
        assert_eq!(on_day(&h, DaySelector::Today, date(2)), pair(1, 1));
        assert_eq!(on_day(&h, DaySelector::Today, date(3)), pair(0, 0));
    }

    #[test]
    fn day_window_includes_both_ends() {
        let h = vec![
            MatchRecord::from_code(at(4, 0, 0), ResultCode::A),
            MatchRecord::from_code(at(4, 23, 59), ResultCode::A),
            MatchRecord::from_code(at(5, 0, 0), ResultCode::A),
        ];
        assert_eq!(on_day(&h, DaySelector::Date(date(4)), date(4)), pair(4, 0));
    }

    #[test]
    fn breakdown_separates_today() {
        let h = scenario();
        let d = daily(&h, date(2));
        assert_eq!(d.today, Some(pair(1, 1)));
        assert_eq!(d.days.len(), 1);
        assert_eq!(d.days[&date(1)], pair(2, 2));

        let keyed = d.keyed();
        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed["01-06-2024"], pair(2, 2));
        assert_eq!(keyed[TODAY_KEY], pair(1, 1));
        assert!(!keyed.contains_key("02-06-2024"));
    }

    #[test]
    fn breakdown_partitions_total() {
        let mut h = scenario();
        h.push(MatchRecord::from_code(at(7, 9, 0), ResultCode::Draw));
        h.push(MatchRecord::from_code(at(7, 10, 0), ResultCode::B));
        for today in [date(1), date(2), date(7), date(20)] {
            assert_eq!(daily(&h, today).sum(), total(&h));
        }
    }

    #[test]
    fn whole_sums_print_as_integers() {
        assert_eq!(Points::from_half_points(4).to_string(), "2");
        assert_eq!(Points::from_half_points(3).to_string(), "1.5");
        assert_eq!(Points::from_half_points(1).to_string(), "0.5");
        assert_eq!(pair(3, 3).to_string(), "1.5 : 1.5");
        assert_eq!(Points::from_half_points(3).value(), 1.5);
    }

    #[test]
    fn serializes_whole_sums_without_fraction() {
        let json = serde_json::to_string(&pair(2, 3)).unwrap();
        assert_eq!(json, r#"{"a":1,"b":1.5}"#);
        let json = serde_json::to_string(&daily(&scenario(), date(2))).unwrap();
        assert_eq!(json, r#"{"01-06-2024":{"a":1,"b":1},"today":{"a":0.5,"b":0.5}}"#);
    }
}
