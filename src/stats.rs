use crate::constants::*;
use crate::elo::{trajectory, win_projection, EloConfig};
use crate::pairing::{self, Pairing};
use crate::record::MatchRecord;
use crate::score::{daily, on_day, total, DailyScores, DaySelector, ScorePair};
use chrono::{Local, NaiveDate};
use color_eyre::eyre::Result;
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
pub struct Chart {
    pub labels: Vec<String>,
    pub a: Vec<i64>,
    pub b: Vec<i64>,
}

/// Everything shown on the ratings page of one pairing.
#[derive(Serialize)]
pub struct Summary {
    pub a: String,
    pub b: String,
    pub a_elo: i64,
    pub b_elo: i64,
    pub matches: usize,
    /// Player with white in the next game.
    pub white: String,
    pub a_next_win: i64,
    pub b_next_win: i64,
    pub today: ScorePair,
    pub total: ScorePair,
    pub daily: DailyScores,
    pub chart: Chart,
}

impl Summary {
    pub fn new(
        pairing: &Pairing,
        history: &[MatchRecord],
        config: &EloConfig,
        today: NaiveDate,
    ) -> Self {
        let ratings = trajectory(config, history);
        let (a_elo, b_elo) = ratings.last().copied().unwrap_or_default();

        let labels = std::iter::once("start".to_string())
            .chain(history.iter().map(|m| m.timestamp.format(TIME_FORMAT).to_string()))
            .collect();
        let (a, b) = ratings.into_iter().unzip();

        let white = if history.len() % 2 == 0 {
            &pairing.a
        } else {
            &pairing.b
        };

        Self {
            a: pairing.a.clone(),
            b: pairing.b.clone(),
            a_elo,
            b_elo,
            matches: history.len(),
            white: white.clone(),
            a_next_win: win_projection(config, a_elo, b_elo),
            b_next_win: win_projection(config, b_elo, a_elo),
            today: on_day(history, DaySelector::Today, today),
            total: total(history),
            daily: daily(history, today),
            chart: Chart { labels, a, b },
        }
    }

    pub fn page_name(&self) -> String {
        format!("{}_{}.html", self.a, self.b)
    }
}

pub struct Stats {
    pub summaries: Vec<Summary>,
}

impl Stats {
    pub fn load(games_dir: &Path, config: &EloConfig, today: NaiveDate) -> Result<Self> {
        let mut summaries = Vec::new();
        for p in pairing::list(games_dir)? {
            let history = pairing::load(games_dir, &p)?;
            summaries.push(Summary::new(&p, &history, config, today));
        }
        info!("Loaded {} pairings", summaries.len());
        Ok(Self { summaries })
    }

    pub fn save(&self, out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir)?;

        let index = File::create(out_dir.join("index.html"))?;
        let mut buf = BufWriter::new(index);
        write_head(&mut buf, "Pairings")?;
        write!(
            buf,
            r#"
  <h1>Pairings</h1>
  <p>Last updated {}</p>
  <table>
    <tr><th>A</th><th>B</th><th>Elo</th><th>#M</th></tr>"#,
            Local::now().format("%F %T"),
        )?;
        for s in &self.summaries {
            write!(
                buf,
                r#"
    <tr>
      <td><a href="{page}">{a}</a></td><td><a href="{page}">{b}</a></td>
      <td><span {}>{}</span> : <span {}>{}</span></td><td>{}</td>
    </tr>"#,
                rating_color(s.a_elo),
                s.a_elo,
                rating_color(s.b_elo),
                s.b_elo,
                s.matches,
                page = urlencoding::encode(&s.page_name()),
                a = escape_html(&s.a),
                b = escape_html(&s.b),
            )?;
        }
        writeln!(
            buf,
            "
  </table>
</body>

</html>"
        )?;
        buf.flush()?;

        for s in &self.summaries {
            let page = File::create(out_dir.join(s.page_name()))?;
            let mut buf = BufWriter::new(page);
            s.write_page(&mut buf)?;
            buf.flush()?;
        }

        info!(
            "Wrote {} pages to {}",
            self.summaries.len() + 1,
            out_dir.display()
        );
        Ok(())
    }
}

impl Summary {
    fn write_page(&self, buf: &mut impl Write) -> Result<()> {
        let a = escape_html(&self.a);
        let b = escape_html(&self.b);
        write_head(buf, &format!("{a} vs {b}"))?;
        write!(
            buf,
            r#"
  <a href="index.html">All pairings</a>
  <h1>{a} vs {b}</h1>
  <table>
    <tr><th></th><th>{a}</th><th>{b}</th></tr>
    <tr><td>Elo</td><td {}>{}</td><td {}>{}</td></tr>
    <tr><td>Next win</td><td>+{}</td><td>+{}</td></tr>
    <tr><td>{TODAY_KEY}</td><td>{}</td><td>{}</td></tr>
    <tr><td>Total</td><td>{}</td><td>{}</td></tr>
  </table>
  <p>{} matches, {} plays white next.</p>
  <h2>Daily</h2>
  <table>
    <tr><th>Day</th><th>{a}</th><th>{b}</th></tr>"#,
            rating_color(self.a_elo),
            self.a_elo,
            rating_color(self.b_elo),
            self.b_elo,
            self.a_next_win,
            self.b_next_win,
            self.today.a,
            self.today.b,
            self.total.a,
            self.total.b,
            self.matches,
            escape_html(&self.white),
        )?;
        for (day, score) in self.daily.days.iter().rev() {
            write!(
                buf,
                r#"
    <tr><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                day.format(DAY_FORMAT),
                score.a,
                score.b,
            )?;
        }
        write!(
            buf,
            r#"
  </table>
  <canvas id="chart"></canvas>
  <script>
    const names = {};
    const history = {};
    new Chart(document.getElementById("chart"), {{
      type: "line",
      data: {{
        labels: history.labels,
        datasets: [
          {{ label: names[0], data: history.a }},
          {{ label: names[1], data: history.b }},
        ],
      }},
    }});
  </script>
</body>

</html>
"#,
            script_json(&[&self.a, &self.b])?,
            script_json(&self.chart)?,
        )?;
        Ok(())
    }
}

fn write_head(buf: &mut impl Write, title: &str) -> Result<()> {
    write!(
        buf,
        r#"<!DOCTYPE html>
<html>

<head>
  <title>{title}</title>
  <style>
    table {{ border-collapse: collapse; margin-top: 1rem; }}
    th, td {{ padding: 10px; border: 1px solid #ddd; }}
    th {{ background-color: #f5f5f5; }}
  </style>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>

<body>"#
    )?;
    Ok(())
}

// JSON that cannot close the surrounding <script> element.
fn script_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Red below the starting rating, green above.
fn rating_color(rating: i64) -> String {
    const SPAN: f32 = 200.0;
    let k = (rating as f32).clamp(-SPAN, SPAN) / SPAN;
    format!(
        r#"style="font-weight: bold; color: hsl({} 70% 40%);""#,
        60.0 + 60.0 * k
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ResultCode;
    use chrono::NaiveDateTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn summary() -> Summary {
        let p = Pairing::new("bob", "alice").unwrap();
        let history = vec![
            MatchRecord::from_code(at(1, 10), ResultCode::A),
            MatchRecord::from_code(at(1, 11), ResultCode::A),
            MatchRecord::from_code(at(2, 10), ResultCode::Draw),
        ];
        Summary::new(&p, &history, &EloConfig::default(), date(2))
    }

    #[test]
    fn summary_of_history() {
        let s = summary();
        assert_eq!((s.a.as_str(), s.b.as_str()), ("alice", "bob"));
        assert_eq!(s.matches, 3);
        assert_eq!(s.chart.labels.len(), 4);
        assert_eq!(s.chart.labels[0], "start");
        assert_eq!(s.chart.labels[1], "01-08-2024 10:00");
        assert_eq!(s.chart.a.len(), 4);
        assert_eq!((s.chart.a[2], s.chart.b[2]), (16, -16));
        assert_eq!((s.a_elo, s.b_elo), (*s.chart.a.last().unwrap(), *s.chart.b.last().unwrap()));
        assert_eq!(s.white, "bob");
        assert_eq!(s.total.to_string(), "2.5 : 0.5");
        assert_eq!(s.today.to_string(), "0.5 : 0.5");
        assert_eq!(s.daily.days[&date(1)].to_string(), "2 : 0");
        assert!(s.a_next_win < s.b_next_win);
    }

    #[test]
    fn empty_summary() {
        let p = Pairing::new("a", "b").unwrap();
        let s = Summary::new(&p, &[], &EloConfig::default(), date(1));
        assert_eq!((s.a_elo, s.b_elo), (0, 0));
        assert_eq!(s.white, "a");
        assert_eq!((s.a_next_win, s.b_next_win), (8, 8));
        assert!(s.daily.is_empty());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["total"], serde_json::json!({"a": 0, "b": 0}));
        assert_eq!(json["daily"], serde_json::json!({}));
    }

    #[test]
    fn renders_site() {
        let tmp = tempfile::tempdir().unwrap();
        let games = tmp.path().join("games");
        let site = tmp.path().join("site");
        let p = Pairing::new("<ann>", "bob").unwrap();
        pairing::add_pairing(&games, &p).unwrap();
        pairing::record_result(&games, &p, ResultCode::A, at(3, 9)).unwrap();

        let stats = Stats::load(&games, &EloConfig::default(), date(3)).unwrap();
        assert_eq!(stats.summaries.len(), 1);
        stats.save(&site).unwrap();

        let index = fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains("&lt;ann&gt;"));
        assert!(!index.contains("<ann>"));
        assert!(index.contains(r#"href="%3Cann%3E_bob.html""#));

        let page = fs::read_to_string(site.join("<ann>_bob.html")).unwrap();
        assert!(page.contains(">8</td>"));
        assert!(page.contains(">-8</td>"));
        assert!(page.contains(r#""labels":["start","03-08-2024 09:00"]"#));
    }

    #[test]
    fn links_are_percent_encoded() {
        let tmp = tempfile::tempdir().unwrap();
        let games = tmp.path().join("games");
        let site = tmp.path().join("site");
        pairing::add_pairing(&games, &Pairing::new("a#1", "bob").unwrap()).unwrap();
        pairing::add_pairing(&games, &Pairing::new("50%?", "bob").unwrap()).unwrap();

        Stats::load(&games, &EloConfig::default(), date(3))
            .unwrap()
            .save(&site)
            .unwrap();

        let index = fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains(r#"href="a%231_bob.html""#));
        assert!(index.contains(r#"href="50%25%3F_bob.html""#));
        assert!(!index.contains(r#"href="a#1"#));
        assert!(site.join("a#1_bob.html").exists());
        assert!(site.join("50%?_bob.html").exists());
    }
}
