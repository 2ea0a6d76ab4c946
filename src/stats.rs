use crate::postgrest::Condition;
use crate::records::{Column, Outcome};

/// Matches with more total goals than this count as "over".
pub const OVER_GOALS_THRESHOLD: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Result(Outcome),
    Over,
    BothScored,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Result(Outcome::Home),
        StatKind::Result(Outcome::Draw),
        StatKind::Result(Outcome::Away),
        StatKind::Over,
        StatKind::BothScored,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Result(Outcome::Home) => "R:1",
            StatKind::Result(Outcome::Draw) => "R:X",
            StatKind::Result(Outcome::Away) => "R:2",
            StatKind::Over => "O/U",
            StatKind::BothScored => "BTS",
        }
    }

    /// Extra predicate ANDed onto the active filter to count this class.
    pub fn condition(self) -> Condition {
        match self {
            StatKind::Result(outcome) => Condition::eq(Column::Result, outcome.code()),
            StatKind::Over => {
                Condition::sum_exceeds(Column::Goal1, Column::Goal2, OVER_GOALS_THRESHOLD)
            }
            StatKind::BothScored => Condition::All(vec![
                Condition::gt(Column::Goal1, 0i64),
                Condition::gt(Column::Goal2, 0i64),
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub filtered: u64,
    pub home: u64,
    pub draw: u64,
    pub away: u64,
    pub over: u64,
    pub bts: u64,
}

impl OutcomeCounts {
    pub fn get(&self, kind: StatKind) -> u64 {
        match kind {
            StatKind::Result(Outcome::Home) => self.home,
            StatKind::Result(Outcome::Draw) => self.draw,
            StatKind::Result(Outcome::Away) => self.away,
            StatKind::Over => self.over,
            StatKind::BothScored => self.bts,
        }
    }

    pub fn set(&mut self, kind: StatKind, count: u64) {
        match kind {
            StatKind::Result(Outcome::Home) => self.home = count,
            StatKind::Result(Outcome::Draw) => self.draw = count,
            StatKind::Result(Outcome::Away) => self.away = count,
            StatKind::Over => self.over = count,
            StatKind::BothScored => self.bts = count,
        }
    }

    /// Filtered rows with no recorded result.
    pub fn unresolved(&self) -> u64 {
        self.filtered
            .saturating_sub(self.home + self.draw + self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatCell {
    pub kind: StatKind,
    pub count: u64,
    pub share: f64,
    pub implied: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub filtered: u64,
    pub cells: Vec<StatCell>,
}

pub fn share_pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Heuristic "odds-implied" percentage:
/// `(count * odd) / (total * odd1 * oddX * odd2 / 10) * 100`.
///
/// Not a calibrated probability. Only defined when all three odds targets
/// are set and the filtered total is non-zero.
pub fn implied_pct(count: u64, total: u64, odds: [Option<f64>; 3], outcome: Outcome) -> Option<f64> {
    let [Some(o1), Some(ox), Some(o2)] = odds else {
        return None;
    };
    let odd = match outcome {
        Outcome::Home => o1,
        Outcome::Draw => ox,
        Outcome::Away => o2,
    };
    let denominator = total as f64 * o1 * ox * o2 / 10.0;
    if denominator <= 0.0 {
        return None;
    }
    Some(count as f64 * odd / denominator * 100.0)
}

pub fn stats_view(counts: &OutcomeCounts, odds: [Option<f64>; 3]) -> StatsView {
    let cells = StatKind::ALL
        .iter()
        .map(|&kind| {
            let count = counts.get(kind);
            let implied = match kind {
                StatKind::Result(outcome) => implied_pct(count, counts.filtered, odds, outcome),
                StatKind::Over | StatKind::BothScored => None,
            };
            StatCell {
                kind,
                count,
                share: share_pct(count, counts.filtered),
                implied,
            }
        })
        .collect();
    StatsView {
        filtered: counts.filtered,
        cells,
    }
}

impl StatCell {
    pub fn label(&self) -> String {
        let mut out = format!("{} ({:.1}%)", format_count(self.count), self.share);
        if let StatKind::Result(_) = self.kind {
            match self.implied {
                Some(pct) => out.push_str(&format!(" ({pct:.1}%)")),
                None => out.push_str(" (-)"),
            }
        }
        out
    }
}

/// Thousands grouped with spaces: `45123` -> `45 123`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
