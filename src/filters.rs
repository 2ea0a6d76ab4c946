//! Translates the filter panel into predicates on the odds table.

use crate::postgrest::Condition;
use crate::records::Column;

pub const MIN_SEARCH_LEN: usize = 3;
pub const ALL_LEAGUES: &str = "All Leagues";
pub const TOLERANCE_STEP: f64 = 0.05;
pub const TOLERANCE_MAX: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeagueSelection {
    #[default]
    All,
    Named(String),
}

impl LeagueSelection {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == ALL_LEAGUES {
            LeagueSelection::All
        } else {
            LeagueSelection::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LeagueSelection::All => ALL_LEAGUES,
            LeagueSelection::Named(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search: String,
    /// Search `TEAM2` instead of `TEAM1`.
    pub away: bool,
    pub league: LeagueSelection,
    pub odd1: String,
    pub oddx: String,
    pub odd2: String,
    /// Shared "edge of odds" applied around each odds target.
    pub tolerance: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            away: false,
            league: LeagueSelection::All,
            odd1: String::new(),
            oddx: String::new(),
            odd2: String::new(),
            tolerance: "0.00".to_string(),
        }
    }
}

impl FilterState {
    /// Moves the tolerance by `delta`. Steps leaving `[0, TOLERANCE_MAX]`
    /// are ignored; returns whether the value changed.
    pub fn step_tolerance(&mut self, delta: f64) -> bool {
        let current = parse_decimal(&self.tolerance).unwrap_or(0.0);
        let next = round_to(current + delta, 2);
        if !(0.0..=TOLERANCE_MAX).contains(&next) {
            return false;
        }
        let formatted = format!("{next:.2}");
        if formatted == self.tolerance {
            return false;
        }
        self.tolerance = formatted;
        true
    }

    /// Odds targets that currently parse, in `[ODD1, ODDX, ODD2]` order.
    pub fn odds_targets(&self) -> [Option<f64>; 3] {
        [
            parse_decimal(&self.odd1),
            parse_decimal(&self.oddx),
            parse_decimal(&self.odd2),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPlan {
    /// The panel state can never match (search text too short).
    NoMatch,
    Conditions(Vec<Condition>),
}

impl FilterPlan {
    pub fn conditions(&self) -> Option<&[Condition]> {
        match self {
            FilterPlan::NoMatch => None,
            FilterPlan::Conditions(conditions) => Some(conditions),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRange {
    pub column: Column,
    pub min: f64,
    pub max: f64,
}

impl OddsRange {
    pub fn conditions(&self) -> [Condition; 2] {
        [
            Condition::gte(self.column, self.min),
            Condition::lte(self.column, self.max),
        ]
    }
}

pub fn build_plan(state: &FilterState) -> FilterPlan {
    let mut conditions = Vec::new();

    // Length counts the raw input, whitespace included.
    let len = state.search.chars().count();
    if len > 0 && len < MIN_SEARCH_LEN {
        return FilterPlan::NoMatch;
    }
    let search = state.search.trim();
    if !search.is_empty() {
        let column = if state.away {
            Column::Team2
        } else {
            Column::Team1
        };
        conditions.push(Condition::contains_ci(column, search));
    }

    if let LeagueSelection::Named(league) = &state.league {
        conditions.push(Condition::eq(Column::League, league.as_str()));
    }

    let targets = [
        (Column::Odd1, &state.odd1),
        (Column::OddX, &state.oddx),
        (Column::Odd2, &state.odd2),
    ];
    for (column, target) in targets {
        if let Some(range) = odds_range(column, target, &state.tolerance) {
            conditions.extend(range.conditions());
        }
    }

    FilterPlan::Conditions(conditions)
}

/// `[target - tolerance, target + tolerance]`, or `None` when the target is
/// blank or either value is malformed. A blank tolerance counts as zero.
pub fn odds_range(column: Column, target: &str, tolerance: &str) -> Option<OddsRange> {
    if target.trim().is_empty() {
        return None;
    }
    let value = parse_decimal(target)?;
    let edge = if tolerance.trim().is_empty() {
        0.0
    } else {
        parse_decimal(tolerance)?
    };
    if edge < 0.0 {
        return None;
    }
    Some(OddsRange {
        column,
        min: round_to(value - edge, 6),
        max: round_to(value + edge, 6),
    })
}

/// Finite decimal from user input; accepts `,` as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_steps_are_bounded() {
        let mut state = FilterState::default();
        assert!(!state.step_tolerance(-TOLERANCE_STEP));
        assert_eq!(state.tolerance, "0.00");
        for _ in 0..10 {
            assert!(state.step_tolerance(TOLERANCE_STEP));
        }
        assert_eq!(state.tolerance, "0.50");
        assert!(!state.step_tolerance(TOLERANCE_STEP));
        assert!(state.step_tolerance(-TOLERANCE_STEP));
        assert_eq!(state.tolerance, "0.45");
    }

    #[test]
    fn parse_decimal_rejects_non_finite() {
        assert_eq!(parse_decimal(" 2,35 "), Some(2.35));
        assert_eq!(parse_decimal("nan"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("2.1.3"), None);
    }

    #[test]
    fn league_sentinel_round_trips() {
        assert_eq!(LeagueSelection::from_label(ALL_LEAGUES), LeagueSelection::All);
        assert_eq!(
            LeagueSelection::from_label("Eng1"),
            LeagueSelection::Named("Eng1".to_string())
        );
        assert_eq!(LeagueSelection::All.label(), ALL_LEAGUES);
    }
}
