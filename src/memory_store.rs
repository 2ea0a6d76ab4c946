//! In-process stand-in for the hosted table, used for offline mode
//! (`ODDS_FIXTURE_FILE`) and tests. Applies the same predicates the REST
//! backend would.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::postgrest::{Condition, Op, Operand, Query};
use crate::records::{FieldValue, MatchRecord, parse_records_json};
use crate::retry::Reconnect;
use crate::store::{MatchStore, QueryError, RowsPage};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<MatchRecord>,
    pending_failures: Cell<u32>,
    reconnects: Cell<u32>,
}

impl MemoryStore {
    pub fn new(rows: Vec<MatchRecord>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read fixture {}", path.display()))?;
        let rows = parse_records_json(&raw)?;
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[MatchRecord] {
        &self.rows
    }

    /// The next `n` calls fail as if the connection dropped.
    pub fn inject_disconnects(&self, n: u32) {
        self.pending_failures.set(n);
    }

    pub fn reconnect_count(&self) -> u32 {
        self.reconnects.get()
    }

    fn check_connection(&self) -> Result<(), QueryError> {
        let pending = self.pending_failures.get();
        if pending > 0 {
            self.pending_failures.set(pending - 1);
            return Err(QueryError::Unavailable("server disconnected".to_string()));
        }
        Ok(())
    }

    fn filtered(&self, query: &Query) -> Vec<&MatchRecord> {
        self.rows
            .iter()
            .filter(|row| query.conditions.iter().all(|c| row_matches(c, row)))
            .collect()
    }
}

impl Reconnect for MemoryStore {
    fn reconnect(&mut self) -> Result<(), QueryError> {
        self.reconnects.set(self.reconnects.get() + 1);
        Ok(())
    }
}

impl MatchStore for MemoryStore {
    fn select_rows(&self, query: &Query) -> Result<RowsPage, QueryError> {
        self.check_connection()?;
        let mut rows = self.filtered(query);
        let total = rows.len() as u64;

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = cmp_fields(&a.field(order.column), &b.field(order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }

        let rows = match query.window {
            Some(window) => rows
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .cloned()
                .collect(),
            None => rows.into_iter().cloned().collect(),
        };
        Ok(RowsPage {
            rows,
            total: Some(total),
        })
    }

    fn count(&self, query: &Query) -> Result<u64, QueryError> {
        self.check_connection()?;
        Ok(self.filtered(query).len() as u64)
    }

    fn select_column(
        &self,
        column: crate::records::Column,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Option<String>>, QueryError> {
        self.check_connection()?;
        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|row| match row.field(column) {
                FieldValue::Null => None,
                FieldValue::Int(n) => Some(n.to_string()),
                FieldValue::Num(f) => Some(f.to_string()),
                FieldValue::Text(t) => Some(t.to_string()),
            })
            .collect())
    }
}

pub fn row_matches(condition: &Condition, row: &MatchRecord) -> bool {
    match condition {
        Condition::Compare { column, op, value } => compare(&row.field(*column), *op, value),
        Condition::All(items) => items.iter().all(|c| row_matches(c, row)),
        Condition::Any(items) => items.iter().any(|c| row_matches(c, row)),
    }
}

fn compare(field: &FieldValue<'_>, op: Op, value: &Operand) -> bool {
    if op == Op::ContainsCi {
        return match (field, value) {
            (FieldValue::Text(text), Operand::Text(needle)) => {
                contains_pattern(&text.to_lowercase(), &needle.to_lowercase())
            }
            _ => false,
        };
    }

    let ord = match (field, value) {
        (FieldValue::Null, _) => return false,
        (FieldValue::Text(text), Operand::Text(v)) => Some((*text).cmp(v.as_str())),
        (FieldValue::Text(text), other) => {
            let Ok(parsed) = text.trim().parse::<f64>() else {
                return false;
            };
            parsed.partial_cmp(&operand_f64(other))
        }
        (FieldValue::Int(n), v) => numeric_cmp(*n as f64, v),
        (FieldValue::Num(f), v) => numeric_cmp(*f, v),
    };
    let Some(ord) = ord else {
        return false;
    };
    match op {
        Op::Eq => ord == Ordering::Equal,
        Op::Gt => ord == Ordering::Greater,
        Op::Gte => ord != Ordering::Less,
        Op::Lte => ord != Ordering::Greater,
        Op::ContainsCi => false,
    }
}

// `*` inside the needle is a wildcard, as PostgREST reads it in `ilike`.
fn contains_pattern(haystack: &str, needle: &str) -> bool {
    let mut rest = haystack;
    for part in needle.split('*').filter(|p| !p.is_empty()) {
        match rest.find(part) {
            Some(at) => rest = &rest[at + part.len()..],
            None => return false,
        }
    }
    true
}

fn numeric_cmp(left: f64, value: &Operand) -> Option<Ordering> {
    match value {
        Operand::Text(t) => left.partial_cmp(&t.trim().parse::<f64>().ok()?),
        other => left.partial_cmp(&operand_f64(other)),
    }
}

fn operand_f64(value: &Operand) -> f64 {
    match value {
        Operand::Int(n) => *n as f64,
        Operand::Num(f) => *f,
        Operand::Text(t) => t.trim().parse::<f64>().unwrap_or(f64::NAN),
    }
}

// Nulls sort last, as PostgreSQL does for ascending order.
fn cmp_fields(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Greater,
        (_, FieldValue::Null) => Ordering::Less,
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (x, y) => field_f64(x)
            .partial_cmp(&field_f64(y))
            .unwrap_or(Ordering::Equal),
    }
}

fn field_f64(value: &FieldValue<'_>) -> f64 {
    match value {
        FieldValue::Int(n) => *n as f64,
        FieldValue::Num(f) => *f,
        FieldValue::Text(t) => t.trim().parse::<f64>().unwrap_or(f64::NAN),
        FieldValue::Null => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Column;

    fn row(id: i64, g1: Option<i64>, g2: Option<i64>) -> MatchRecord {
        MatchRecord {
            id,
            date: None,
            time: None,
            league: None,
            team1: Some("Olympique Lyonnais".to_string()),
            team2: None,
            odd1: Some(2.05),
            oddx: None,
            odd2: None,
            result: None,
            goal1: g1,
            goal2: g2,
        }
    }

    #[test]
    fn goal_sum_disjunction_matches_arithmetic() {
        let over = Condition::sum_exceeds(Column::Goal1, Column::Goal2, 2);
        for g1 in 0..6 {
            for g2 in 0..6 {
                let r = row(1, Some(g1), Some(g2));
                assert_eq!(row_matches(&over, &r), g1 + g2 > 2, "{g1}-{g2}");
            }
        }
        assert!(!row_matches(&over, &row(1, None, Some(4))));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = row(1, None, None);
        assert!(row_matches(&Condition::gte(Column::Odd1, 2.05), &r));
        assert!(row_matches(&Condition::lte(Column::Odd1, 2.05), &r));
        assert!(!row_matches(&Condition::gte(Column::OddX, 1.0), &r));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let r = row(1, None, None);
        assert!(row_matches(&Condition::contains_ci(Column::Team1, "lyon"), &r));
        assert!(!row_matches(&Condition::contains_ci(Column::Team2, "lyon"), &r));
    }

    #[test]
    fn star_in_search_is_a_wildcard() {
        let r = row(1, None, None);
        assert!(row_matches(&Condition::contains_ci(Column::Team1, "oly*lyon"), &r));
        assert!(row_matches(&Condition::contains_ci(Column::Team1, "*ais"), &r));
        assert!(!row_matches(&Condition::contains_ci(Column::Team1, "lyon*oly"), &r));
        assert!(!row_matches(&Condition::contains_ci(Column::Team1, "oly_lyon"), &r));
    }
}
