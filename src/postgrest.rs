//! Query model for the hosted odds table and its PostgREST wire rendering.
//!
//! Conditions are plain data so the same predicate set can be rendered into
//! URL parameters for the REST endpoint or evaluated against in-memory rows.

use crate::records::Column;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Int(i64),
    Num(f64),
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Text(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Text(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Int(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Num(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
    Gte,
    Lte,
    /// Case-insensitive substring match; rendered as `ilike.*text*`.
    ContainsCi,
}

impl Op {
    fn keyword(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lte => "lte",
            Op::ContainsCi => "ilike",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: Column,
        op: Op,
        value: Operand,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn eq(column: Column, value: impl Into<Operand>) -> Self {
        Self::compare(column, Op::Eq, value)
    }

    pub fn gt(column: Column, value: impl Into<Operand>) -> Self {
        Self::compare(column, Op::Gt, value)
    }

    pub fn gte(column: Column, value: impl Into<Operand>) -> Self {
        Self::compare(column, Op::Gte, value)
    }

    pub fn lte(column: Column, value: impl Into<Operand>) -> Self {
        Self::compare(column, Op::Lte, value)
    }

    pub fn contains_ci(column: Column, text: impl Into<String>) -> Self {
        Self::compare(column, Op::ContainsCi, Operand::Text(text.into()))
    }

    fn compare(column: Column, op: Op, value: impl Into<Operand>) -> Self {
        Condition::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// `left + right > threshold` for non-negative integer columns.
    ///
    /// PostgREST cannot filter on expressions, so the sum is unrolled into an
    /// equivalent disjunction.
    pub fn sum_exceeds(left: Column, right: Column, threshold: i64) -> Self {
        let need = threshold.max(-1) + 1;
        if need <= 0 {
            return Condition::All(vec![
                Condition::gte(left, 0i64),
                Condition::gte(right, 0i64),
            ]);
        }
        // `>= 0` on the other side keeps rows with a missing score out, as
        // the arithmetic sum would be NULL.
        let mut branches = vec![
            Condition::All(vec![Condition::gte(left, need), Condition::gte(right, 0i64)]),
            Condition::All(vec![Condition::gte(left, 0i64), Condition::gte(right, need)]),
        ];
        for k in 1..need {
            branches.push(Condition::All(vec![
                Condition::eq(left, k),
                Condition::gte(right, need - k),
            ]));
        }
        Condition::Any(branches)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: String,
    pub conditions: Vec<Condition>,
    pub order: Option<Order>,
    pub window: Option<Window>,
}

impl Query {
    pub fn select(columns: &str) -> Self {
        Self {
            select: columns.to_string(),
            conditions: Vec::new(),
            order: None,
            window: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn order_by(mut self, column: Column, descending: bool) -> Self {
        self.order = Some(Order { column, descending });
        self
    }

    pub fn window(mut self, offset: u64, limit: u64) -> Self {
        self.window = Some(Window { offset, limit });
        self
    }

    /// URL query parameters in PostgREST syntax.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        for condition in &self.conditions {
            push_top_level(&mut params, condition);
        }
        if let Some(order) = self.order {
            let dir = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{dir}", order.column.name())));
        }
        if let Some(window) = self.window {
            params.push(("offset".to_string(), window.offset.to_string()));
            params.push(("limit".to_string(), window.limit.to_string()));
        }
        params
    }
}

fn push_top_level(params: &mut Vec<(String, String)>, condition: &Condition) {
    match condition {
        Condition::Compare { column, op, value } => {
            params.push((
                column.name().to_string(),
                format!("{}.{}", op.keyword(), render_operand(*op, value, false)),
            ));
        }
        Condition::All(items) => {
            for item in items {
                push_top_level(params, item);
            }
        }
        Condition::Any(items) => {
            let inner = items.iter().map(render_nested).collect::<Vec<_>>().join(",");
            params.push(("or".to_string(), format!("({inner})")));
        }
    }
}

fn render_nested(condition: &Condition) -> String {
    match condition {
        Condition::Compare { column, op, value } => format!(
            "{}.{}.{}",
            column.name(),
            op.keyword(),
            render_operand(*op, value, true)
        ),
        Condition::All(items) => format!(
            "and({})",
            items.iter().map(render_nested).collect::<Vec<_>>().join(",")
        ),
        Condition::Any(items) => format!(
            "or({})",
            items.iter().map(render_nested).collect::<Vec<_>>().join(",")
        ),
    }
}

fn render_operand(op: Op, value: &Operand, nested: bool) -> String {
    let raw = match (op, value) {
        (Op::ContainsCi, Operand::Text(text)) => format!("*{}*", escape_like(text)),
        (_, Operand::Text(text)) => text.clone(),
        (_, Operand::Int(n)) => n.to_string(),
        (_, Operand::Num(f)) => f.to_string(),
    };
    if nested { quote_reserved(&raw) } else { raw }
}

/// Escapes LIKE's `%` and `_`. A `*` typed by the user stays a wildcard.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// Values inside `or=(...)` must be double-quoted when they contain the
// grammar's delimiters.
fn quote_reserved(raw: &str) -> String {
    if !raw.chars().any(|c| matches!(c, ',' | '(' | ')' | '"' | ':') || c.is_whitespace()) {
        return raw.to_string();
    }
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Total row count from a `Content-Range` header (`0-19/45`, `*/45`).
/// Returns `None` when the server did not compute a total (`0-19/*`).
pub fn parse_content_range(raw: &str) -> Option<Option<u64>> {
    let (_, total) = raw.trim().rsplit_once('/')?;
    let total = total.trim();
    if total == "*" {
        return Some(None);
    }
    total.parse::<u64>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn renders_page_query() {
        let q = Query::select("*")
            .filter(Condition::eq(Column::League, "Eng1"))
            .filter(Condition::gte(Column::Odd1, 1.95))
            .filter(Condition::lte(Column::Odd1, 2.05))
            .order_by(Column::Id, true)
            .window(40, 20);
        let params = q.to_params();
        assert_eq!(param(&params, "select"), ["*"]);
        assert_eq!(param(&params, "LEAGUE"), ["eq.Eng1"]);
        assert_eq!(param(&params, "ODD1"), ["gte.1.95", "lte.2.05"]);
        assert_eq!(param(&params, "order"), ["ID.desc"]);
        assert_eq!(param(&params, "offset"), ["40"]);
        assert_eq!(param(&params, "limit"), ["20"]);
    }

    #[test]
    fn contains_escapes_like_wildcards() {
        let q = Query::select("*").filter(Condition::contains_ci(Column::Team1, "50%_fc"));
        assert_eq!(param(&q.to_params(), "TEAM1"), ["ilike.*50\\%\\_fc*"]);

        let q = Query::select("*").filter(Condition::contains_ci(Column::Team2, "man*city"));
        assert_eq!(param(&q.to_params(), "TEAM2"), ["ilike.*man*city*"]);
    }

    #[test]
    fn sum_exceeds_renders_or_group() {
        let q = Query::select("*").filter(Condition::sum_exceeds(Column::Goal1, Column::Goal2, 2));
        assert_eq!(
            param(&q.to_params(), "or"),
            ["(and(GOAL1.gte.3,GOAL2.gte.0),and(GOAL1.gte.0,GOAL2.gte.3),and(GOAL1.eq.1,GOAL2.gte.2),and(GOAL1.eq.2,GOAL2.gte.1))"]
        );
    }

    #[test]
    fn nested_text_values_are_quoted() {
        let q = Query::select("*").filter(Condition::Any(vec![
            Condition::eq(Column::Team1, "Real Madrid"),
            Condition::eq(Column::Team2, "Inter"),
        ]));
        assert_eq!(
            param(&q.to_params(), "or"),
            ["(TEAM1.eq.\"Real Madrid\",TEAM2.eq.Inter)"]
        );
    }

    #[test]
    fn content_range_variants() {
        assert_eq!(parse_content_range("0-19/45"), Some(Some(45)));
        assert_eq!(parse_content_range("*/0"), Some(Some(0)));
        assert_eq!(parse_content_range("0-19/*"), Some(None));
        assert_eq!(parse_content_range("garbage"), None);
    }
}
