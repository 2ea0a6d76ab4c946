use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Columns of the odds table referenced by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Date,
    Time,
    League,
    Team1,
    Team2,
    Odd1,
    OddX,
    Odd2,
    Result,
    Goal1,
    Goal2,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Date => "DATE",
            Column::Time => "H",
            Column::League => "LEAGUE",
            Column::Team1 => "TEAM1",
            Column::Team2 => "TEAM2",
            Column::Odd1 => "ODD1",
            Column::OddX => "ODDX",
            Column::Odd2 => "ODD2",
            Column::Result => "RESULT",
            Column::Goal1 => "GOAL1",
            Column::Goal2 => "GOAL2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(Outcome::Home),
            "X" | "x" => Some(Outcome::Draw),
            "2" => Some(Outcome::Away),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "DATE", default, deserialize_with = "de_opt_string")]
    pub date: Option<String>,
    #[serde(rename = "H", default, deserialize_with = "de_opt_string")]
    pub time: Option<String>,
    #[serde(rename = "LEAGUE", default, deserialize_with = "de_opt_string")]
    pub league: Option<String>,
    #[serde(rename = "TEAM1", default, deserialize_with = "de_opt_string")]
    pub team1: Option<String>,
    #[serde(rename = "TEAM2", default, deserialize_with = "de_opt_string")]
    pub team2: Option<String>,
    #[serde(rename = "ODD1", default, deserialize_with = "de_opt_f64")]
    pub odd1: Option<f64>,
    #[serde(rename = "ODDX", default, deserialize_with = "de_opt_f64")]
    pub oddx: Option<f64>,
    #[serde(rename = "ODD2", default, deserialize_with = "de_opt_f64")]
    pub odd2: Option<f64>,
    #[serde(rename = "RESULT", default, deserialize_with = "de_opt_outcome")]
    pub result: Option<Outcome>,
    #[serde(rename = "GOAL1", default, deserialize_with = "de_opt_i64")]
    pub goal1: Option<i64>,
    #[serde(rename = "GOAL2", default, deserialize_with = "de_opt_i64")]
    pub goal2: Option<i64>,
}

/// A single cell as seen by predicate evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Int(i64),
    Num(f64),
    Text(&'a str),
}

impl MatchRecord {
    pub fn field(&self, column: Column) -> FieldValue<'_> {
        fn text(v: &Option<String>) -> FieldValue<'_> {
            v.as_deref().map(FieldValue::Text).unwrap_or(FieldValue::Null)
        }
        fn num(v: Option<f64>) -> FieldValue<'static> {
            v.map(FieldValue::Num).unwrap_or(FieldValue::Null)
        }
        fn int(v: Option<i64>) -> FieldValue<'static> {
            v.map(FieldValue::Int).unwrap_or(FieldValue::Null)
        }
        match column {
            Column::Id => FieldValue::Int(self.id),
            Column::Date => text(&self.date),
            Column::Time => text(&self.time),
            Column::League => text(&self.league),
            Column::Team1 => text(&self.team1),
            Column::Team2 => text(&self.team2),
            Column::Odd1 => num(self.odd1),
            Column::OddX => num(self.oddx),
            Column::Odd2 => num(self.odd2),
            Column::Result => self
                .result
                .map(|o| FieldValue::Text(o.code()))
                .unwrap_or(FieldValue::Null),
            Column::Goal1 => int(self.goal1),
            Column::Goal2 => int(self.goal2),
        }
    }

    pub fn total_goals(&self) -> Option<i64> {
        Some(self.goal1? + self.goal2?)
    }

    pub fn score_label(&self) -> String {
        match (self.goal1, self.goal2) {
            (Some(h), Some(a)) => format!("{h} - {a}"),
            _ => "-".to_string(),
        }
    }

    pub fn kickoff_label(&self) -> String {
        format_kickoff(self.date.as_deref(), self.time.as_deref())
    }

    pub fn result_label(&self) -> &'static str {
        self.result.map(Outcome::code).unwrap_or("-")
    }
}

pub fn odds_label(odd: Option<f64>) -> String {
    odd.map(|o| format!("{o:.2}")).unwrap_or_else(|| "-".to_string())
}

/// `DATE` and `H` joined; normalized to `YYYY-MM-DD HH:MM` when parseable.
pub fn format_kickoff(date: Option<&str>, time: Option<&str>) -> String {
    let date = date.map(str::trim).unwrap_or("");
    let time = time.map(str::trim).unwrap_or("");
    if date.is_empty() && time.is_empty() {
        return "TBD".to_string();
    }
    let joined = format!("{date} {time}").trim().to_string();
    if let Some(dt) = parse_kickoff(&joined) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    joined
}

fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 8] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d/%m/%y %H:%M",
        "%d.%m.%Y %H:%M",
        "%d.%m.%y %H:%M",
        "%d-%m-%Y %H:%M",
    ];

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}

pub fn parse_records_json(raw: &str) -> anyhow::Result<Vec<MatchRecord>> {
    use anyhow::Context;

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<MatchRecord>>(trimmed).context("invalid match rows json")
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn de_opt_outcome<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Outcome>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Outcome::from_code(&s),
        Some(Value::Number(n)) => Outcome::from_code(&n.to_string()),
        _ => None,
    })
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_row_decodes_strings_and_blanks() {
        let raw = r#"{"ID":7,"DATE":"2024-11-23","H":"20:45","LEAGUE":" Eng1 ",
            "TEAM1":"Arsenal","TEAM2":"Chelsea","ODD1":"2,10","ODDX":3.4,"ODD2":"",
            "RESULT":"x","GOAL1":"1","GOAL2":1.0}"#;
        let row: MatchRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(row.league.as_deref(), Some("Eng1"));
        assert_eq!(row.odd1, Some(2.10));
        assert_eq!(row.odd2, None);
        assert_eq!(row.result, Some(Outcome::Draw));
        assert_eq!(row.total_goals(), Some(2));
        assert_eq!(row.kickoff_label(), "2024-11-23 20:45");
    }

    #[test]
    fn unknown_result_code_is_unset() {
        let raw = r#"{"ID":1,"RESULT":"P"}"#;
        let row: MatchRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(row.result, None);
        assert_eq!(row.result_label(), "-");
        assert_eq!(row.score_label(), "-");
    }

    #[test]
    fn kickoff_falls_back_to_raw_text() {
        assert_eq!(format_kickoff(Some("23/11/2024"), Some("20:45")), "2024-11-23 20:45");
        assert_eq!(format_kickoff(Some("Sat"), None), "Sat");
        assert_eq!(format_kickoff(None, None), "TBD");
    }
}
