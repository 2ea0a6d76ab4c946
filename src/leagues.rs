use std::collections::BTreeSet;

use crate::filters::ALL_LEAGUES;
use crate::records::Column;
use crate::refresh::with_retry;
use crate::retry::RetryPolicy;
use crate::store::{MatchStore, QueryError};

/// Always offered, whether or not the table currently has rows for them.
pub const FORCED_LEAGUES: [&str; 9] = ["ChL", "EuL", "ICC", "Ger", "Mar", "Eng", "Fra", "LE", "Cl"];

/// Offered right after the forced block when present in the table.
pub const FAVORITE_LEAGUES: [&str; 11] = [
    "Eng1", "Spa1", "Spa2", "Spa", "Ger1", "Ita1", "Fra1", "Ned1", "Mar1", "Ita", "Por1",
];

const LEAGUE_PAGE_ROWS: u64 = 1000;
const MAX_LEAGUE_PAGES: u64 = 1000;

/// Dropdown order: sentinel, forced, favourites present, rest alphabetical.
pub fn order_leagues<I, T>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let present: BTreeSet<String> = raw
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty() && s != ALL_LEAGUES)
        .collect();

    let mut out = Vec::with_capacity(present.len() + FORCED_LEAGUES.len() + 1);
    out.push(ALL_LEAGUES.to_string());
    for league in FORCED_LEAGUES {
        out.push(league.to_string());
    }
    for league in FAVORITE_LEAGUES {
        if present.contains(league) && !out.iter().any(|l| l == league) {
            out.push(league.to_string());
        }
    }
    for league in &present {
        if !out.iter().any(|l| l == league) {
            out.push(league.clone());
        }
    }
    out
}

/// Distinct `LEAGUE` values, read in windows until a short page.
pub fn fetch_league_values<S>(
    store: &mut S,
    policy: &RetryPolicy,
    log: &mut dyn FnMut(String),
) -> Result<BTreeSet<String>, QueryError>
where
    S: MatchStore + ?Sized,
{
    let mut values = BTreeSet::new();
    for page in 0..MAX_LEAGUE_PAGES {
        let offset = page * LEAGUE_PAGE_ROWS;
        let chunk = with_retry(store, policy, log, |s| {
            s.select_column(Column::League, offset, LEAGUE_PAGE_ROWS)
        })?;
        let len = chunk.len() as u64;
        values.extend(
            chunk
                .into_iter()
                .flatten()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
        if len < LEAGUE_PAGE_ROWS {
            break;
        }
    }
    Ok(values)
}

/// Ordered dropdown entries; only the sentinel when the read fails.
pub fn load_leagues<S>(store: &mut S, policy: &RetryPolicy, log: &mut dyn FnMut(String)) -> Vec<String>
where
    S: MatchStore + ?Sized,
{
    match fetch_league_values(store, policy, log) {
        Ok(values) if values.is_empty() => {
            log("[INFO] No league found".to_string());
            vec![ALL_LEAGUES.to_string()]
        }
        Ok(values) => order_leagues(values),
        Err(err) => {
            log(format!("[WARN] Error retrieving leagues: {err}"));
            vec![ALL_LEAGUES.to_string()]
        }
    }
}
