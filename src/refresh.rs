//! One full refresh: the page rows plus the five statistic counts, each
//! call wrapped in the retry policy and defaulted on failure.

use crate::filters::FilterPlan;
use crate::pagination::Pager;
use crate::postgrest::{Condition, Query};
use crate::records::{Column, MatchRecord};
use crate::retry::{RetryPolicy, execute_with_retry};
use crate::stats::{OutcomeCounts, StatKind};
use crate::store::{MatchStore, QueryError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub rows: Vec<MatchRecord>,
    pub counts: OutcomeCounts,
}

pub fn page_query(conditions: &[Condition], offset: u64, limit: u64) -> Query {
    Query::select("*")
        .filters(conditions.iter().cloned())
        .order_by(Column::Id, true)
        .window(offset, limit)
}

pub fn stat_query(conditions: &[Condition], kind: StatKind) -> Query {
    Query::select("ID")
        .filter(kind.condition())
        .filters(conditions.iter().cloned())
}

pub fn load_page<S>(
    store: &mut S,
    policy: &RetryPolicy,
    plan: &FilterPlan,
    window: (u64, u64),
    log: &mut dyn FnMut(String),
) -> PageSnapshot
where
    S: MatchStore + ?Sized,
{
    let Some(conditions) = plan.conditions() else {
        return PageSnapshot::default();
    };

    let (offset, limit) = window;
    let query = page_query(conditions, offset, limit);
    let page = match with_retry(store, policy, log, |s| s.select_rows(&query)) {
        Ok(page) => page,
        Err(err) => {
            log(format!("[WARN] Page query failed: {err}"));
            return PageSnapshot::default();
        }
    };

    let mut counts = OutcomeCounts::default();
    counts.filtered = match page.total {
        Some(total) => total,
        None => {
            let count_query = Query::select("ID").filters(conditions.iter().cloned());
            with_retry(store, policy, log, |s| s.count(&count_query)).unwrap_or_else(|err| {
                log(format!("[WARN] Filtered count failed: {err}"));
                0
            })
        }
    };

    for kind in StatKind::ALL {
        let query = stat_query(conditions, kind);
        let count = with_retry(store, policy, log, |s| s.count(&query)).unwrap_or_else(|err| {
            log(format!("[WARN] {} count failed: {err}", kind.label()));
            0
        });
        counts.set(kind, count);
    }

    PageSnapshot {
        rows: page.rows,
        counts,
    }
}

/// Loads `page`, falling back to the last page when the filtered total
/// turns out smaller. The returned pager reflects the page actually shown.
pub fn load_page_clamped<S>(
    store: &mut S,
    policy: &RetryPolicy,
    plan: &FilterPlan,
    page: usize,
    page_size: usize,
    log: &mut dyn FnMut(String),
) -> (PageSnapshot, Pager)
where
    S: MatchStore + ?Sized,
{
    let mut pager = Pager::new(page_size);
    let size = pager.page_size() as u64;
    let offset = (page as u64).saturating_mul(size);
    let mut snapshot = load_page(store, policy, plan, (offset, size), log);

    pager.set_filtered_total(snapshot.counts.filtered);
    pager.go_to(page);
    if pager.page() != page {
        snapshot = load_page(store, policy, plan, pager.window(), log);
        pager.set_filtered_total(snapshot.counts.filtered);
    }
    (snapshot, pager)
}

pub fn load_total<S>(store: &mut S, policy: &RetryPolicy, log: &mut dyn FnMut(String)) -> u64
where
    S: MatchStore + ?Sized,
{
    let query = Query::select("ID");
    with_retry(store, policy, log, |s| s.count(&query)).unwrap_or_else(|err| {
        log(format!("[WARN] Total count failed: {err}"));
        0
    })
}

pub(crate) fn with_retry<S, T>(
    store: &mut S,
    policy: &RetryPolicy,
    log: &mut dyn FnMut(String),
    op: impl FnMut(&S) -> Result<T, QueryError>,
) -> Result<T, QueryError>
where
    S: MatchStore + ?Sized,
{
    execute_with_retry(
        store,
        policy,
        |attempt, max, err| {
            log(format!(
                "[WARN] Connection lost, retrying ({attempt}/{max}): {err}"
            ))
        },
        op,
    )
}
