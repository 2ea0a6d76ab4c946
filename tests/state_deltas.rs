use betsmarter_terminal::filters::{ALL_LEAGUES, FilterPlan, LeagueSelection};
use betsmarter_terminal::records::MatchRecord;
use betsmarter_terminal::refresh::PageSnapshot;
use betsmarter_terminal::state::{AppState, Delta, Field, apply_delta};
use betsmarter_terminal::stats::OutcomeCounts;

fn record(id: i64) -> MatchRecord {
    MatchRecord {
        id,
        date: Some("2024-09-01".to_string()),
        time: Some("18:00".to_string()),
        league: Some("Ita1".to_string()),
        team1: Some("Milan".to_string()),
        team2: Some("Lazio".to_string()),
        odd1: Some(2.05),
        oddx: Some(3.5),
        odd2: Some(3.6),
        result: None,
        goal1: None,
        goal2: None,
    }
}

fn snapshot(ids: &[i64], filtered: u64) -> PageSnapshot {
    PageSnapshot {
        rows: ids.iter().copied().map(record).collect(),
        counts: OutcomeCounts {
            filtered,
            ..OutcomeCounts::default()
        },
    }
}

#[test]
fn filter_change_resets_page_and_selection() {
    let mut state = AppState::new(20);
    let first = state.begin_refresh();
    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: first.id,
            snapshot: snapshot(&[3, 2, 1], 45),
        },
    );
    assert!(state.pager.go_last());
    state.selected = 2;

    state.focus = Field::Search;
    assert!(state.input_char('m'));
    let req = state.filters_changed();
    assert_eq!(state.pager.page(), 0);
    assert_eq!(state.selected, 0);
    assert_eq!(req.window, (0, 20));
    assert_eq!(req.plan, FilterPlan::NoMatch);
    assert!(state.loading);
}

#[test]
fn tolerance_step_resets_page_before_debounced_refresh() {
    let mut state = AppState::new(20);
    let req = state.begin_refresh();
    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: req.id,
            snapshot: snapshot(&[3, 2, 1], 45),
        },
    );
    assert!(state.pager.go_last());

    assert!(state.step_tolerance(0.05));
    assert_eq!(state.filters.tolerance, "0.05");
    assert_eq!(state.pager.page(), 0);

    // Paging before the debounce fires already uses the new filter.
    assert!(state.pager.go_next());
    let req = state.begin_refresh();
    assert_eq!(req.window, (20, 20));

    assert!(!state.step_tolerance(-0.10));
    assert_eq!(state.pager.page(), 1);
}

#[test]
fn stale_page_is_dropped() {
    let mut state = AppState::new(20);
    let older = state.begin_refresh();
    let newer = state.begin_refresh();

    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: older.id,
            snapshot: snapshot(&[9], 1),
        },
    );
    assert!(state.rows.is_empty());
    assert!(state.loading);

    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: newer.id,
            snapshot: snapshot(&[8, 7], 2),
        },
    );
    assert_eq!(state.rows.len(), 2);
    assert_eq!(state.counts.filtered, 2);
    assert!(!state.loading);
}

#[test]
fn shrinking_total_clamps_page_and_requests_refresh() {
    let mut state = AppState::new(20);
    let req = state.begin_refresh();
    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: req.id,
            snapshot: snapshot(&[1], 45),
        },
    );
    state.pager.go_last();
    let req = state.begin_refresh();
    assert_eq!(req.window, (40, 20));

    apply_delta(
        &mut state,
        Delta::SetPage {
            request_id: req.id,
            snapshot: snapshot(&[], 10),
        },
    );
    assert_eq!(state.pager.page(), 0);
    assert!(state.needs_refresh);
}

#[test]
fn league_list_replacement_keeps_valid_selection() {
    let mut state = AppState::new(20);
    apply_delta(
        &mut state,
        Delta::SetLeagues(vec![
            ALL_LEAGUES.to_string(),
            "Eng1".to_string(),
            "Ita1".to_string(),
        ]),
    );
    assert!(state.cycle_league(true));
    assert_eq!(state.filters.league, LeagueSelection::Named("Eng1".to_string()));
    assert!(state.cycle_league(false));
    assert!(state.cycle_league(false));
    assert_eq!(state.filters.league, LeagueSelection::Named("Ita1".to_string()));

    apply_delta(
        &mut state,
        Delta::SetLeagues(vec![ALL_LEAGUES.to_string(), "Ita1".to_string()]),
    );
    assert_eq!(state.filters.league, LeagueSelection::Named("Ita1".to_string()));

    apply_delta(&mut state, Delta::SetLeagues(Vec::new()));
    assert_eq!(state.leagues, [ALL_LEAGUES]);
    assert_eq!(state.filters.league, LeagueSelection::All);
}

#[test]
fn text_editing_only_touches_text_fields() {
    let mut state = AppState::new(20);
    state.focus = Field::Odd1;
    assert!(state.input_char('2'));
    assert!(state.input_char(','));
    assert!(state.input_char('1'));
    assert_eq!(state.filters.odd1, "2,1");
    assert!(state.backspace());
    assert_eq!(state.filters.odd1, "2,");
    assert!(state.clear_field());
    assert!(!state.clear_field());

    state.focus = Field::Tolerance;
    assert!(!state.input_char('5'));
    assert_eq!(state.filters.tolerance, "0.00");
}

#[test]
fn logs_are_bounded() {
    let mut state = AppState::new(20);
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] line 249"));
}
