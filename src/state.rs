use std::collections::VecDeque;

use crate::filters::{ALL_LEAGUES, FilterPlan, FilterState, LeagueSelection, build_plan};
use crate::pagination::Pager;
use crate::records::MatchRecord;
use crate::refresh::PageSnapshot;
use crate::stats::{OutcomeCounts, StatsView, stats_view};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Odd1,
    OddX,
    Odd2,
    Tolerance,
    Search,
    Away,
    League,
}

impl Field {
    pub const ORDER: [Field; 7] = [
        Field::Odd1,
        Field::OddX,
        Field::Odd2,
        Field::Tolerance,
        Field::Search,
        Field::Away,
        Field::League,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Odd1 => "ODD1",
            Field::OddX => "ODDX",
            Field::Odd2 => "ODD2",
            Field::Tolerance => "Edge of Odds",
            Field::Search => "Find a team",
            Field::Away => "Away",
            Field::League => "By League",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Field::Odd1 | Field::OddX | Field::Odd2 | Field::Search)
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.index() + len - 1) % len]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshRequest {
    pub id: u64,
    pub plan: FilterPlan,
    pub window: (u64, u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    LoadTotal,
    LoadLeagues,
    Refresh(RefreshRequest),
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetTotal(u64),
    SetLeagues(Vec<String>),
    SetPage {
        request_id: u64,
        snapshot: PageSnapshot,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub filters: FilterState,
    pub pager: Pager,
    pub focus: Field,
    pub leagues: Vec<String>,
    pub total_records: u64,
    pub rows: Vec<MatchRecord>,
    pub counts: OutcomeCounts,
    pub selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub loading: bool,
    /// Set when a delta moved the page and the rows on screen are stale.
    pub needs_refresh: bool,
    last_request_id: u64,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: FilterState::default(),
            pager: Pager::new(page_size),
            focus: Field::Search,
            leagues: vec![ALL_LEAGUES.to_string()],
            total_records: 0,
            rows: Vec::new(),
            counts: OutcomeCounts::default(),
            selected: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            loading: false,
            needs_refresh: false,
            last_request_id: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Request for the current filters and page. Older requests become stale.
    pub fn begin_refresh(&mut self) -> RefreshRequest {
        self.last_request_id += 1;
        self.loading = true;
        self.needs_refresh = false;
        RefreshRequest {
            id: self.last_request_id,
            plan: build_plan(&self.filters),
            window: self.pager.window(),
        }
    }

    /// Any filter edit restarts from the first page.
    pub fn filters_changed(&mut self) -> RefreshRequest {
        self.pager.reset();
        self.selected = 0;
        self.begin_refresh()
    }

    pub fn stats_view(&self) -> StatsView {
        stats_view(&self.counts, self.filters.odds_targets())
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Odd1 => Some(&mut self.filters.odd1),
            Field::OddX => Some(&mut self.filters.oddx),
            Field::Odd2 => Some(&mut self.filters.odd2),
            Field::Search => Some(&mut self.filters.search),
            Field::Tolerance | Field::Away | Field::League => None,
        }
    }

    pub fn input_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.focused_text_mut() {
            Some(text) => {
                text.push(ch);
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) -> bool {
        match self.focused_text_mut() {
            Some(text) => text.pop().is_some(),
            None => false,
        }
    }

    pub fn clear_field(&mut self) -> bool {
        match self.focused_text_mut() {
            Some(text) if !text.is_empty() => {
                text.clear();
                true
            }
            _ => false,
        }
    }

    pub fn toggle_away(&mut self) -> bool {
        self.filters.away = !self.filters.away;
        true
    }

    pub fn cycle_league(&mut self, forward: bool) -> bool {
        if self.leagues.len() < 2 {
            return false;
        }
        let len = self.leagues.len();
        let current = self
            .leagues
            .iter()
            .position(|l| l == self.filters.league.label())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.filters.league = LeagueSelection::from_label(&self.leagues[next]);
        true
    }

    /// The refresh itself is debounced, but paging from here on must
    /// already start over from the first page.
    pub fn step_tolerance(&mut self, delta: f64) -> bool {
        if !self.filters.step_tolerance(delta) {
            return false;
        }
        self.pager.reset();
        self.selected = 0;
        true
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTotal(total) => state.total_records = total,
        Delta::SetLeagues(leagues) => {
            let current = state.filters.league.label().to_string();
            state.leagues = if leagues.is_empty() {
                vec![ALL_LEAGUES.to_string()]
            } else {
                leagues
            };
            if !state.leagues.iter().any(|l| *l == current) {
                state.filters.league = LeagueSelection::All;
            }
        }
        Delta::SetPage {
            request_id,
            snapshot,
        } => {
            if request_id != state.last_request_id {
                return;
            }
            state.loading = false;
            let page_before = state.pager.page();
            state.pager.set_filtered_total(snapshot.counts.filtered);
            state.counts = snapshot.counts;
            state.rows = snapshot.rows;
            state.selected = state.selected.min(state.rows.len().saturating_sub(1));
            if state.pager.page() != page_before {
                state.needs_refresh = true;
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
