use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::leagues::load_leagues;
use crate::refresh::{load_page, load_total};
use crate::retry::RetryPolicy;
use crate::state::{Delta, ProviderCommand};
use crate::store::MatchStore;

/// Owns the store and runs queries one after another off the UI thread.
/// Exits when the command channel closes.
pub fn spawn_query_worker(
    mut store: Box<dyn MatchStore + Send>,
    policy: RetryPolicy,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(first) = cmd_rx.recv() {
            let mut batch = vec![first];
            while let Ok(cmd) = cmd_rx.try_recv() {
                batch.push(cmd);
            }
            for cmd in coalesce(batch) {
                if !run_command(store.as_mut(), &policy, cmd, &tx) {
                    return;
                }
            }
        }
    })
}

/// Drops duplicate loads and every refresh but the newest.
pub fn coalesce(batch: Vec<ProviderCommand>) -> Vec<ProviderCommand> {
    let mut out = Vec::with_capacity(3);
    let mut latest_refresh = None;
    for cmd in batch {
        match cmd {
            ProviderCommand::Refresh(req) => latest_refresh = Some(req),
            other => {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
    }
    if let Some(req) = latest_refresh {
        out.push(ProviderCommand::Refresh(req));
    }
    out
}

/// Returns false once the UI side has hung up.
pub fn run_command(
    store: &mut (dyn MatchStore + Send),
    policy: &RetryPolicy,
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
) -> bool {
    let mut log = |msg: String| {
        let _ = tx.send(Delta::Log(msg));
    };
    let delta = match cmd {
        ProviderCommand::LoadTotal => Delta::SetTotal(load_total(store, policy, &mut log)),
        ProviderCommand::LoadLeagues => Delta::SetLeagues(load_leagues(store, policy, &mut log)),
        ProviderCommand::Refresh(req) => Delta::SetPage {
            request_id: req.id,
            snapshot: load_page(store, policy, &req.plan, req.window, &mut log),
        },
    };
    tx.send(delta).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterPlan;
    use crate::state::RefreshRequest;

    fn refresh(id: u64) -> ProviderCommand {
        ProviderCommand::Refresh(RefreshRequest {
            id,
            plan: FilterPlan::Conditions(Vec::new()),
            window: (0, 20),
        })
    }

    #[test]
    fn coalesce_keeps_newest_refresh_last() {
        let out = coalesce(vec![
            refresh(1),
            ProviderCommand::LoadTotal,
            refresh(2),
            ProviderCommand::LoadTotal,
            ProviderCommand::LoadLeagues,
            refresh(3),
        ]);
        assert_eq!(
            out,
            vec![
                ProviderCommand::LoadTotal,
                ProviderCommand::LoadLeagues,
                refresh(3)
            ]
        );
    }
}
