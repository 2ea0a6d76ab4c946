use anyhow::{Context, Result, bail};

use betsmarter_terminal::config::AppConfig;
use betsmarter_terminal::filters::{FilterState, LeagueSelection, build_plan};
use betsmarter_terminal::leagues::load_leagues;
use betsmarter_terminal::open_store;
use betsmarter_terminal::records::odds_label;
use betsmarter_terminal::refresh::{load_page_clamped, load_total};
use betsmarter_terminal::stats::{format_count, stats_view};

struct SnapshotArgs {
    filters: FilterState,
    page: usize,
    list_leagues: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1).collect())?;
    let cfg = AppConfig::from_env()?;
    let mut store = open_store(&cfg.source)?;
    let mut log = |msg: String| eprintln!("{msg}");

    if args.list_leagues {
        for league in load_leagues(store.as_mut(), &cfg.retry, &mut log) {
            println!("{league}");
        }
        return Ok(());
    }

    let total = load_total(store.as_mut(), &cfg.retry, &mut log);
    let plan = build_plan(&args.filters);
    let (snapshot, pager) = load_page_clamped(
        store.as_mut(),
        &cfg.retry,
        &plan,
        args.page,
        cfg.page_size,
        &mut log,
    );
    if pager.page() != args.page {
        eprintln!(
            "[WARN] Page {} is past the end, showing last page {}",
            args.page.saturating_add(1),
            pager.last_page() + 1
        );
    }

    println!("BET SMARTER snapshot");
    println!("Table rows: {}", format_count(total));
    println!(
        "Page {}/{} | {}",
        pager.page() + 1,
        pager.last_page() + 1,
        pager.range_label()
    );
    println!();

    for m in &snapshot.rows {
        println!(
            "{:<17} {:<8} {:<24} {:<24} {:>6} {:>6} {:>6} {:>2} {:>5}",
            m.kickoff_label(),
            m.league.as_deref().unwrap_or("-"),
            m.team1.as_deref().unwrap_or("-"),
            m.team2.as_deref().unwrap_or("-"),
            odds_label(m.odd1),
            odds_label(m.oddx),
            odds_label(m.odd2),
            m.result_label(),
            m.score_label(),
        );
    }
    if snapshot.rows.is_empty() {
        println!("No matches for these filters");
    }

    let view = stats_view(&snapshot.counts, args.filters.odds_targets());
    println!();
    println!("Games: {}", format_count(view.filtered));
    for cell in &view.cells {
        println!("  {:<4} {}", cell.kind.label(), cell.label());
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<SnapshotArgs> {
    let mut filters = FilterState::default();
    let mut page = 0usize;
    let mut list_leagues = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        match flag.as_str() {
            "--away" => filters.away = true,
            "--leagues" => list_leagues = true,
            "--search" | "--league" | "--odd1" | "--oddx" | "--odd2" | "--edge" | "--page" => {
                let value = match inline {
                    Some(value) => value,
                    None => iter
                        .next()
                        .with_context(|| format!("{flag} needs a value"))?,
                };
                match flag.as_str() {
                    "--search" => filters.search = value,
                    "--league" => filters.league = LeagueSelection::from_label(&value),
                    "--odd1" => filters.odd1 = value,
                    "--oddx" => filters.oddx = value,
                    "--odd2" => filters.odd2 = value,
                    "--edge" => filters.tolerance = value,
                    _ => {
                        let one_based: usize = value
                            .trim()
                            .parse()
                            .with_context(|| format!("invalid page: {value}"))?;
                        page = one_based.saturating_sub(1);
                    }
                }
            }
            other => bail!(
                "unknown argument: {other}\nusage: odds_snapshot [--search TEXT] [--away] [--league NAME] [--odd1 N] [--oddx N] [--odd2 N] [--edge N] [--page N] [--leagues]"
            ),
        }
    }

    Ok(SnapshotArgs {
        filters,
        page,
        list_leagues,
    })
}
