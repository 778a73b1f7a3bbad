use std::collections::HashSet;

use anyhow::Context;
use clap::Parser;
use console::Term;
use tracing::{info, warn};

use hivemind::anthropic::AnthropicClient;
use hivemind::cli::{Cli, Command};
use hivemind::config::HivemindConfig;
use hivemind::controller::{PodController, PodState};
use hivemind::export::render_crew_config;
use hivemind::manifest::PodManifest;
use hivemind::narrative::Narrator;
use hivemind::pod::UnitStatus;
use hivemind::session::Session;
use hivemind::ui::{self, FloorView};

struct RunOptions {
    seed: Option<u64>,
    json: bool,
    auto_approve: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "hivemind=debug" } else { "hivemind=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = HivemindConfig::load().context("failed to load hivemind.toml")?;
    if let Some(ms) = cli.tick_ms {
        config.tick_interval_ms = ms;
    }
    if let Some(max) = cli.max_ticks {
        config.max_ticks = max;
    }
    config.validate()?;

    match cli.command {
        Command::Run {
            manifest,
            work,
            auto_approve,
        } => {
            let pod = PodManifest::load(&manifest)
                .with_context(|| format!("failed to load manifest {}", manifest.display()))?;
            let opts = RunOptions {
                seed: cli.seed,
                json: cli.json,
                auto_approve,
            };
            run_pod(&config, pod, &work, opts).await
        }
        Command::Demo { work, auto_approve } => {
            let opts = RunOptions {
                seed: cli.seed,
                json: cli.json,
                auto_approve,
            };
            run_pod(&config, PodManifest::demo(), &work, opts).await
        }
        Command::Export { manifest } => {
            let pod = match manifest {
                Some(path) => PodManifest::load(&path)
                    .with_context(|| format!("failed to load manifest {}", path.display()))?,
                None => PodManifest::demo(),
            };
            let mut controller = PodController::new(config.default_budget);
            pod.apply(&mut controller)?;
            ui::print_crew_config(&render_crew_config(controller.roster().units()));
            Ok(())
        }
        Command::Models => {
            ui::print_model_catalog();
            Ok(())
        }
    }
}

async fn run_pod(
    config: &HivemindConfig,
    manifest: PodManifest,
    work: &str,
    opts: RunOptions,
) -> anyhow::Result<()> {
    let mut controller = PodController::new(config.default_budget);
    manifest.apply(&mut controller)?;

    let client = if config.api_key.is_empty() {
        info!("No API key configured, narrator running offline");
        None
    } else {
        Some(AnthropicClient::new(config.api_key.clone())?)
    };
    let narrator = Narrator::new(client, config.narrative_model.clone());

    let mut session = Session::new(controller, narrator, config.timing());
    if let Some(seed) = opts.seed {
        session = session.with_seed(seed);
    }
    session.deploy().await?;

    let initial = session.snapshot().await;
    let mut view = if opts.json {
        FloorView::hidden(&initial)
    } else {
        FloorView::new(&initial)
    };
    session.submit_work(work).await?;

    let term = Term::stderr();
    let mut declined: HashSet<String> = HashSet::new();
    let mut poll = tokio::time::interval(config.timing().tick);

    for _ in 0..=config.max_ticks {
        tokio::select! {
            _ = poll.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping pod");
                break;
            }
        }

        let state = session.snapshot().await;
        view.refresh(&state);

        let pending: Vec<String> = blocked_units(&state)
            .filter(|id| !declined.contains(id))
            .collect();
        for id in &pending {
            let approved = if opts.auto_approve {
                true
            } else {
                let Some(unit) = state.roster.get(id) else {
                    continue;
                };
                tokio::task::block_in_place(|| ui::prompt_approval(&term, unit))?
            };
            if approved {
                session.approve(id).await;
            } else {
                declined.insert(id.clone());
            }
        }

        let working = state
            .roster
            .units()
            .iter()
            .any(|u| u.status == UnitStatus::Working);
        if !working && pending.is_empty() {
            break;
        }
    }

    let state = session.shutdown().await;
    view.refresh(&state);
    view.finish();

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        ui::print_summary(&state);
    }
    Ok(())
}

fn blocked_units(state: &PodState) -> impl Iterator<Item = String> + '_ {
    state
        .roster
        .units()
        .iter()
        .filter(|u| u.status == UnitStatus::WaitingApproval)
        .map(|u| u.id.clone())
}
