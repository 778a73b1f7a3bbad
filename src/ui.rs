//! Terminal rendering of the office floor.
//!
//! [`FloorView`] keeps one `indicatif` bar per labor unit plus a spend bar,
//! and prints new log lines and deliverables above them as they appear.
//! Colors come from `console`.

use std::io;

use chrono::Utc;
use console::{Style, Term};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use crate::controller::PodState;
use crate::pod::{Deliverable, DeliverableKind, LaborUnit, ModelId, UnitStatus};

const UNIT_TEMPLATE: &str = "{prefix:<22} [{bar:30.cyan/blue}] {pos:>3}% {msg}";
const SPEND_TEMPLATE: &str = "{prefix:<22} [{bar:30.yellow/red}] {msg}";

pub struct FloorView {
    multi: MultiProgress,
    units: Vec<(String, ProgressBar)>,
    spend: ProgressBar,
    log_seen: usize,
    feed_seen: Option<String>,
    styles: Styles,
}

struct Styles {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
    dim: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
            dim: Style::new().dim(),
        }
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl FloorView {
    /// Lay out one bar per unit, in roster order, under a spend bar.
    pub fn new(state: &PodState) -> Self {
        Self::with_target(state, ProgressDrawTarget::stderr())
    }

    /// A view that draws nothing, for `--json` runs.
    pub fn hidden(state: &PodState) -> Self {
        Self::with_target(state, ProgressDrawTarget::hidden())
    }

    fn with_target(state: &PodState, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let spend = multi.add(ProgressBar::new(100));
        spend.set_style(bar_style(SPEND_TEMPLATE));
        spend.set_prefix(format!("{} spend", state.pod.name));

        let units = state
            .roster
            .units()
            .iter()
            .map(|unit| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(bar_style(UNIT_TEMPLATE));
                bar.set_prefix(unit_prefix(unit));
                (unit.id.clone(), bar)
            })
            .collect();

        Self {
            multi,
            units,
            spend,
            log_seen: 0,
            feed_seen: None,
            styles: Styles::default(),
        }
    }

    /// Bring every bar up to date and print anything new in the log or feed.
    pub fn refresh(&mut self, state: &PodState) {
        for (id, bar) in &self.units {
            let Some(unit) = state.roster.get(id) else {
                continue;
            };
            bar.set_position(unit.progress.round() as u64);
            bar.set_message(self.unit_message(unit));
        }

        let pct = state.pod.spend_percent();
        self.spend.set_position(pct.round() as u64);
        self.spend.set_message(format!(
            "${:.4} / ${:.2}",
            state.pod.current_spend, state.pod.budget
        ));

        let entries = state.log.entries();
        for entry in entries.iter().skip(self.log_seen) {
            self.print(self.log_line(&entry.line));
        }
        self.log_seen = entries.len();

        // The feed is newest-first; print everything above the last one seen.
        let fresh: Vec<&Deliverable> = state
            .feed
            .iter()
            .take_while(|d| Some(&d.id) != self.feed_seen.as_ref())
            .collect();
        for deliverable in fresh.iter().rev() {
            self.print(self.deliverable_line(deliverable));
        }
        if let Some(latest) = state.feed.latest() {
            self.feed_seen = Some(latest.id.clone());
        }

        if let Some(bubble) = state.active_dialogue(Utc::now()) {
            if let Some((_, bar)) = self.units.iter().find(|(id, _)| *id == bubble.unit_id) {
                bar.set_message(format!(
                    "{}",
                    self.styles.cyan.apply_to(bubble.text.replace('\n', " / "))
                ));
            }
        }
    }

    fn print(&self, line: String) {
        if let Err(e) = self.multi.println(line) {
            debug!(error = %e, "Failed to print above progress bars");
        }
    }

    pub fn finish(&self) {
        for (_, bar) in &self.units {
            bar.abandon();
        }
        self.spend.abandon();
    }

    fn unit_message(&self, unit: &LaborUnit) -> String {
        match unit.status {
            UnitStatus::Idle => format!("{}", self.styles.dim.apply_to("idle")),
            UnitStatus::Working => unit.current_task.clone().unwrap_or_default(),
            UnitStatus::WaitingApproval => {
                format!("{}", self.styles.red.apply_to("AWAITING APPROVAL"))
            }
        }
    }

    fn log_line(&self, line: &str) -> String {
        if line.contains("!!!") {
            format!("{}", self.styles.red.apply_to(line))
        } else if line.starts_with("[MGR]") {
            format!("{}", self.styles.yellow.apply_to(line))
        } else {
            format!("{}", self.styles.dim.apply_to(line))
        }
    }

    fn deliverable_line(&self, d: &Deliverable) -> String {
        let icon = match d.kind {
            DeliverableKind::Git => "⎇",
            DeliverableKind::Email => "✉",
            DeliverableKind::Code => "⌘",
            DeliverableKind::Report => "✎",
            DeliverableKind::Log => "✓",
            DeliverableKind::Risk => "⚠",
        };
        format!(
            "  {} {} {}",
            self.styles.green.apply_to(icon),
            d.title,
            self.styles.dim.apply_to(&d.text)
        )
    }
}

fn unit_prefix(unit: &LaborUnit) -> String {
    let label = unit.label();
    if unit.is_manager {
        format!("★ {label}")
    } else {
        format!("  {label}")
    }
}

/// Ask the operator on the terminal whether to release a blocked unit.
pub fn prompt_approval(term: &Term, unit: &LaborUnit) -> io::Result<bool> {
    term.write_line(&format!(
        "{} {} ({}) is holding a production merge. Approve? [y/N]",
        Style::new().red().bold().apply_to("!"),
        unit.label(),
        unit.role
    ))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// One-line summary once the run stops.
pub fn print_summary(state: &PodState) {
    let green = Style::new().green().bold();
    println!();
    println!(
        "  {} {}: {} deliverables, ${:.4} spent of ${:.2} ({:.1}%)",
        green.apply_to("✓"),
        state.pod.name,
        state.feed.len(),
        state.pod.current_spend,
        state.pod.budget,
        state.pod.spend_percent()
    );
}

pub fn print_model_catalog() {
    let bold = Style::new().bold();
    println!(
        "{}",
        bold.apply_to(format!(
            "{:<26} {:<16} {:>8} {:>10}  {}",
            "MODEL", "NAME", "$/HOUR", "RELIABLE", "SPECIALTY"
        ))
    );
    for model in ModelId::ALL {
        let meta = model.metadata();
        println!(
            "{:<26} {:<16} {:>8.2} {:>9.0}%  {}",
            model.as_str(),
            meta.name,
            meta.cost,
            meta.reliability * 100.0,
            meta.specialty
        );
    }
}

pub fn print_crew_config(yaml: &str) {
    let cyan = Style::new().cyan();
    println!("{}", cyan.apply_to("─── Crew Config ───"));
    println!("{yaml}");
}
