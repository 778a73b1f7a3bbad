//! The pod controller: single owner of all simulation state.
//!
//! Every user action (wizard steps, roster edits, work intake, approvals) and
//! every timer callback (simulation tick, meeting pick) is a method here with
//! `&mut self`, so each one is atomic with respect to the others.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{classify_work, deliverable_kind_for, is_risk_role};
use crate::error::{HivemindError, Result};
use crate::pod::{
    Deliverable, DeliverableFeed, LaborUnit, Phase, PhaseEvent, PhaseMachine, PodConfig, PodLog,
    Position, Roster, Tool, UnitPatch, UnitStatus, WorkKind, WorkUnit,
};
use crate::random::RandomSource;

/// Units required before a pod may deploy.
pub const MIN_DEPLOY_UNITS: usize = 3;
/// Units put to work by a single intake request.
pub const FANOUT_WIDTH: usize = 4;
/// Simulated seconds of labor billed per tick.
pub const SIMULATED_SECONDS_PER_TICK: f64 = 15.0;
/// Progress increments are drawn from `[MIN_INCREMENT, MIN_INCREMENT + INCREMENT_SPAN)`.
pub const MIN_INCREMENT: f64 = 15.0;
pub const INCREMENT_SPAN: f64 = 25.0;
pub const COMPLETE: f64 = 100.0;

const MANAGER_POSITION: Position = Position::new(50.0, 15.0);

pub const READY_LOG: &str = "[SYSTEM] HiveMind Control Plane Ready for Initialization...";
pub const RISK_LOG: &str = "[MGR] !!! PRODUCTION RISK: Deployment contains unverified main-branch dependencies. BLOCKING AUTOMATED MERGE. Awaiting human authority.";
pub const OVERRIDE_LOG: &str =
    "[MGR] HUMAN OVERRIDE GRANTED. Merging validated code blocks to staging.";

/// The single speech bubble shown on the office floor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueBubble {
    pub unit_id: String,
    pub text: String,
    pub expires_at: DateTime<Utc>,
}

/// Everything a view needs to render the pod.
#[derive(Debug, Clone, Serialize)]
pub struct PodState {
    pub phase: Phase,
    pub phase_history: Vec<Phase>,
    pub pod: PodConfig,
    pub roster: Roster,
    pub feed: DeliverableFeed,
    pub log: PodLog,
    pub active_work: Option<WorkUnit>,
    pub dialogue: Option<DialogueBubble>,
}

impl PodState {
    /// The bubble to render at `now`, if it has not yet expired.
    pub fn active_dialogue(&self, now: DateTime<Utc>) -> Option<&DialogueBubble> {
        self.dialogue.as_ref().filter(|d| d.expires_at > now)
    }
}

/// What one simulation tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Cost accrued this tick.
    pub spend: f64,
    /// Units that moved forward without finishing.
    pub advanced: Vec<String>,
    /// Units that finished and emitted a deliverable.
    pub delivered: Vec<String>,
    /// Units halted for approval.
    pub blocked: Vec<String>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.advanced.is_empty() && self.delivered.is_empty() && self.blocked.is_empty()
    }
}

pub struct PodController {
    state: PodState,
}

impl Default for PodController {
    fn default() -> Self {
        Self::new(PodConfig::default().budget)
    }
}

impl PodController {
    pub fn new(budget: f64) -> Self {
        let mut log = PodLog::default();
        log.push(READY_LOG);
        Self {
            state: PodState {
                phase: Phase::Charter,
                phase_history: Vec::new(),
                pod: PodConfig::with_budget(budget),
                roster: Roster::new(),
                feed: DeliverableFeed::new(),
                log,
                active_work: None,
                dialogue: None,
            },
        }
    }

    pub fn state(&self) -> &PodState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn pod(&self) -> &PodConfig {
        &self.state.pod
    }

    pub fn roster(&self) -> &Roster {
        &self.state.roster
    }

    pub fn feed(&self) -> &DeliverableFeed {
        &self.state.feed
    }

    pub fn log(&self) -> &PodLog {
        &self.state.log
    }

    pub fn active_work(&self) -> Option<&WorkUnit> {
        self.state.active_work.as_ref()
    }

    /// The simulation loop only runs while live with a work unit set.
    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Live && self.state.active_work.is_some()
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.state.log.push(line);
    }

    // ---------------------------------------------------------------------
    // Charter
    // ---------------------------------------------------------------------

    pub fn set_charter(&mut self, name: &str, goal: &str, approval_rule: &str) {
        self.state.pod.name = name.to_string();
        self.state.pod.goal = goal.to_string();
        self.state.pod.approval_rule = approval_rule.to_string();
    }

    pub fn set_budget(&mut self, budget: f64) {
        self.state.pod.budget = budget;
    }

    // ---------------------------------------------------------------------
    // Phase transitions
    // ---------------------------------------------------------------------

    fn transition(&mut self, event: PhaseEvent) -> Result<Phase> {
        let from = self.state.phase;
        let to = PhaseMachine::next(from, event)?;
        self.state.phase_history.push(from);
        self.state.phase = to;
        info!(%from, %to, "Phase transition");
        Ok(to)
    }

    pub fn recruit_workforce(&mut self) -> Result<Phase> {
        self.transition(PhaseEvent::RecruitWorkforce)
    }

    pub fn finalize_squad(&mut self) -> Result<Phase> {
        self.transition(PhaseEvent::FinalizeSquad)
    }

    /// Take the pod live.
    ///
    /// Fails without touching any state unless the pod is named and has at
    /// least [`MIN_DEPLOY_UNITS`] units. On success the first unit becomes
    /// the manager at the head desk, the rest fan out along the cubicle row,
    /// and everyone starts idle.
    pub fn deploy(&mut self) -> Result<Phase> {
        PhaseMachine::next(self.state.phase, PhaseEvent::Deploy)?;
        if self.state.pod.name.is_empty() {
            return Err(HivemindError::PodNameMissing);
        }
        let found = self.state.roster.len();
        if found < MIN_DEPLOY_UNITS {
            return Err(HivemindError::NotEnoughUnits {
                required: MIN_DEPLOY_UNITS,
                found,
            });
        }

        let to = self.transition(PhaseEvent::Deploy)?;
        for (idx, unit) in self.state.roster.iter_mut().enumerate() {
            unit.reset_idle();
            unit.is_manager = idx == 0;
            unit.position = if idx == 0 {
                MANAGER_POSITION
            } else {
                Position::new(20.0 + idx as f64 * 15.0, 55.0)
            };
        }

        let name = self.state.pod.name.clone();
        let budget = self.state.pod.budget;
        self.push_log(format!("[COMMAND] Deploying \"{name}\"..."));
        self.push_log(format!("[SYSTEM] Budget Lock: ${budget:.2}"));
        info!(pod = %name, units = found, budget, "Pod deployed");
        Ok(to)
    }

    /// Leave live back to charter. Roster, feed and log are kept; the active
    /// work unit is dropped so the loop stays stopped until new intake.
    pub fn terminate(&mut self) -> Result<Phase> {
        let to = self.transition(PhaseEvent::Terminate)?;
        self.state.active_work = None;
        self.state.dialogue = None;
        Ok(to)
    }

    // ---------------------------------------------------------------------
    // Roster editing
    // ---------------------------------------------------------------------

    fn require_phase(&self, expected: Phase) -> Result<()> {
        if self.state.phase != expected {
            return Err(HivemindError::WrongPhase {
                expected,
                actual: self.state.phase,
            });
        }
        Ok(())
    }

    /// Recruit a blank unit. Architect phase only.
    pub fn add_unit(&mut self) -> Result<String> {
        self.require_phase(Phase::Architect)?;
        self.state.roster.add(LaborUnit::recruit())
    }

    pub fn update_unit(&mut self, id: &str, patch: UnitPatch) -> bool {
        self.state.roster.update(id, patch)
    }

    pub fn toggle_tool(&mut self, id: &str, tool: Tool) -> bool {
        match self.state.roster.get_mut(id) {
            Some(unit) => {
                unit.toggle_tool(tool);
                true
            }
            None => false,
        }
    }

    /// Dismiss a unit. Architect phase only; unknown ids yield `Ok(false)`.
    pub fn remove_unit(&mut self, id: &str) -> Result<bool> {
        self.require_phase(Phase::Architect)?;
        Ok(self.state.roster.remove(id).is_some())
    }

    /// Toggle the single handoff from `source_id` to `target_id`.
    /// Self-handoffs are ignored.
    pub fn toggle_connection(&mut self, source_id: &str, target_id: &str) -> bool {
        if source_id == target_id {
            return false;
        }
        self.state.roster.toggle_connection(source_id, target_id)
    }

    // ---------------------------------------------------------------------
    // Work intake and approval
    // ---------------------------------------------------------------------

    /// Accept a work request and fan it out to the first [`FANOUT_WIDTH`]
    /// units. Returns the ids of the units put to work.
    pub fn submit_work(&mut self, content: &str) -> Result<Vec<String>> {
        self.require_phase(Phase::Live)?;
        if content.trim().is_empty() {
            return Err(HivemindError::EmptyWorkRequest);
        }

        let kind = classify_work(content);
        let work = WorkUnit::new(content.to_string(), kind);
        info!(work_id = %work.id, ?kind, "Work submitted");
        self.state.active_work = Some(work);

        match kind {
            WorkKind::Pr => {
                self.push_log("[MGR] PR #314 Detected: \"CI checks failing\". Initiating parallel decomposition...");
                self.push_log("[MGR] SUBTASK A: Backend refactor audit (Logic Check)");
                self.push_log("[MGR] SUBTASK B: CI Pipeline reconfiguration (Infra Check)");
                self.push_log("[MGR] SUBTASK C: Production policy compliance check (Safety Check)");
                self.push_log("[MGR] Deploying 3+ agents in parallel execution mode.");
            }
            WorkKind::Ticket | WorkKind::Custom => {
                self.push_log(format!(
                    "[MGR] Intake received: \"{content}\". Decomposing into subtasks."
                ));
            }
        }

        let mut started = Vec::new();
        for (idx, unit) in self.state.roster.iter_mut().enumerate().take(FANOUT_WIDTH) {
            unit.start_task(task_label(kind, idx));
            started.push(unit.id.clone());
        }
        Ok(started)
    }

    /// Human approval: release a unit back to idle. Unknown ids are a no-op.
    pub fn approve(&mut self, unit_id: &str) -> bool {
        let Some(unit) = self.state.roster.get_mut(unit_id) else {
            debug!(unit_id, "Approval for unknown unit ignored");
            return false;
        };
        unit.reset_idle();
        info!(unit_id, "Human override granted");
        self.push_log(OVERRIDE_LOG);
        true
    }

    /// Ids of units currently halted for approval, in roster order.
    pub fn awaiting_approval(&self) -> Vec<String> {
        self.state
            .roster
            .units()
            .iter()
            .filter(|u| u.status == UnitStatus::WaitingApproval)
            .map(|u| u.id.clone())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Simulation
    // ---------------------------------------------------------------------

    /// Advance every working unit by one tick.
    ///
    /// Does nothing unless [`is_running`](Self::is_running). A unit whose
    /// increment would reach 100 either halts at exactly 100 for approval
    /// (risk roles) or emits a deliverable and drops back to idle at 0, so
    /// progress never exceeds 100.
    pub fn tick(&mut self, rng: &mut dyn RandomSource) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_running() {
            return report;
        }

        for unit in self.state.roster.iter_mut() {
            if unit.status != UnitStatus::Working {
                continue;
            }

            report.spend += unit.cost_per_hour / 3600.0 * SIMULATED_SECONDS_PER_TICK;
            let increment = MIN_INCREMENT + rng.next_unit() * INCREMENT_SPAN;

            if unit.progress + increment < COMPLETE {
                unit.progress += increment;
                report.advanced.push(unit.id.clone());
                continue;
            }

            if is_risk_role(&unit.role) {
                unit.progress = COMPLETE;
                unit.status = UnitStatus::WaitingApproval;
                self.state.log.push(RISK_LOG);
                info!(unit_id = %unit.id, role = %unit.role, "Unit blocked for approval");
                report.blocked.push(unit.id.clone());
                continue;
            }

            let deliverable = Deliverable::new(
                &unit.id,
                deliverable_kind_for(unit),
                format!("{} Task Finalized", unit.role),
                format!(
                    "{} completed {}. Code validated via static analysis.",
                    if unit.name.is_empty() { "Unit" } else { unit.name.as_str() },
                    unit.current_task.as_deref().unwrap_or("sub-module"),
                ),
            );
            debug!(unit_id = %unit.id, kind = ?deliverable.kind, "Deliverable produced");
            self.state.feed.push(deliverable);
            unit.reset_idle();
            report.delivered.push(unit.id.clone());
        }

        self.state.pod.accrue(report.spend);
        debug!(
            spend = report.spend,
            total = self.state.pod.current_spend,
            "Tick complete"
        );
        report
    }

    /// Maybe pick a pair of connected units for a hallway meeting.
    ///
    /// Only working units with a handoff target qualify. With probability
    /// `chance` one of them is chosen along with one of its targets.
    pub fn pick_meeting(
        &self,
        rng: &mut dyn RandomSource,
        chance: f64,
    ) -> Option<(LaborUnit, LaborUnit)> {
        let candidates: Vec<&LaborUnit> = self
            .state
            .roster
            .units()
            .iter()
            .filter(|u| u.status == UnitStatus::Working && !u.connections.is_empty())
            .collect();
        if candidates.is_empty() || rng.next_unit() <= 1.0 - chance {
            return None;
        }
        let speaker = candidates[rng.pick(candidates.len())];
        let target_id = &speaker.connections[rng.pick(speaker.connections.len())];
        let listener = self.state.roster.get(target_id)?;
        Some((speaker.clone(), listener.clone()))
    }

    /// Replace the dialogue bubble. The newest bubble always wins.
    pub fn show_dialogue(&mut self, unit_id: &str, text: String, display: Duration) {
        let ttl = chrono::Duration::from_std(display).unwrap_or(chrono::Duration::zero());
        self.state.dialogue = Some(DialogueBubble {
            unit_id: unit_id.to_string(),
            text,
            expires_at: Utc::now() + ttl,
        });
    }
}

fn task_label(kind: WorkKind, idx: usize) -> String {
    match kind {
        WorkKind::Pr => {
            let subtask = char::from(b'A' + idx as u8);
            format!("Resolving PR #314 Subtask {subtask}")
        }
        WorkKind::Ticket | WorkKind::Custom => "Processing Task".to_string(),
    }
}
