//! Periodic tasks that animate a live pod.
//!
//! A [`Scheduler`] owns every task it spawns in one `JoinSet`: the simulation
//! tick, the meeting trigger and any in-flight narrative fetches. `stop`
//! signals shutdown and joins them all, so once it returns nothing can touch
//! the controller again. Dropping a scheduler aborts its tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::anthropic::MessageSender;
use crate::config::Timing;
use crate::controller::PodController;
use crate::narrative::Narrator;
use crate::pod::LaborUnit;
use crate::random::RandomSource;

pub type SharedController = Arc<Mutex<PodController>>;

pub struct Scheduler {
    tasks: JoinSet<()>,
    shutdown: watch::Sender<bool>,
}

impl Scheduler {
    /// Spawn the simulation tick and the meeting trigger.
    pub fn start<S>(
        controller: SharedController,
        narrator: Arc<Narrator<S>>,
        timing: Timing,
        sim_rng: Box<dyn RandomSource>,
        meeting_rng: Box<dyn RandomSource>,
    ) -> Self
    where
        S: MessageSender + 'static,
    {
        let (shutdown, _) = watch::channel(false);
        let mut tasks = JoinSet::new();

        tasks.spawn(run_simulation(
            Arc::clone(&controller),
            timing.tick,
            sim_rng,
            shutdown.subscribe(),
        ));
        tasks.spawn(run_meetings(
            controller,
            narrator,
            timing,
            meeting_rng,
            shutdown.subscribe(),
        ));

        info!(
            tick_ms = timing.tick.as_millis() as u64,
            meeting_ms = timing.meeting.as_millis() as u64,
            "Scheduler started"
        );
        Self { tasks, shutdown }
    }

    /// Fetch a narrative log line for `unit` and append it to the pod log
    /// when it arrives. Abandoned if the scheduler stops first.
    pub fn spawn_log_line<S>(
        &mut self,
        controller: SharedController,
        narrator: Arc<Narrator<S>>,
        unit: LaborUnit,
        task: String,
    ) where
        S: MessageSender + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {}
                line = narrator.log_line(&unit, &task) => {
                    controller
                        .lock()
                        .await
                        .push_log(format!("[{}] {line}", unit.label()));
                }
            }
        });
    }

    /// Signal shutdown and wait for every task to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        while let Some(res) = self.tasks.join_next().await {
            match res {
                Err(e) if !e.is_cancelled() => {
                    warn!(error = %e, "Scheduler task ended abnormally");
                }
                _ => {}
            }
        }
        info!("Scheduler stopped");
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    // First tick one full period after start, like a plain repeating timer.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_simulation(
    controller: SharedController,
    period: Duration,
    mut rng: Box<dyn RandomSource>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let mut pod = controller.lock().await;
                if !pod.is_running() {
                    debug!("Pod no longer running, simulation loop exiting");
                    break;
                }
                pod.tick(rng.as_mut());
            }
        }
    }
}

async fn run_meetings<S>(
    controller: SharedController,
    narrator: Arc<Narrator<S>>,
    timing: Timing,
    mut rng: Box<dyn RandomSource>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: MessageSender + 'static,
{
    let mut ticker = ticker(timing.meeting);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let pair = {
                    let pod = controller.lock().await;
                    if !pod.is_running() {
                        break;
                    }
                    pod.pick_meeting(rng.as_mut(), timing.meeting_chance)
                };
                let Some((speaker, listener)) = pair else {
                    continue;
                };
                debug!(speaker = %speaker.id, listener = %listener.id, "Meeting started");

                let text = tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    text = narrator.dialogue(&speaker, &listener) => text,
                };
                controller
                    .lock()
                    .await
                    .show_dialogue(&speaker.id, text, timing.dialogue_display);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::AnthropicClient;
    use crate::manifest::PodManifest;
    use crate::narrative::DIALOGUE_FALLBACK;
    use crate::pod::UnitStatus;
    use crate::random::ScriptedRandom;

    fn offline() -> Arc<Narrator<AnthropicClient>> {
        Arc::new(Narrator::new(None, "offline"))
    }

    fn timing(tick_ms: u64, meeting_ms: u64, chance: f64) -> Timing {
        Timing {
            tick: Duration::from_millis(tick_ms),
            meeting: Duration::from_millis(meeting_ms),
            meeting_chance: chance,
            dialogue_display: Duration::from_secs(5),
        }
    }

    async fn working_pod() -> SharedController {
        let mut c = PodController::default();
        PodManifest::demo().apply(&mut c).unwrap();
        c.deploy().unwrap();
        c.submit_work("Fix login timeout").unwrap();
        Arc::new(Mutex::new(c))
    }

    fn progress(c: &PodController) -> Vec<f64> {
        c.roster().units().iter().map(|u| u.progress).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_period_and_stops_cleanly() {
        let shared = working_pod().await;
        let scheduler = Scheduler::start(
            Arc::clone(&shared),
            offline(),
            timing(1500, 3_600_000, 0.0),
            Box::new(ScriptedRandom::constant(0.0)),
            Box::new(ScriptedRandom::constant(0.0)),
        );

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(progress(&*shared.lock().await), vec![0.0; 4]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(progress(&*shared.lock().await), vec![15.0; 4]);

        scheduler.stop().await;
        let frozen = progress(&*shared.lock().await);
        let spend = shared.lock().await.pod().current_spend;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(progress(&*shared.lock().await), frozen);
        assert_eq!(shared.lock().await.pod().current_spend, spend);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_exits_when_pod_leaves_live() {
        let shared = working_pod().await;
        let scheduler = Scheduler::start(
            Arc::clone(&shared),
            offline(),
            timing(1000, 1000, 1.0),
            Box::new(ScriptedRandom::constant(0.0)),
            Box::new(ScriptedRandom::constant(0.5)),
        );
        shared.lock().await.terminate().unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let pod = shared.lock().await;
        assert!(pod.roster().units().iter().all(|u| u.progress == 0.0));
        drop(pod);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn meeting_shows_dialogue_bubble() {
        let shared = working_pod().await;
        let scheduler = Scheduler::start(
            Arc::clone(&shared),
            offline(),
            timing(3_600_000, 100, 1.0),
            Box::new(ScriptedRandom::constant(0.0)),
            Box::new(ScriptedRandom::constant(0.5)),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        {
            let pod = shared.lock().await;
            let bubble = pod.state().dialogue.as_ref().unwrap();
            assert_eq!(bubble.text, DIALOGUE_FALLBACK);
            let speaker = pod.roster().get(&bubble.unit_id).unwrap();
            assert_eq!(speaker.status, UnitStatus::Working);
            assert!(!speaker.connections.is_empty());
        }
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn log_lines_land_in_pod_log() {
        let shared = working_pod().await;
        let mut scheduler = Scheduler::start(
            Arc::clone(&shared),
            offline(),
            timing(3_600_000, 3_600_000, 0.0),
            Box::new(ScriptedRandom::constant(0.0)),
            Box::new(ScriptedRandom::constant(0.0)),
        );
        let unit = shared.lock().await.roster().units()[1].clone();
        scheduler.spawn_log_line(Arc::clone(&shared), offline(), unit, "Processing Task".into());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            shared.lock().await.log().last(),
            Some("[Byte-7] Executing task...")
        );
        scheduler.stop().await;
    }
}
