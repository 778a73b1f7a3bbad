//! A running pod: the controller behind a lock, the narrator, and the
//! scheduler that animates them while work is active.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::anthropic::MessageSender;
use crate::config::Timing;
use crate::controller::{PodController, PodState};
use crate::error::Result;
use crate::narrative::Narrator;
use crate::pod::Phase;
use crate::random::{RandomSource, SeededRandom};
use crate::scheduler::{Scheduler, SharedController};

pub struct Session<S> {
    controller: SharedController,
    narrator: Arc<Narrator<S>>,
    timing: Timing,
    seed: Option<u64>,
    generation: u64,
    scheduler: Option<Scheduler>,
}

impl<S: MessageSender + 'static> Session<S> {
    pub fn new(controller: PodController, narrator: Narrator<S>, timing: Timing) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            narrator: Arc::new(narrator),
            timing,
            seed: None,
            generation: 0,
            scheduler: None,
        }
    }

    /// Make every scheduler run reproducible from `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn controller(&self) -> SharedController {
        Arc::clone(&self.controller)
    }

    pub async fn lock(&self) -> MutexGuard<'_, PodController> {
        self.controller.lock().await
    }

    pub async fn snapshot(&self) -> PodState {
        self.controller.lock().await.state().clone()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_some()
    }

    pub async fn deploy(&self) -> Result<Phase> {
        self.controller.lock().await.deploy()
    }

    /// Hand a work request to the pod and (re)start the scheduler.
    ///
    /// Each intake restarts the timers from zero. A narrative log line is
    /// requested for every unit put to work.
    pub async fn submit_work(&mut self, content: &str) -> Result<Vec<String>> {
        let (started, units) = {
            let mut pod = self.controller.lock().await;
            let started = pod.submit_work(content)?;
            let units: Vec<_> = started
                .iter()
                .filter_map(|id| pod.roster().get(id).cloned())
                .collect();
            (started, units)
        };

        self.stop_scheduler().await;
        let (sim_rng, meeting_rng) = self.next_rngs();
        let mut scheduler = Scheduler::start(
            self.controller(),
            Arc::clone(&self.narrator),
            self.timing,
            sim_rng,
            meeting_rng,
        );
        for unit in units {
            let task = unit.current_task.clone().unwrap_or_default();
            scheduler.spawn_log_line(self.controller(), Arc::clone(&self.narrator), unit, task);
        }
        self.scheduler = Some(scheduler);
        Ok(started)
    }

    pub async fn approve(&self, unit_id: &str) -> bool {
        self.controller.lock().await.approve(unit_id)
    }

    /// Stop the timers, then leave live.
    pub async fn terminate(&mut self) -> Result<Phase> {
        self.stop_scheduler().await;
        self.controller.lock().await.terminate()
    }

    /// Stop the scheduler and hand back the final state.
    pub async fn shutdown(mut self) -> PodState {
        self.stop_scheduler().await;
        self.snapshot().await
    }

    async fn stop_scheduler(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop().await;
        }
    }

    fn next_rngs(&mut self) -> (Box<dyn RandomSource>, Box<dyn RandomSource>) {
        let generation = self.generation;
        self.generation += 1;
        match self.seed {
            Some(seed) => {
                let base = seed.wrapping_add(generation.wrapping_mul(2));
                info!(seed, generation, "Seeding scheduler");
                (
                    Box::new(SeededRandom::from_seed(base)),
                    Box::new(SeededRandom::from_seed(base.wrapping_add(1))),
                )
            }
            None => (
                Box::new(SeededRandom::from_entropy()),
                Box::new(SeededRandom::from_entropy()),
            ),
        }
    }
}
