// controller.rs - Background run loop with cooperative cancellation
//
// Idle --start--> Running --cancel--> CancelPending --loop observes--> Idle

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::automaton::{Automaton, ChangeEvent};
use crate::error::{AutomatonError, BoxError, RunError};
use crate::grid::Grid;
use crate::rule::{LifeLike, Rule};
use crate::settings::Seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle          = 0,
    Running       = 1,
    CancelPending = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Running,
            2 => RunState::CancelPending,
            _ => RunState::Idle,
        }
    }
}

/// Run state shared between a controller and its background task.
///
/// Doubles as the cancellation token: the loop stops once it reads `CancelPending`.
#[derive(Debug, Clone, Default)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn load(&self) -> RunState {
        RunState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: RunState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Receives the output of a run. Every method is called on the background task.
pub trait RunObserver: Send + 'static {
    /// Called once before the first step, e.g. to hide a cursor.
    fn on_start(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after every step with the cells that flipped. An error ends the run.
    fn on_changes(&mut self, changes: &[ChangeEvent]) -> Result<(), BoxError>;

    /// Called exactly once when the loop exits, however it exits.
    fn on_complete(&mut self) {}
}

/// Observer built from a closure; see [`on_changes`].
pub struct OnChanges<F>(F);

/// Wraps an infallible closure as a [`RunObserver`].
pub fn on_changes<F>(f: F) -> OnChanges<F>
where
    F: FnMut(&[ChangeEvent]) + Send + 'static,
{
    OnChanges(f)
}

impl<F> RunObserver for OnChanges<F>
where
    F: FnMut(&[ChangeEvent]) + Send + 'static,
{
    fn on_changes(&mut self, changes: &[ChangeEvent]) -> Result<(), BoxError> {
        (self.0)(changes);
        Ok(())
    }
}

/// Summary of a run that ended by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub generations: u64,
}

/// Owns an automaton and advances it on a tokio task at a fixed cadence.
pub struct RunController<R: Rule = LifeLike> {
    automaton : Arc<Mutex<Automaton<R>>>,
    state     : SharedState,
    interval  : Duration,
    runtime   : Handle,
    task      : Mutex<Option<JoinHandle<Result<RunReport, RunError>>>>,
}

impl<R: Rule> RunController<R> {
    pub fn new(automaton: Automaton<R>, interval: Duration, runtime: Handle) -> Self {
        Self {
            automaton: Arc::new(Mutex::new(automaton)),
            state: SharedState::default(),
            interval,
            runtime,
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        self.state.load()
    }

    /// True from `start` until the loop has observed cancellation and wound down.
    pub fn is_running(&self) -> bool {
        self.state() != RunState::Idle
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Launches the step loop. Returns `false`, doing nothing, unless idle.
    pub fn start<O: RunObserver>(&self, observer: O) -> bool {
        if !self.state.transition(RunState::Idle, RunState::Running) {
            debug!(state = ?self.state(), "start ignored, run already active");
            return false;
        }

        let task = self.runtime.spawn(run_loop(
            Arc::clone(&self.automaton),
            self.state.clone(),
            self.interval,
            observer,
        ));
        let previous = lock(&self.task).replace(task);
        if let Some(previous) = previous {
            self.runtime.spawn(reap(previous));
        }
        debug!(interval_ms = self.interval.as_millis() as u64, "run started");
        true
    }

    /// Asks a running loop to stop at its next iteration boundary. Never blocks.
    pub fn cancel(&self) -> bool {
        let requested = self.state.transition(RunState::Running, RunState::CancelPending);
        if requested {
            debug!("run cancellation requested");
        }
        requested
    }

    /// Waits for the most recent run to end and returns its outcome.
    ///
    /// `None` when no run was started since the last call.
    pub async fn finish(&self) -> Option<Result<RunReport, RunError>> {
        let task = lock(&self.task).take()?;
        Some(match task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => Err(RunError::Panicked),
            Err(_) => Err(RunError::Aborted),
        })
    }

    /// Advances a single generation while idle.
    pub fn step(&self) -> Result<Vec<ChangeEvent>, AutomatonError> {
        Ok(self.idle_automaton()?.next())
    }

    /// Flips one cell while idle and returns its new state.
    pub fn toggle(&self, row: usize, col: usize) -> Result<bool, AutomatonError> {
        self.idle_automaton()?.toggle(row, col)
    }

    /// Reseeds the grid while idle and returns the new contents.
    pub fn seed(&self, seed: &Seed) -> Result<Grid, AutomatonError> {
        let mut automaton = self.idle_automaton()?;
        automaton.seed(seed);
        Ok(automaton.grid().clone())
    }

    /// Copy of the grid between steps.
    pub fn snapshot(&self) -> Grid {
        lock(&self.automaton).grid().clone()
    }

    pub fn generation(&self) -> u64 {
        lock(&self.automaton).generation()
    }

    pub fn population(&self) -> usize {
        lock(&self.automaton).population()
    }

    fn idle_automaton(&self) -> Result<MutexGuard<'_, Automaton<R>>, AutomatonError> {
        if self.is_running() {
            return Err(AutomatonError::RunActive);
        }
        Ok(lock(&self.automaton))
    }
}

impl<R: Rule> Drop for RunController<R> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Outcome of a run nobody called `finish` on before the next `start`.
async fn reap(previous: JoinHandle<Result<RunReport, RunError>>) {
    match previous.await {
        Ok(Ok(report)) => debug!(generations = report.generations, "reaped finished run"),
        Ok(Err(err)) => warn!(%err, "previous run ended with an error"),
        Err(err) if err.is_panic() => warn!("previous run panicked"),
        Err(_) => warn!("previous run was aborted"),
    }
}

/// Runs the observer's completion hook and returns the controller to idle,
/// including when the observer panics.
struct RunGuard<O: RunObserver> {
    observer    : O,
    state       : SharedState,
    generations : u64,
}

impl<O: RunObserver> Drop for RunGuard<O> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!(generations = self.generations, "run observer panicked, stopping run");
        }
        self.observer.on_complete();
        self.state.store(RunState::Idle);
        debug!(generations = self.generations, "run stopped");
    }
}

async fn run_loop<R: Rule, O: RunObserver>(
    automaton : Arc<Mutex<Automaton<R>>>,
    state     : SharedState,
    interval  : Duration,
    observer  : O,
) -> Result<RunReport, RunError> {
    let mut guard = RunGuard { observer, state: state.clone(), generations: 0 };

    if let Err(source) = guard.observer.on_start() {
        error!(%source, "run observer failed to start");
        return Err(RunError::Observer { generations: 0, source });
    }

    while state.load() != RunState::CancelPending {
        let changes = lock(&automaton).next();
        guard.generations += 1;
        let generations = guard.generations;
        trace!(generations, changes = changes.len(), "stepped");

        if let Err(source) = guard.observer.on_changes(&changes) {
            error!(%source, generations, "run observer failed, stopping run");
            return Err(RunError::Observer { generations, source });
        }

        tokio::time::sleep(interval).await;
    }

    debug!(generations = guard.generations, "run observed cancellation");
    Ok(RunReport { generations: guard.generations })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_the_atomic() {
        let state = SharedState::default();
        assert_eq!(state.load(), RunState::Idle);
        assert!(state.transition(RunState::Idle, RunState::Running));
        assert!(!state.transition(RunState::Idle, RunState::Running));
        assert!(state.transition(RunState::Running, RunState::CancelPending));
        assert_eq!(state.load(), RunState::CancelPending);
        state.store(RunState::Idle);
        assert_eq!(state.load(), RunState::Idle);
    }

    #[test]
    fn guard_restores_idle_on_drop() {
        struct Flag(Arc<AtomicU8>);
        impl RunObserver for Flag {
            fn on_changes(&mut self, _: &[ChangeEvent]) -> Result<(), BoxError> {
                Ok(())
            }
            fn on_complete(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let completed = Arc::new(AtomicU8::new(0));
        let state = SharedState::default();
        state.store(RunState::CancelPending);
        drop(RunGuard {
            observer: Flag(Arc::clone(&completed)),
            state: state.clone(),
            generations: 0,
        });

        assert_eq!(state.load(), RunState::Idle);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }
}
