use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use conway::{
    Automaton, AutomatonError, BoxError, ChangeEvent, RunController, RunError, RunObserver,
    RunReport, RunState, on_changes,
};
use tokio::runtime::Handle;

const INTERVAL: Duration = Duration::from_millis(20);

fn blinker_controller() -> RunController {
    let mut automaton = Automaton::life(5, 5).unwrap();
    for col in 1..4 {
        automaton.toggle(2, col).unwrap();
    }
    RunController::new(automaton, INTERVAL, Handle::current())
}

/// Records every callback so tests can assert on the run's lifecycle.
#[derive(Clone, Default)]
struct Recorder {
    starts    : Arc<AtomicUsize>,
    batches   : Arc<Mutex<Vec<Vec<ChangeEvent>>>>,
    completes : Arc<AtomicUsize>,
}

impl RunObserver for Recorder {
    fn on_start(&mut self) -> Result<(), BoxError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_changes(&mut self, changes: &[ChangeEvent]) -> Result<(), BoxError> {
        self.batches.lock().unwrap().push(changes.to_vec());
        Ok(())
    }

    fn on_complete(&mut self) {
        self.completes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Recorder {
    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

/// Panics on the first change list; counts completions.
struct Panicker(Arc<AtomicUsize>);

impl RunObserver for Panicker {
    fn on_changes(&mut self, _: &[ChangeEvent]) -> Result<(), BoxError> {
        panic!("renderer exploded");
    }

    fn on_complete(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..200 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within a second");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_streams_changes_until_cancelled() {
    let controller = blinker_controller();
    let recorder = Recorder::default();

    assert!(controller.start(recorder.clone()));
    assert_eq!(controller.state(), RunState::Running);
    assert!(controller.is_running());

    tokio::time::sleep(INTERVAL * 5).await;
    assert!(controller.cancel());
    assert_ne!(controller.state(), RunState::Running);

    let report = controller.finish().await.unwrap().unwrap();
    assert_eq!(controller.state(), RunState::Idle);
    assert_eq!(report.generations as usize, recorder.batch_count());
    assert!(report.generations >= 2);
    assert_eq!(controller.generation(), report.generations);
    assert_eq!(recorder.starts.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.completes.load(Ordering::SeqCst), 1);

    // a blinker flips four cells every generation
    let batches = recorder.batches.lock().unwrap();
    assert!(batches.iter().all(|batch| batch.len() == 4));
    assert_eq!(batches[0][0], ChangeEvent::new(1, 2, true));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_start_is_ignored() {
    let controller = blinker_controller();
    let first = Recorder::default();
    let second = Recorder::default();

    assert!(controller.start(first.clone()));
    assert!(!controller.start(second.clone()));

    tokio::time::sleep(INTERVAL * 4).await;
    controller.cancel();
    controller.finish().await.unwrap().unwrap();

    assert!(first.batch_count() >= 1);
    assert_eq!(second.batch_count(), 0);
    assert_eq!(second.starts.load(Ordering::SeqCst), 0);
    assert_eq!(second.completes.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_while_idle_is_a_no_op() {
    let controller = blinker_controller();
    assert!(!controller.cancel());
    assert_eq!(controller.state(), RunState::Idle);
    assert!(controller.finish().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn grid_is_guarded_while_running() {
    // long enough that the loop is still asleep when the cancel lands
    let mut automaton = Automaton::life(5, 5).unwrap();
    automaton.toggle(2, 2).unwrap();
    let controller = RunController::new(automaton, Duration::from_millis(500), Handle::current());
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    controller.start(on_changes(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(controller.toggle(0, 0), Err(AutomatonError::RunActive));
    assert!(matches!(controller.step(), Err(AutomatonError::RunActive)));

    // the first generation lands, then the loop sleeps for the full interval
    wait_until(|| seen.load(Ordering::SeqCst) >= 1).await;
    controller.cancel();
    assert_eq!(controller.toggle(0, 0), Err(AutomatonError::RunActive));
    controller.finish().await.unwrap().unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(controller.toggle(0, 0), Ok(true));
    assert_eq!(controller.toggle(0, 0), Ok(false));
}

// single-threaded runtime: the loop cannot begin until the test awaits
#[tokio::test]
async fn cancel_before_the_first_step_reports_no_generations() {
    let controller = blinker_controller();
    let recorder = Recorder::default();

    assert!(controller.start(recorder.clone()));
    assert!(controller.cancel());

    let report = controller.finish().await.unwrap().unwrap();
    assert_eq!(report, RunReport { generations: 0 });
    assert_eq!(recorder.batch_count(), 0);
    assert_eq!(recorder.starts.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.completes.load(Ordering::SeqCst), 1);
    assert_eq!(controller.generation(), 0);
    assert_eq!(controller.state(), RunState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_is_observed_within_one_interval() {
    let interval = Duration::from_millis(200);
    let controller = RunController::new(Automaton::life(4, 4).unwrap(), interval, Handle::current());

    controller.start(Recorder::default());
    tokio::time::sleep(Duration::from_millis(30)).await;
    controller.cancel();

    let started = tokio::time::Instant::now();
    controller.finish().await.unwrap().unwrap();
    assert!(started.elapsed() <= interval + Duration::from_millis(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn controller_can_run_again_after_cancel() {
    let controller = blinker_controller();
    let recorder = Recorder::default();

    for _ in 0..2 {
        assert!(controller.start(recorder.clone()));
        tokio::time::sleep(INTERVAL * 2).await;
        controller.cancel();
        controller.finish().await.unwrap().unwrap();
    }

    assert_eq!(recorder.starts.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.completes.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn observer_failure_ends_the_run() {
    struct FailOnSecond {
        calls     : usize,
        completed : Arc<AtomicUsize>,
    }

    impl RunObserver for FailOnSecond {
        fn on_changes(&mut self, _: &[ChangeEvent]) -> Result<(), BoxError> {
            self.calls += 1;
            if self.calls == 2 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "display gone").into());
            }
            Ok(())
        }

        fn on_complete(&mut self) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    let controller = blinker_controller();
    let completed = Arc::new(AtomicUsize::new(0));
    controller.start(FailOnSecond { calls: 0, completed: Arc::clone(&completed) });

    let outcome = controller.finish().await.unwrap();
    match outcome {
        Err(RunError::Observer { generations, source }) => {
            assert_eq!(generations, 2);
            assert_eq!(source.to_string(), "display gone");
        }
        other => panic!("expected observer failure, got {other:?}"),
    }
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), RunState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn observer_panic_still_completes() {
    let controller = blinker_controller();
    let completed = Arc::new(AtomicUsize::new(0));
    controller.start(Panicker(Arc::clone(&completed)));

    assert!(matches!(controller.finish().await, Some(Err(RunError::Panicked))));
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert!(!controller.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn independent_controllers_do_not_share_state() {
    let a = blinker_controller();
    let b = blinker_controller();

    a.start(Recorder::default());
    assert!(a.is_running());
    assert!(!b.is_running());
    assert_eq!(b.step().map(|changes| changes.len()), Ok(4));

    a.cancel();
    a.finish().await.unwrap().unwrap();
}

// single-threaded so the thread-local log subscriber sees the background task
#[tokio::test]
async fn panic_is_reported_when_the_next_run_starts_without_finish() {
    let logs = LogBuffer::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let controller = blinker_controller();
    let completed = Arc::new(AtomicUsize::new(0));
    assert!(controller.start(Panicker(Arc::clone(&completed))));
    wait_until(|| !controller.is_running()).await;
    assert!(logs.contents().contains("run observer panicked"));

    // no finish() between runs: the panicked outcome is reaped, not dropped
    assert!(controller.start(on_changes(|_| {})));
    controller.cancel();
    assert!(matches!(controller.finish().await, Some(Ok(_))));
    wait_until(|| logs.contents().contains("previous run panicked")).await;

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert!(controller.finish().await.is_none());
}
