//! Behavioural tests for the engine lifecycle.

use std::cell::RefCell;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::dispatch::NoopMessageHandler;
use crate::engine::{Engine, EngineConfig, LifecycleError, Phase, StopReason};
use crate::tests::support::{
    HealthEvent, PipeWriter, RecordingHealthReporter, RecordingSender, pipe,
};

const LOG_NOTIFICATION: &str =
    r#"{"jsonrpc":"2.0","method":"hawk.log","params":{"message":"working"}}"#;

struct LifecycleWorld {
    engine: Arc<Engine>,
    reporter: Arc<RecordingHealthReporter>,
    writer: Option<PipeWriter>,
    stop_phases: Vec<Phase>,
}

impl LifecycleWorld {
    fn new() -> Self {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let engine = Engine::new(
            EngineConfig::default(),
            Arc::new(NoopMessageHandler),
            Arc::new(RecordingSender::default()),
        )
        .expect("default settings are valid")
        .with_health_reporter(reporter.clone());
        Self {
            engine: Arc::new(engine),
            reporter,
            writer: None,
            stop_phases: Vec::new(),
        }
    }

    fn start(&mut self) {
        let (writer, reader) = pipe();
        self.engine.start(reader).expect("engine starts");
        self.writer = Some(writer);
    }

    fn send(&self, unit: &str) {
        self.writer
            .as_ref()
            .expect("engine running")
            .write(format!("{unit}\n"));
    }
}

impl Drop for LifecycleWorld {
    fn drop(&mut self) {
        self.writer.take();
        self.engine.stop();
    }
}

#[fixture]
fn world() -> RefCell<LifecycleWorld> {
    RefCell::new(LifecycleWorld::new())
}

#[given("a running engine")]
fn given_running_engine(world: &RefCell<LifecycleWorld>) {
    world.borrow_mut().start();
}

#[given("an idle engine")]
fn given_idle_engine(world: &RefCell<LifecycleWorld>) {
    assert_eq!(world.borrow().engine.phase(), Phase::Idle);
}

#[when("the producer sends a log notification and closes its stream")]
fn when_send_and_close(world: &RefCell<LifecycleWorld>) {
    let mut world = world.borrow_mut();
    world.send(LOG_NOTIFICATION);
    world.writer.take();
}

#[when("the producer sends a log notification")]
fn when_send(world: &RefCell<LifecycleWorld>) {
    world.borrow().send(LOG_NOTIFICATION);
}

#[when("two threads stop the engine at once")]
fn when_concurrent_stops(world: &RefCell<LifecycleWorld>) {
    let engine = Arc::clone(&world.borrow().engine);
    let stoppers: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine.stop();
                engine.phase()
            })
        })
        .collect();
    let phases = stoppers
        .into_iter()
        .map(|stopper| stopper.join().expect("stop thread"))
        .collect();
    world.borrow_mut().stop_phases = phases;
}

#[when("the engine is stopped twice")]
fn when_stopped_twice(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    world.engine.stop();
    world.engine.stop();
}

#[then("ingestion ends")]
fn then_ingestion_ends(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    assert!(world.engine.wait_timeout(Duration::from_secs(5)));
    world.engine.stop();
    assert!(
        world
            .reporter
            .events()
            .contains(&HealthEvent::IngestionEnded(StopReason::EndOfInput))
    );
}

#[then("the engine has processed {count} message")]
fn then_engine_processed(world: &RefCell<LifecycleWorld>, count: u64) {
    let world = world.borrow();
    assert_eq!(world.engine.metrics().processed, count);
    assert!(
        world
            .reporter
            .events()
            .contains(&HealthEvent::EngineStopped { processed: count })
    );
}

#[then("both stops return with the engine stopped")]
fn then_both_stopped(world: &RefCell<LifecycleWorld>) {
    assert_eq!(world.borrow().stop_phases, vec![Phase::Stopped, Phase::Stopped]);
}

#[then("starting again is rejected")]
fn then_restart_rejected(world: &RefCell<LifecycleWorld>) {
    let result = world.borrow().engine.start(Cursor::new(Vec::new()));
    assert!(matches!(result, Err(LifecycleError::AlreadyStopped)));
}

#[then("the engine is stopped")]
fn then_engine_stopped(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    assert_eq!(world.engine.phase(), Phase::Stopped);
    world.engine.wait();
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "End of input ends ingestion"
)]
fn end_of_input(world: RefCell<LifecycleWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Concurrent stops while the loop is active"
)]
fn concurrent_stops(world: RefCell<LifecycleWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/lifecycle.feature",
    name = "Stopping an engine that never started"
)]
fn stop_before_start(world: RefCell<LifecycleWorld>) {
    drop(world);
}
