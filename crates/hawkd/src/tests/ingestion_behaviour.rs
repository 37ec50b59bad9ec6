//! Behavioural tests for decoding, admission and dispatch.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::decode::DecodeLimits;
use crate::dispatch::{Dispatcher, Metrics, NoopMessageHandler};
use crate::rate_limit::RateLimiter;
use crate::rate_limit::test_clock::ManualClock;
use crate::state::{LiveState, StateCapacities};
use crate::tests::support::{RecordingSender, strip_quotes};

const REFILL_PER_SECOND: f64 = 1.0;

struct IngestionWorld {
    dispatcher: Option<Dispatcher<ManualClock>>,
    clock: ManualClock,
    sender: Arc<RecordingSender>,
    state: Arc<LiveState>,
    metrics: Arc<Metrics>,
    next_request: i64,
}

impl IngestionWorld {
    fn new() -> Self {
        Self {
            dispatcher: None,
            clock: ManualClock::new(),
            sender: Arc::new(RecordingSender::default()),
            state: Arc::new(LiveState::new(capacities(100))),
            metrics: Arc::new(Metrics::new(true)),
            next_request: 0,
        }
    }

    fn build(&mut self, burst: u32, log_capacity: usize) {
        self.state = Arc::new(LiveState::new(capacities(log_capacity)));
        self.dispatcher = Some(Dispatcher::new(
            Arc::new(NoopMessageHandler),
            self.sender.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.metrics),
            RateLimiter::with_clock(REFILL_PER_SECOND, burst, self.clock.clone()),
            DecodeLimits { max_batch_size: 10 },
        ));
    }

    fn deliver(&self, unit: Value) {
        self.dispatcher
            .as_ref()
            .expect("dispatcher configured")
            .dispatch_unit(unit);
    }

    fn send_log_request(&mut self) {
        self.next_request += 1;
        let id = self.next_request;
        self.deliver(json!({
            "jsonrpc": "2.0",
            "method": "hawk.log",
            "params": {"message": format!("log {id}")},
            "id": id
        }));
    }
}

fn capacities(logs: usize) -> StateCapacities {
    StateCapacities {
        logs,
        metric_history: 10,
        events: 10,
    }
}

#[fixture]
fn world() -> RefCell<IngestionWorld> {
    RefCell::new(IngestionWorld::new())
}

#[given("a dispatcher with burst capacity {burst}")]
fn given_dispatcher(world: &RefCell<IngestionWorld>, burst: u32) {
    world.borrow_mut().build(burst, 100);
}

#[given("a dispatcher retaining {capacity} log entries")]
fn given_log_capacity(world: &RefCell<IngestionWorld>, capacity: usize) {
    world.borrow_mut().build(100, capacity);
}

#[when("the unit {unit} arrives")]
fn when_unit_arrives(world: &RefCell<IngestionWorld>, unit: String) {
    let unit = serde_json::from_str(&unit).expect("scenario unit is valid JSON");
    world.borrow().deliver(unit);
}

#[when("{count} log requests arrive back to back")]
fn when_log_requests_arrive(world: &RefCell<IngestionWorld>, count: usize) {
    for _ in 0..count {
        world.borrow_mut().send_log_request();
    }
}

#[when("another log request arrives")]
fn when_another_log_request(world: &RefCell<IngestionWorld>) {
    world.borrow_mut().send_log_request();
}

#[when("{millis} milliseconds pass")]
fn when_time_passes(world: &RefCell<IngestionWorld>, millis: u64) {
    world.borrow().clock.advance(Duration::from_millis(millis));
}

#[then("no reply is sent")]
fn then_no_reply(world: &RefCell<IngestionWorld>) {
    assert_eq!(world.borrow().sender.messages(), Vec::<Value>::new());
}

#[then("the processed count is {count}")]
fn then_processed_count(world: &RefCell<IngestionWorld>, count: u64) {
    assert_eq!(world.borrow().metrics.snapshot().processed, count);
}

#[then("metric {name} reads {value}")]
fn then_metric_reads(world: &RefCell<IngestionWorld>, name: String, value: f64) {
    let series = world.borrow().state.metric(&name).expect("metric recorded");
    assert!((series.latest.value - value).abs() < f64::EPSILON);
}

#[then(r#"request {id} receives error {code} "{message}""#)]
fn then_request_error(world: &RefCell<IngestionWorld>, id: i64, code: i64, message: String) {
    let reply = world
        .borrow()
        .sender
        .reply_to(&json!(id))
        .expect("request answered");
    assert_eq!(reply["error"]["code"], code, "reply: {reply}");
    assert_eq!(reply["error"]["message"], strip_quotes(&message));
}

#[then("request {id} is acknowledged")]
fn then_request_acknowledged(world: &RefCell<IngestionWorld>, id: i64) {
    let reply = world
        .borrow()
        .sender
        .reply_to(&json!(id))
        .expect("request answered");
    assert_eq!(reply["result"]["status"], "ok", "reply: {reply}");
}

#[then(r#"the retained log messages are "{messages}""#)]
fn then_retained_logs(world: &RefCell<IngestionWorld>, messages: String) {
    let expected: Vec<_> = strip_quotes(&messages).split(',').collect();
    let retained: Vec<_> = world
        .borrow()
        .state
        .logs()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(retained, expected);
}

#[then("exactly {count} progress tracker is retained")]
fn then_progress_count(world: &RefCell<IngestionWorld>, count: usize) {
    assert_eq!(world.borrow().state.progress().len(), count);
}

#[then("progress {id} is at {current} of {total}")]
fn then_progress_at(world: &RefCell<IngestionWorld>, id: String, current: f64, total: f64) {
    let trackers = world.borrow().state.progress();
    let tracker = trackers
        .iter()
        .find(|tracker| tracker.id == id)
        .expect("tracker retained");
    assert!((tracker.current - current).abs() < f64::EPSILON);
    assert!((tracker.total - total).abs() < f64::EPSILON);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "Metric notification updates the live state silently"
)]
fn metric_notification(world: RefCell<IngestionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "Unknown method request is answered with method not found"
)]
fn unknown_method(world: RefCell<IngestionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "Batch with a malformed middle element"
)]
fn batch_partial_failure(world: RefCell<IngestionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "Progress updates are upserted by id"
)]
fn progress_upsert(world: RefCell<IngestionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "Requests beyond the burst are rate limited until tokens refill"
)]
fn rate_limiting(world: RefCell<IngestionWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/ingestion.feature",
    name = "The log ring evicts the oldest entries"
)]
fn log_ring_eviction(world: RefCell<IngestionWorld>) {
    drop(world);
}
