//! Unit tests for the dispatcher.

use std::sync::Arc;

use hawk_protocol::{LogLevel, codes};
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::dispatch::MockMessageHandler;
use crate::outbound::MockResponseSender;
use crate::rate_limit::test_clock::ManualClock;
use crate::state::StateCapacities;
use crate::tests::support::RecordingSender;

struct Harness {
    dispatcher: Dispatcher<ManualClock>,
    state: Arc<LiveState>,
    metrics: Arc<Metrics>,
}

fn harness(
    handler: impl MessageHandler + 'static,
    sender: Arc<dyn ResponseSender>,
    burst: u32,
) -> Harness {
    let state = Arc::new(LiveState::new(StateCapacities {
        logs: 10,
        metric_history: 10,
        events: 10,
    }));
    let metrics = Arc::new(Metrics::new(true));
    let dispatcher = Dispatcher::new(
        Arc::new(handler),
        sender,
        Arc::clone(&state),
        Arc::clone(&metrics),
        RateLimiter::with_clock(1.0, burst, ManualClock::new()),
        DecodeLimits { max_batch_size: 10 },
    );
    Harness {
        dispatcher,
        state,
        metrics,
    }
}

fn accepting_handler() -> MockMessageHandler {
    let mut handler = MockMessageHandler::new();
    handler.expect_handle_log().returning(|_| Ok(()));
    handler.expect_handle_metric().returning(|_| Ok(()));
    handler
}

#[rstest]
fn acknowledges_processed_request() {
    let sender = Arc::new(RecordingSender::default());
    let harness = harness(accepting_handler(), sender.clone(), 10);

    harness.dispatcher.dispatch_unit(json!({
        "jsonrpc": "2.0",
        "method": "hawk.log",
        "params": {"message": "ready", "level": "SUCCESS"},
        "id": 1
    }));

    assert_eq!(
        sender.messages(),
        vec![json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"status": "ok", "method": "hawk.log"}
        })]
    );
    let logs = harness.state.logs();
    assert_eq!(logs.first().map(|entry| entry.level), Some(LogLevel::Success));
    assert!(logs.first().and_then(|entry| entry.timestamp).is_some());
}

#[rstest]
fn handler_failure_leaves_state_untouched() {
    let mut handler = MockMessageHandler::new();
    handler
        .expect_handle_metric()
        .times(1)
        .returning(|_| Err(HandlerError::new("renderer busy")));
    let mut sender = MockResponseSender::new();
    sender
        .expect_send_error()
        .withf(|id, error| {
            *id == RequestId::Number(7)
                && error.code == codes::INTERNAL_ERROR
                && error.data == Some(Value::String("renderer busy".to_owned()))
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let harness = harness(handler, Arc::new(sender), 10);

    harness.dispatcher.dispatch_unit(json!({
        "jsonrpc": "2.0",
        "method": "hawk.metric",
        "params": {"name": "cpu", "value": 1.0},
        "id": 7
    }));

    assert_eq!(harness.state.revision(), 0);
    let snapshot = harness.metrics.snapshot();
    assert_eq!(snapshot.failed, 1);
    assert_eq!(snapshot.per_error.get("handler"), Some(&1));
}

struct PanickingLogHandler;

impl MessageHandler for PanickingLogHandler {
    fn handle_log(&self, _entry: &hawk_protocol::LogEntry) -> Result<(), HandlerError> {
        panic!("renderer crashed");
    }
}

#[rstest]
fn panicking_handler_costs_one_message() {
    let sender = Arc::new(RecordingSender::default());
    let harness = harness(PanickingLogHandler, sender.clone(), 10);

    harness.dispatcher.dispatch_unit(json!({
        "jsonrpc": "2.0",
        "method": "hawk.log",
        "params": {"message": "boom"},
        "id": 3
    }));
    harness.dispatcher.dispatch_unit(json!({
        "jsonrpc": "2.0",
        "method": "hawk.metric",
        "params": {"name": "cpu", "value": 2.0}
    }));

    let reply = sender.reply_to(&json!(3)).expect("error reply");
    assert_eq!(reply["error"]["code"], json!(codes::INTERNAL_ERROR));
    assert_eq!(reply["error"]["data"], json!("handler panicked: renderer crashed"));
    assert!(harness.state.logs().is_empty());
    assert!(harness.state.metric("cpu").is_some());
    let snapshot = harness.metrics.snapshot();
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.per_error.get("handler"), Some(&1));
}

#[rstest]
fn invalid_notification_is_counted_but_not_answered() {
    let mut sender = MockResponseSender::new();
    sender.expect_send_error().never();
    let harness = harness(MockMessageHandler::new(), Arc::new(sender), 10);

    harness
        .dispatcher
        .dispatch_unit(json!({"jsonrpc": "2.0", "method": "hawk.log", "params": {}}));

    let snapshot = harness.metrics.snapshot();
    assert_eq!((snapshot.received, snapshot.failed), (1, 1));
}

#[rstest]
fn rate_limited_requests_and_notifications_diverge() {
    let sender = Arc::new(RecordingSender::default());
    let harness = harness(accepting_handler(), sender.clone(), 1);
    let notification = json!({
        "jsonrpc": "2.0",
        "method": "hawk.metric",
        "params": {"name": "a", "value": 1}
    });

    harness.dispatcher.dispatch_unit(notification.clone());
    harness.dispatcher.dispatch_unit(notification);
    harness.dispatcher.dispatch_unit(json!({
        "jsonrpc": "2.0",
        "method": "hawk.metric",
        "params": {"name": "a", "value": 2},
        "id": "late"
    }));

    let snapshot = harness.metrics.snapshot();
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.dropped, 1);
    assert_eq!(snapshot.failed, 1);
    let reply = sender.reply_to(&json!("late")).expect("rate limited reply");
    assert_eq!(reply["error"]["code"], codes::RATE_LIMITED);
    assert!(reply["error"]["data"]["retry_after_ms"].as_u64() > Some(0));
}

#[rstest]
fn framing_errors_count_as_received_and_failed() {
    let harness = harness(MockMessageHandler::new(), Arc::new(RecordingSender::default()), 1);
    harness
        .dispatcher
        .record_framing(&FramingError::Garbage { byte: b'x' });

    let snapshot = harness.metrics.snapshot();
    assert_eq!((snapshot.received, snapshot.failed), (1, 1));
    assert_eq!(snapshot.per_error.get("framing"), Some(&1));
}
