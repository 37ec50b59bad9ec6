//! Behavioural tests for the bootstrap sequence.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use hawk_config::Config;

use crate::bootstrap::{BootstrapError, Bootstrapped, StaticConfigLoader, bootstrap_with};
use crate::tests::support::{RecordingHealthReporter, strip_quotes};

#[derive(Default)]
struct BootstrapWorld {
    loader: Option<StaticConfigLoader>,
    reporter: RecordingHealthReporter,
    outcome: Option<Result<Bootstrapped, BootstrapError>>,
}

#[fixture]
fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::default())
}

#[given("a configuration loader with rate limit {rate}")]
fn given_loader(world: &RefCell<BootstrapWorld>, rate: f64) {
    world.borrow_mut().loader = Some(StaticConfigLoader::new(Config {
        rate_limit: rate,
        ..Config::default()
    }));
}

#[when("bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<BootstrapWorld>) {
    let mut world = world.borrow_mut();
    let loader = world.loader.clone().expect("loader configured");
    let outcome = bootstrap_with(&loader, &world.reporter);
    world.outcome = Some(outcome);
}

#[then("bootstrap succeeds with rate limit {rate}")]
fn then_bootstrap_succeeds(world: &RefCell<BootstrapWorld>, rate: f64) {
    let world = world.borrow();
    let bootstrapped = match world.outcome.as_ref().expect("bootstrap ran") {
        Ok(bootstrapped) => bootstrapped,
        Err(error) => panic!("bootstrap failed: {error}"),
    };
    assert!((bootstrapped.engine_config().rate_limit - rate).abs() < f64::EPSILON);
}

#[then("bootstrap fails with an engine settings error")]
fn then_bootstrap_fails(world: &RefCell<BootstrapWorld>) {
    let world = world.borrow();
    assert!(matches!(
        world.outcome,
        Some(Err(BootstrapError::Engine { .. }))
    ));
}

#[then(r#"the health events are "{events}""#)]
fn then_health_events(world: &RefCell<BootstrapWorld>, events: String) {
    let expected: Vec<_> = strip_quotes(&events).split(',').collect();
    let recorded: Vec<_> = world
        .borrow()
        .reporter
        .events()
        .iter()
        .map(|event| event.label())
        .collect();
    assert_eq!(recorded, expected);
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Successful bootstrap reports progress"
)]
fn bootstrap_success(world: RefCell<BootstrapWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Invalid engine settings fail bootstrap"
)]
fn bootstrap_failure(world: RefCell<BootstrapWorld>) {
    drop(world);
}
