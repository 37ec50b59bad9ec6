//! Behavioural suites and shared test support for the engine.

mod bootstrap_behaviour;
mod ingestion_behaviour;
mod lifecycle_behaviour;
pub(crate) mod support;
