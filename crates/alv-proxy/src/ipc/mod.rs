//! Transport-boundary intake for the verification proxy.

mod handler;

pub use handler::AgentResponseIntake;
