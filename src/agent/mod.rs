//! AI orchestration — one model turn, optional tool dispatch.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
