//! Credit assessment orchestration: profile and history stores, the generator
//! contract, the export rendezvous and the operator session that ties them together.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
