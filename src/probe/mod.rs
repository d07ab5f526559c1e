// src/probe/mod.rs
mod runner;
mod server;

pub use runner::ProbeRunner;
pub use server::{ProbeError, ProbeServer, ProbeSettings, ProbeState, RefreshPolicy};
