//! Core of the vmtest harness: compile one test, launch it on a managed
//! runtime, and classify what it printed before a deadline.

pub mod api;
pub mod classpath;
pub mod command;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod launch;
pub mod test_run;

pub use engine::TestEngine;
