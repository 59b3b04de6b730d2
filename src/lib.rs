//! flowcurrent: sequence steps, pass args forward, back up, abandon
//!
//! The [`workflow`] module is the orchestration core. Everything else builds
//! a terminal front end on top of it: TOML blueprints ([`config`],
//! [`blueprint`]), prompt templates ([`template`]), presenters per launch
//! style ([`presentation`]) and the CLI ([`cli`]).

pub mod blueprint;
pub mod cli;
pub mod config;
pub mod logging;
pub mod presentation;
pub mod template;
pub mod workflow;
