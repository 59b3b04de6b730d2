//! CLI module for flowcurrent
//!
//! This module provides:
//! - Command implementations (run, validate, show)
//! - Output handlers (console, JSON, quiet)
//! - The interactive session that feeds typed answers into a workflow
//!
//! # Example
//!
//! ```ignore
//! use flowcurrent::cli::{commands, output};
//! use std::rc::Rc;
//!
//! let handler: Rc<dyn output::OutputHandler> =
//!     Rc::from(output::create_handler(output::OutputMode::Console, false));
//! let code = commands::run_workflow("signup", &args, dir, &config, handler, stdin.lock())?;
//! ```

pub mod commands;
pub mod output;
pub mod session;

pub use commands::{run_workflow, show_workflow, validate_workflow};
pub use output::{OutputEvent, OutputHandler, OutputMode, create_handler};
pub use session::{Session, SessionOutcome};
