//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

/// Events emitted while a workflow runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    WorkflowStart {
        name: String,
        steps: usize,
    },
    StepPresented {
        name: String,
        index: usize,
        total: usize,
        style: String,
        prompt: String,
    },
    StepDismissed {
        name: String,
        animated: bool,
    },
    WorkflowComplete {
        name: String,
        result: Option<serde_json::Value>,
    },
    WorkflowAbandoned {
        name: String,
    },
    Error {
        message: String,
    },
    Info {
        message: String,
    },
    Debug {
        message: String,
    },
}

pub trait OutputHandler {
    fn emit(&self, event: OutputEvent);

    /// Write final result
    fn result(&self, success: bool, output: Option<&str>);
}

/// Human-readable output on stderr, final result on stdout
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn style_marker(style: &str) -> &'static str {
        match style {
            "modal" => " (modal)",
            "modal_fullscreen" => " (fullscreen)",
            "navigation_link" => " ->",
            _ => "",
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::WorkflowStart { name, steps } => {
                eprintln!("Running workflow '{}' ({} steps)", name, steps);
                eprintln!("Type an answer, ':back' to go back, ':abandon' to quit");
            }
            OutputEvent::StepPresented {
                name,
                index,
                total,
                style,
                prompt,
            } => {
                eprintln!();
                eprintln!("[{}/{}] {}{}", index, total, name, Self::style_marker(&style));
                eprintln!("{}", prompt);
            }
            OutputEvent::StepDismissed { name, .. } => {
                if self.debug {
                    eprintln!("[debug] dismissed {}", name);
                }
            }
            OutputEvent::WorkflowComplete { name, .. } => {
                eprintln!();
                eprintln!("✓ Workflow '{}' complete", name);
            }
            OutputEvent::WorkflowAbandoned { name } => {
                eprintln!();
                eprintln!("✗ Workflow '{}' abandoned", name);
            }
            OutputEvent::Error { message } => {
                eprintln!("Error: {}", message);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
            OutputEvent::Debug { message } => {
                if self.debug {
                    eprintln!("[debug] {}", message);
                }
            }
        }
    }

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// One JSON document per event on stdout
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        match json {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize output event"),
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }

    fn result(&self, success: bool, output: Option<&str>) {
        #[derive(Serialize)]
        struct FinalResult<'a> {
            success: bool,
            output: Option<&'a str>,
        }

        self.print_json(&FinalResult { success, output });
    }
}

/// Prompts and the final result only
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, event: OutputEvent) {
        // Still need the question to be able to answer it
        if let OutputEvent::StepPresented { prompt, .. } = event {
            eprintln!("{}", prompt);
        }
    }

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(false)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

/// Collects events; used by tests across the CLI
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingHandler {
    pub events: std::cell::RefCell<Vec<OutputEvent>>,
    pub results: std::cell::RefCell<Vec<(bool, Option<String>)>>,
}

#[cfg(test)]
impl RecordingHandler {
    pub fn presented(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                OutputEvent::StepPresented { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl OutputHandler for RecordingHandler {
    fn emit(&self, event: OutputEvent) {
        self.events.borrow_mut().push(event);
    }

    fn result(&self, success: bool, output: Option<&str>) {
        self.results
            .borrow_mut()
            .push((success, output.map(str::to_string)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_from_str() {
        assert_eq!(OutputMode::from_str("json", true), Ok(OutputMode::Json));
        assert_eq!(OutputMode::from_str("quiet", true), Ok(OutputMode::Quiet));
        assert_eq!(OutputMode::from_str("console", true), Ok(OutputMode::Console));
        assert!(OutputMode::from_str("fancy", true).is_err());
    }

    #[test]
    fn test_event_json_shape() {
        let event = OutputEvent::StepPresented {
            name: "email".into(),
            index: 1,
            total: 3,
            style: "modal".into(),
            prompt: "Email?".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StepPresented");
        assert_eq!(json["name"], "email");

        let back: OutputEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_recording_handler_captures_events() {
        let handler = RecordingHandler::default();
        handler.emit(OutputEvent::WorkflowStart {
            name: "signup".into(),
            steps: 2,
        });
        handler.emit(OutputEvent::StepPresented {
            name: "email".into(),
            index: 1,
            total: 2,
            style: "default".into(),
            prompt: "Email?".into(),
        });
        handler.result(true, Some("done"));

        assert_eq!(handler.events.borrow().len(), 2);
        assert_eq!(handler.presented(), vec!["email"]);
        assert_eq!(
            *handler.results.borrow(),
            vec![(true, Some("done".to_string()))]
        );
    }

    #[test]
    fn test_style_marker() {
        assert_eq!(ConsoleHandler::style_marker("modal"), " (modal)");
        assert_eq!(ConsoleHandler::style_marker("default"), "");
    }

    #[test]
    fn test_create_handler() {
        let _ = create_handler(OutputMode::Console, false);
        let _ = create_handler(OutputMode::Json, false);
        let _ = create_handler(OutputMode::Quiet, false);
    }
}
