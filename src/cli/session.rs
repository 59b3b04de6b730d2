//! Interactive run of a blueprint workflow over a line-based reader

use super::output::{OutputEvent, OutputHandler};
use crate::blueprint::PromptStep;
use crate::presentation::{PresentationRouter, Presenter};
use crate::template::{TemplateContext, TemplateEngine};
use crate::workflow::{
    InstanceNode, LaunchStyle, PassedArgs, Workflow, WorkflowError, WorkflowLauncher,
};
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

const BACK: &str = ":back";
const ABANDON: &str = ":abandon";

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Last step proceeded; carries the final args as JSON when they have a JSON form
    Finished(Option<serde_json::Value>),
    Abandoned,
    /// Input ran out before the workflow finished
    Interrupted,
}

impl SessionOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionOutcome::Finished(_))
    }
}

/// Presents prompt steps as events for one launch style
pub struct ConsolePresenter {
    style: LaunchStyle,
    total: usize,
    engine: TemplateEngine,
    base: TemplateContext,
    handler: Rc<dyn OutputHandler>,
}

impl ConsolePresenter {
    pub fn new(
        style: LaunchStyle,
        total: usize,
        base: TemplateContext,
        handler: Rc<dyn OutputHandler>,
    ) -> Self {
        Self {
            style,
            total,
            engine: TemplateEngine::new(),
            base,
            handler,
        }
    }

    fn prompt_for(&self, node: &InstanceNode) -> String {
        let rendered = node.with_step::<PromptStep, _>(|step| {
            let mut base = self.base.clone();
            base.set_step(node.name());
            step.render_prompt(&self.engine, &base)
        });
        match rendered {
            Some(Ok(prompt)) => prompt,
            Some(Err(e)) => {
                tracing::warn!(step = node.name(), error = %e, "Prompt failed to render");
                format!("{} (prompt error: {})", node.name(), e)
            }
            None => node.name().to_string(),
        }
    }
}

impl Presenter for ConsolePresenter {
    fn present(&self, to: &Rc<InstanceNode>, from: Option<&Rc<InstanceNode>>) {
        if let Some(from) = from {
            self.handler.emit(OutputEvent::Debug {
                message: format!("{} -> {}", from.name(), to.name()),
            });
        }
        self.handler.emit(OutputEvent::StepPresented {
            name: to.name().to_string(),
            index: to.blueprint_index() + 1,
            total: self.total,
            style: self.style.to_string(),
            prompt: self.prompt_for(to),
        });
    }

    fn dismiss(&self, node: &Rc<InstanceNode>, animated: bool) {
        self.handler.emit(OutputEvent::StepDismissed {
            name: node.name().to_string(),
            animated,
        });
    }
}

/// Router with one console presenter per launch style
pub fn console_router(
    total: usize,
    base: &TemplateContext,
    handler: &Rc<dyn OutputHandler>,
) -> PresentationRouter {
    let presenter = |style| -> Rc<dyn Presenter> {
        Rc::new(ConsolePresenter::new(
            style,
            total,
            base.clone(),
            handler.clone(),
        ))
    };
    LaunchStyle::ALL
        .into_iter()
        .fold(PresentationRouter::new(presenter(LaunchStyle::Default)), |router, style| {
            router.with_presenter(style, presenter(style))
        })
}

/// Drives one run: launches, feeds answers, and reports how it ended
pub struct Session {
    name: String,
    launcher: WorkflowLauncher,
    router: Rc<PresentationRouter>,
    handler: Rc<dyn OutputHandler>,
    animated: bool,
    outcome: Rc<RefCell<Option<SessionOutcome>>>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        workflow: Workflow,
        launch_args: PassedArgs,
        base: &TemplateContext,
        handler: Rc<dyn OutputHandler>,
        animated: bool,
    ) -> Self {
        let name = name.into();
        let outcome = Rc::new(RefCell::new(None));
        let router = Rc::new(console_router(workflow.len(), base, &handler));

        let launcher = WorkflowLauncher::new(workflow, launch_args)
            .on_finish({
                let outcome = outcome.clone();
                let handler = handler.clone();
                let name = name.clone();
                move |args: &PassedArgs| {
                    let result = args.to_json().filter(|v| !v.is_null());
                    handler.emit(OutputEvent::WorkflowComplete {
                        name: name.clone(),
                        result: result.clone(),
                    });
                    *outcome.borrow_mut() = Some(SessionOutcome::Finished(result));
                }
            })
            .on_abandon({
                let outcome = outcome.clone();
                let handler = handler.clone();
                let name = name.clone();
                move || {
                    handler.emit(OutputEvent::WorkflowAbandoned { name: name.clone() });
                    *outcome.borrow_mut() = Some(SessionOutcome::Abandoned);
                }
            });

        Self {
            name,
            launcher,
            router,
            handler,
            animated,
            outcome,
        }
    }

    pub fn workflow(&self) -> &Workflow {
        self.launcher.workflow()
    }

    fn finished(&self) -> Option<SessionOutcome> {
        self.outcome.borrow().clone()
    }

    /// Run until the workflow finishes, is abandoned, or `input` runs dry
    pub fn run<R: BufRead>(&self, input: R) -> Result<SessionOutcome> {
        self.handler.emit(OutputEvent::WorkflowStart {
            name: self.name.clone(),
            steps: self.workflow().len(),
        });

        let launched = self
            .launcher
            .launch(self.router.clone())
            .with_context(|| format!("launching workflow '{}'", self.name))?;
        if launched.is_completed() {
            tracing::info!(workflow = %self.name, "Every step skipped");
        }

        let mut lines = input.lines();
        while self.finished().is_none() {
            let Some(line) = lines.next() else {
                tracing::info!(workflow = %self.name, "Input closed before the workflow finished");
                self.workflow().abandon(false, None);
                return Ok(SessionOutcome::Interrupted);
            };
            let line = line.context("reading answer")?;
            self.handle_line(line.trim_end_matches(['\r', '\n']));
        }

        Ok(self.finished().unwrap_or(SessionOutcome::Interrupted))
    }

    fn handle_line(&self, line: &str) {
        let result = match line.trim() {
            BACK => self.workflow().back_up(),
            ABANDON => {
                self.launcher.abandon(self.animated);
                Ok(())
            }
            _ => self.answer(line),
        };

        if let Err(e) = result {
            self.handler.emit(OutputEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn answer(&self, text: &str) -> Result<(), WorkflowError> {
        let node = self.workflow().active_node().ok_or(WorkflowError::NotRunning)?;
        node.with_step::<PromptStep, _>(|step| step.answer(text))
            .unwrap_or_else(|| self.workflow().proceed(PassedArgs::args(text.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{base_context, build_workflow, parse_launch_args};
    use crate::cli::output::RecordingHandler;
    use crate::config::{Defaults, WorkflowConfig};
    use std::io::Cursor;

    fn signup() -> WorkflowConfig {
        toml::from_str(
            r#"
            name = "signup"

            [[steps]]
            name = "email"
            prompt = "Email for {{ launch_args | default('you') }}?"

            [[steps]]
            name = "plan"
            prompt = "Plan for {{ args }}?"
            launch_style = "modal"

            [[steps]]
            name = "coupon"
            prompt = "Coupon?"
            skip_if = "args == 'free'"
            persistence = "persist_when_skipped"
        "#,
        )
        .unwrap()
    }

    fn session(recorder: &Rc<RecordingHandler>, args: &[&str]) -> Session {
        let config = signup();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let launch = parse_launch_args(&args);
        let workflow = build_workflow(&config, &Defaults::default(), &launch).unwrap();
        let base = base_context(&config, &launch);
        let handler: Rc<dyn OutputHandler> = recorder.clone();
        Session::new(config.name.clone(), workflow, launch, &base, handler, true)
    }

    #[test]
    fn test_runs_to_completion() {
        let recorder = Rc::new(RecordingHandler::default());
        let session = session(&recorder, &["ada"]);

        let outcome = session.run(Cursor::new("a@b.c\npro\nSAVE10\n")).unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Finished(Some(serde_json::json!("SAVE10")))
        );
        assert_eq!(recorder.presented(), vec!["email", "plan", "coupon"]);
        let events = recorder.events.borrow();
        assert!(events.iter().any(|e| matches!(
            e,
            OutputEvent::StepPresented { prompt, .. } if prompt == "Email for ada?"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            OutputEvent::StepPresented { style, prompt, .. } if style == "modal" && prompt == "Plan for a@b.c?"
        )));
    }

    #[test]
    fn test_back_then_new_answer() {
        let recorder = Rc::new(RecordingHandler::default());
        let session = session(&recorder, &[]);

        let outcome = session
            .run(Cursor::new("first@x.io\n:back\nsecond@x.io\nfree\n"))
            .unwrap();

        // coupon skipped for 'free', so the plan answer finishes the run
        assert_eq!(outcome, SessionOutcome::Finished(Some(serde_json::json!("free"))));
        assert_eq!(recorder.presented(), vec!["email", "plan", "email", "plan"]);
        let transitions: Vec<String> = recorder
            .events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Debug { message } => Some(message.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(transitions, vec!["email -> plan", "plan -> email", "email -> plan"]);
        assert!(recorder.events.borrow().iter().any(|e| matches!(
            e,
            OutputEvent::StepPresented { prompt, .. } if prompt == "Plan for second@x.io?"
        )));
    }

    #[test]
    fn test_skipped_step_kept_in_chain() {
        let recorder = Rc::new(RecordingHandler::default());
        let session = session(&recorder, &[]);

        let outcome = session.run(Cursor::new("e@x.io\nfree\n")).unwrap();
        assert!(outcome.is_finished());

        let chain: Vec<String> = session
            .workflow()
            .live_chain()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(chain, vec!["email", "plan", "coupon"]);
    }

    #[test]
    fn test_back_from_first_step_reports_error() {
        let recorder = Rc::new(RecordingHandler::default());
        let session = session(&recorder, &[]);

        let outcome = session.run(Cursor::new(":back\n:abandon\n")).unwrap();

        assert_eq!(outcome, SessionOutcome::Abandoned);
        let events = recorder.events.borrow();
        assert!(events.iter().any(|e| matches!(
            e,
            OutputEvent::Error { message } if message.contains("first step")
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, OutputEvent::WorkflowAbandoned { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, OutputEvent::StepDismissed { name, animated: true } if name == "email")));
        assert!(session.workflow().live_chain().is_empty());
    }

    #[test]
    fn test_input_closed_early() {
        let recorder = Rc::new(RecordingHandler::default());
        let session = session(&recorder, &[]);

        let outcome = session.run(Cursor::new("only@x.io\n")).unwrap();

        assert_eq!(outcome, SessionOutcome::Interrupted);
        assert!(!session.workflow().is_launched());
    }
}
