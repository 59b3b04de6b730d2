//! Owner-side wrapper: launch args plus finish / abandon callbacks

use super::args::PassedArgs;
use super::engine::Workflow;
use super::error::WorkflowError;
use super::responder::{OnFinish, OrchestrationResponder};
use super::state::LaunchOutcome;
use std::cell::Cell;
use std::rc::Rc;

type FinishHook = Rc<dyn Fn(&PassedArgs)>;
type AbandonHook = Rc<dyn Fn()>;

/// Launches a workflow with fixed args and fans out its completion
///
/// # Example
///
/// ```ignore
/// let launcher = WorkflowLauncher::new(workflow, PassedArgs::args(username))
///     .on_finish(|args| println!("done: {:?}", args))
///     .on_abandon(|| println!("cancelled"));
///
/// launcher.launch(responder.clone())?;
/// ```
pub struct WorkflowLauncher {
    workflow: Workflow,
    launch_args: PassedArgs,
    on_finish: Vec<FinishHook>,
    on_abandon: Vec<AbandonHook>,
    finished: Rc<Cell<bool>>,
}

impl WorkflowLauncher {
    pub fn new(workflow: Workflow, launch_args: PassedArgs) -> Self {
        Self {
            workflow,
            launch_args,
            on_finish: Vec::new(),
            on_abandon: Vec::new(),
            finished: Rc::new(Cell::new(false)),
        }
    }

    /// Add an action to run when the workflow finishes
    pub fn on_finish(mut self, f: impl Fn(&PassedArgs) + 'static) -> Self {
        self.on_finish.push(Rc::new(f));
        self
    }

    /// Add an action to run once the workflow has been abandoned
    pub fn on_abandon(mut self, f: impl Fn() + 'static) -> Self {
        self.on_abandon.push(Rc::new(f));
        self
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn launch_args(&self) -> &PassedArgs {
        &self.launch_args
    }

    /// Whether the current run has finished
    pub fn has_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn launch(
        &self,
        responder: Rc<dyn OrchestrationResponder>,
    ) -> Result<LaunchOutcome, WorkflowError> {
        if self.workflow.is_launched() {
            return Err(WorkflowError::AlreadyLaunched);
        }
        self.finished.set(false);

        let hooks = self.on_finish.clone();
        let finished = self.finished.clone();
        let on_finish: OnFinish = Box::new(move |args| {
            finished.set(true);
            for hook in &hooks {
                hook(&args);
            }
        });

        self.workflow
            .launch(responder, self.launch_args.clone(), Some(on_finish))
    }

    /// Abandon the run; abandon actions run once the responder is done
    pub fn abandon(&self, animated: bool) -> bool {
        let hooks = self.on_abandon.clone();
        self.workflow.abandon(
            animated,
            Some(Box::new(move || {
                for hook in &hooks {
                    hook();
                }
            })),
        )
    }

    /// Start over with the original launch args
    ///
    /// A run still in progress (or finished but not abandoned) is abandoned
    /// quietly first; abandon actions do not run.
    pub fn relaunch(
        &self,
        responder: Rc<dyn OrchestrationResponder>,
    ) -> Result<LaunchOutcome, WorkflowError> {
        if self.workflow.is_launched() {
            tracing::debug!("Resetting workflow before relaunch");
            self.workflow.abandon(false, None);
        }
        self.launch(responder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_support::*;
    use crate::workflow::{FlowMetadata, FlowState};
    use std::cell::RefCell;

    fn two_step_workflow() -> Workflow {
        Workflow::starting_with(FlowMetadata::of::<StepA>())
            .then_proceed_with(FlowMetadata::of::<StepB>())
            .unwrap()
    }

    #[test]
    fn test_all_finish_actions_run() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let launcher = WorkflowLauncher::new(two_step_workflow(), text("ada"))
            .on_finish({
                let seen = seen.clone();
                move |args: &PassedArgs| seen.borrow_mut().push(format!("first:{:?}", args.extract::<String>()))
            })
            .on_finish({
                let seen = seen.clone();
                move |_: &PassedArgs| seen.borrow_mut().push("second".into())
            });
        let responder = MockResponder::new();

        let a = launcher.launch(responder.clone()).unwrap().node().cloned().unwrap();
        assert_eq!(
            a.with_step::<StepA, _>(|s| s.input.extract::<String>()),
            Some(Some("ada".into()))
        );
        proceed::<StepA>(&a, "x".into()).unwrap();
        let b = launcher.workflow().active_node().unwrap();
        proceed::<StepB>(&b, "y".into()).unwrap();

        assert!(launcher.has_finished());
        assert_eq!(
            *seen.borrow(),
            vec!["first:Some(\"y\")".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_abandon_actions_run_after_teardown() {
        let calls = Rc::new(Cell::new(0));
        let launcher = WorkflowLauncher::new(two_step_workflow(), PassedArgs::None).on_abandon({
            let calls = calls.clone();
            move || calls.set(calls.get() + 1)
        });
        let responder = MockResponder::new();

        assert!(!launcher.abandon(false));
        assert_eq!(calls.get(), 0);

        launcher.launch(responder.clone()).unwrap();
        assert!(launcher.abandon(true));
        assert_eq!(calls.get(), 1);
        assert!(launcher.workflow().live_chain().is_empty());
    }

    #[test]
    fn test_relaunch_resets_run() {
        let finishes = Rc::new(Cell::new(0));
        let abandons = Rc::new(Cell::new(0));
        let launcher = WorkflowLauncher::new(
            Workflow::starting_with(FlowMetadata::of::<StepA>()),
            PassedArgs::None,
        )
        .on_finish({
            let finishes = finishes.clone();
            move |_: &PassedArgs| finishes.set(finishes.get() + 1)
        })
        .on_abandon({
            let abandons = abandons.clone();
            move || abandons.set(abandons.get() + 1)
        });
        let responder = MockResponder::new();

        let a = launcher.launch(responder.clone()).unwrap().node().cloned().unwrap();
        proceed::<StepA>(&a, "done".into()).unwrap();
        assert_eq!(launcher.workflow().state(), FlowState::Finished);
        assert!(launcher.launch(responder.clone()).unwrap_err().is_relaunch());

        let a = launcher.relaunch(responder.clone()).unwrap().node().cloned().unwrap();
        assert!(!launcher.has_finished());
        assert_eq!(abandons.get(), 0);

        proceed::<StepA>(&a, "again".into()).unwrap();
        assert_eq!(finishes.get(), 2);
    }
}
