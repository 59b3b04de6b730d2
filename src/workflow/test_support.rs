//! Steps and a recording responder shared by the workflow tests

use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

macro_rules! test_step {
    ($name:ident, $input:ty, $output:ty) => {
        pub(crate) struct $name {
            pub input: $input,
            workflow: WorkflowPointer,
        }

        impl FlowRepresentable for $name {
            type Input = $input;
            type Output = $output;

            fn new(input: $input) -> Self {
                Self {
                    input,
                    workflow: WorkflowPointer::default(),
                }
            }

            fn workflow_pointer(&self) -> &WorkflowPointer {
                &self.workflow
            }

            fn workflow_pointer_mut(&mut self) -> &mut WorkflowPointer {
                &mut self.workflow
            }
        }
    };
}

test_step!(StepA, PassedArgs, String);
test_step!(StepB, String, String);
test_step!(StepC, String, PassedArgs);
test_step!(StepX, PassedArgs, PassedArgs);
test_step!(StepY, PassedArgs, PassedArgs);
test_step!(NoInput, (), ());
test_step!(Counter, i64, i64);

pub(crate) fn text(s: &str) -> PassedArgs {
    PassedArgs::args(s.to_string())
}

pub(crate) fn is_text(args: &PassedArgs, expected: &str) -> bool {
    args.extract_ref::<String>().is_some_and(|s| s == expected)
}

/// Proceed from `node`, which must hold an `S`
pub(crate) fn proceed<S: FlowRepresentable>(
    node: &Rc<InstanceNode>,
    output: S::Output,
) -> Result<(), WorkflowError> {
    node.with_step::<S, _>(|step| step.proceed_in_workflow(output))
        .expect("node holds a different step type")
}

pub(crate) fn back_up<S: FlowRepresentable>(node: &Rc<InstanceNode>) -> Result<(), WorkflowError> {
    node.with_step::<S, _>(|step| step.back_up_in_workflow())
        .expect("node holds a different step type")
}

pub(crate) fn record_finish(sink: &Rc<RefCell<Vec<Option<String>>>>) -> OnFinish {
    let sink = sink.clone();
    Box::new(move |args| sink.borrow_mut().push(args.extract::<String>()))
}

/// Records every call; optionally holds abandon completions until released
#[derive(Default)]
pub(crate) struct MockResponder {
    proceeds: RefCell<Vec<(Rc<InstanceNode>, Option<Rc<InstanceNode>>)>>,
    back_ups: RefCell<Vec<(Rc<InstanceNode>, Rc<InstanceNode>)>>,
    completes: Cell<usize>,
    abandons: Cell<usize>,
    abandon_animated: Cell<bool>,
    chain_on_abandon: Cell<usize>,
    defer_abandon: bool,
    held: RefCell<Vec<OnAbandoned>>,
}

impl MockResponder {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn deferred() -> Rc<Self> {
        Rc::new(Self {
            defer_abandon: true,
            ..Default::default()
        })
    }

    pub(crate) fn proceed_count(&self) -> usize {
        self.proceeds.borrow().len()
    }

    pub(crate) fn last_to(&self) -> Option<Rc<InstanceNode>> {
        self.proceeds.borrow().last().map(|(to, _)| to.clone())
    }

    pub(crate) fn last_from(&self) -> Option<Rc<InstanceNode>> {
        self.proceeds.borrow().last().and_then(|(_, from)| from.clone())
    }

    pub(crate) fn back_up_count(&self) -> usize {
        self.back_ups.borrow().len()
    }

    pub(crate) fn complete_count(&self) -> usize {
        self.completes.get()
    }

    pub(crate) fn abandon_count(&self) -> usize {
        self.abandons.get()
    }

    pub(crate) fn last_abandon_animated(&self) -> bool {
        self.abandon_animated.get()
    }

    pub(crate) fn chain_seen_on_abandon(&self) -> usize {
        self.chain_on_abandon.get()
    }

    pub(crate) fn release_abandon(&self) {
        let held: Vec<_> = self.held.borrow_mut().drain(..).collect();
        for on_finish in held {
            on_finish();
        }
    }
}

impl OrchestrationResponder for MockResponder {
    fn proceed(&self, to: &Rc<InstanceNode>, from: Option<&Rc<InstanceNode>>) {
        self.proceeds
            .borrow_mut()
            .push((to.clone(), from.cloned()));
    }

    fn back_up(&self, from: &Rc<InstanceNode>, to: &Rc<InstanceNode>) {
        self.back_ups.borrow_mut().push((from.clone(), to.clone()));
    }

    fn abandon(&self, workflow: &Workflow, animated: bool, on_finish: OnAbandoned) {
        self.abandons.set(self.abandons.get() + 1);
        self.abandon_animated.set(animated);
        self.chain_on_abandon.set(workflow.live_chain().len());
        if self.defer_abandon {
            self.held.borrow_mut().push(on_finish);
        } else {
            on_finish();
        }
    }

    fn complete(&self, _workflow: &Workflow, args: PassedArgs, on_finish: Option<OnFinish>) {
        self.completes.set(self.completes.get() + 1);
        if let Some(on_finish) = on_finish {
            on_finish(args);
        }
    }
}
