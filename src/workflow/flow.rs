//! The contract every step implements, and its handle back into the workflow

use super::args::{PassedArgs, into_passed_args};
use super::engine::{Workflow, WorkflowCore};
use super::error::WorkflowError;
use super::node::InstanceNode;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A unit of interaction that takes typed input and produces typed output
///
/// `Input = ()` means the step takes no input; `Input = PassedArgs` accepts
/// whatever the previous step produced. `Output = ()` proceeds with no args.
///
/// # Example
///
/// ```ignore
/// struct EnterEmail {
///     workflow: WorkflowPointer,
/// }
///
/// impl FlowRepresentable for EnterEmail {
///     type Input = ();
///     type Output = String;
///
///     fn new(_: ()) -> Self {
///         Self { workflow: WorkflowPointer::default() }
///     }
///
///     fn workflow_pointer(&self) -> &WorkflowPointer { &self.workflow }
///     fn workflow_pointer_mut(&mut self) -> &mut WorkflowPointer { &mut self.workflow }
/// }
///
/// // later, when the user submits
/// step.proceed_in_workflow("ada@example.com".to_string())?;
/// ```
pub trait FlowRepresentable: Any {
    type Input: Any + Clone;
    type Output: Any;

    fn new(args: Self::Input) -> Self
    where
        Self: Sized;

    fn workflow_pointer(&self) -> &WorkflowPointer;

    fn workflow_pointer_mut(&mut self) -> &mut WorkflowPointer;

    /// Finish this step and hand `args` to the next one
    fn proceed_in_workflow(&self, args: Self::Output) -> Result<(), WorkflowError> {
        self.workflow_pointer().proceed(into_passed_args(args))
    }

    /// Return to the previous step in history
    fn back_up_in_workflow(&self) -> Result<(), WorkflowError> {
        self.workflow_pointer().back_up()
    }

    /// Abandon the whole workflow this step belongs to
    fn abandon_workflow(&self, animated: bool) -> bool {
        self.workflow_pointer().abandon(animated)
    }
}

/// Type-erased step stored inside an [`InstanceNode`]
pub trait AnyFlowRepresentable: Any {
    fn pointer(&self) -> &WorkflowPointer;
    fn pointer_mut(&mut self) -> &mut WorkflowPointer;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: FlowRepresentable> AnyFlowRepresentable for S {
    fn pointer(&self) -> &WorkflowPointer {
        self.workflow_pointer()
    }

    fn pointer_mut(&mut self) -> &mut WorkflowPointer {
        self.workflow_pointer_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Non-owning handle from a step to its node and workflow
///
/// The node owns the step; the step only holds weak references back.
#[derive(Clone, Default)]
pub struct WorkflowPointer {
    node: Weak<InstanceNode>,
    workflow: Weak<RefCell<WorkflowCore>>,
}

impl WorkflowPointer {
    pub(crate) fn attach(&mut self, node: Weak<InstanceNode>, workflow: Weak<RefCell<WorkflowCore>>) {
        self.node = node;
        self.workflow = workflow;
    }

    pub(crate) fn detach(&mut self) {
        self.node = Weak::new();
        self.workflow = Weak::new();
    }

    pub fn is_attached(&self) -> bool {
        self.upgrade().is_ok()
    }

    /// The node this step lives in, while it is live
    pub fn node(&self) -> Option<Rc<InstanceNode>> {
        self.node.upgrade().filter(|node| node.is_live())
    }

    pub fn workflow(&self) -> Option<Workflow> {
        self.workflow.upgrade().map(Workflow::from_core)
    }

    fn upgrade(&self) -> Result<(Workflow, Rc<InstanceNode>), WorkflowError> {
        let node = self.node().ok_or(WorkflowError::Detached)?;
        let workflow = self.workflow().ok_or(WorkflowError::Detached)?;
        Ok((workflow, node))
    }

    pub fn proceed(&self, args: PassedArgs) -> Result<(), WorkflowError> {
        let (workflow, node) = self.upgrade()?;
        workflow.advance(&node, args)
    }

    pub fn back_up(&self) -> Result<(), WorkflowError> {
        let (workflow, node) = self.upgrade()?;
        workflow.back_up_from(&node)
    }

    pub fn abandon(&self, animated: bool) -> bool {
        match self.upgrade() {
            Ok((workflow, _)) => workflow.abandon(animated, None),
            Err(_) => false,
        }
    }
}
