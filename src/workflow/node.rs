//! Live step instances, linked in presentation order

use super::flow::{AnyFlowRepresentable, FlowRepresentable};
use super::metadata::{FlowMetadata, FlowPersistence};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// One instantiated step in the live chain
///
/// `next` is owning, `previous` is weak, so the chain is owned front to back
/// by the workflow holding its head.
pub struct InstanceNode {
    id: u64,
    metadata: FlowMetadata,
    blueprint_index: usize,
    persistence: FlowPersistence,
    skipped: bool,
    live: Cell<bool>,
    step: RefCell<Box<dyn AnyFlowRepresentable>>,
    next: RefCell<Option<Rc<InstanceNode>>>,
    previous: RefCell<Weak<InstanceNode>>,
}

impl InstanceNode {
    pub(crate) fn new(
        id: u64,
        metadata: FlowMetadata,
        blueprint_index: usize,
        persistence: FlowPersistence,
        skipped: bool,
        step: Box<dyn AnyFlowRepresentable>,
    ) -> Self {
        Self {
            id,
            metadata,
            blueprint_index,
            persistence,
            skipped,
            live: Cell::new(true),
            step: RefCell::new(step),
            next: RefCell::new(None),
            previous: RefCell::new(Weak::new()),
        }
    }

    /// Unique per workflow, increasing in creation order
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn metadata(&self) -> &FlowMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn blueprint_index(&self) -> usize {
        self.blueprint_index
    }

    /// Persistence resolved with the args this node was created from
    pub fn persistence(&self) -> FlowPersistence {
        self.persistence
    }

    /// Linked in although its skip predicate matched
    pub fn was_skipped(&self) -> bool {
        self.skipped
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    pub fn next(&self) -> Option<Rc<InstanceNode>> {
        self.next.borrow().clone()
    }

    pub fn previous(&self) -> Option<Rc<InstanceNode>> {
        self.previous.borrow().upgrade()
    }

    pub fn ptr_eq(a: &Rc<InstanceNode>, b: &Rc<InstanceNode>) -> bool {
        Rc::ptr_eq(a, b)
    }

    pub fn holds<S: FlowRepresentable>(&self) -> bool {
        self.metadata.is_step::<S>()
    }

    /// Run `f` against the step if it is an `S`
    ///
    /// The step stays borrowed for the duration of `f`; proceeding from
    /// inside `f` is fine, touching this same node's step again is not.
    pub fn with_step<S: FlowRepresentable, R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        let step = self.step.borrow();
        step.as_any().downcast_ref::<S>().map(f)
    }

    pub fn with_step_mut<S: FlowRepresentable, R>(
        &self,
        f: impl FnOnce(&mut S) -> R,
    ) -> Option<R> {
        let mut step = self.step.borrow_mut();
        step.as_any_mut().downcast_mut::<S>().map(f)
    }

    pub(crate) fn set_next(&self, next: Option<Rc<InstanceNode>>) {
        *self.next.borrow_mut() = next;
    }

    pub(crate) fn take_next(&self) -> Option<Rc<InstanceNode>> {
        self.next.borrow_mut().take()
    }

    pub(crate) fn set_previous(&self, previous: Option<&Rc<InstanceNode>>) {
        *self.previous.borrow_mut() = previous.map(Rc::downgrade).unwrap_or_default();
    }

    pub(crate) fn attach_step(
        self: &Rc<Self>,
        workflow: Weak<RefCell<super::engine::WorkflowCore>>,
    ) {
        self.step
            .borrow_mut()
            .pointer_mut()
            .attach(Rc::downgrade(self), workflow);
    }

    /// Mark dead and drop the step's handle back into the workflow
    ///
    /// A step that is borrowed right now keeps its pointer, but the pointer
    /// refuses to act once the node is no longer live.
    pub(crate) fn retire(&self) {
        self.live.set(false);
        if let Ok(mut step) = self.step.try_borrow_mut() {
            step.pointer_mut().detach();
        }
    }
}

impl fmt::Debug for InstanceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceNode")
            .field("id", &self.id)
            .field("name", &self.metadata.name())
            .field("index", &self.blueprint_index)
            .field("persistence", &self.persistence)
            .field("skipped", &self.skipped)
            .field("live", &self.live.get())
            .finish()
    }
}

/// Tear down a detached run of nodes starting at `head`
///
/// Iterative so long chains do not recurse through `Drop`.
pub(crate) fn retire_chain(head: Option<Rc<InstanceNode>>) -> usize {
    let mut count = 0;
    let mut current = head;
    while let Some(node) = current {
        node.retire();
        node.set_previous(None);
        current = node.take_next();
        count += 1;
    }
    count
}
