//! Blueprint container and the launch / proceed / back-up / abandon algorithm

use super::args::PassedArgs;
use super::error::{AssemblyError, WorkflowError};
use super::metadata::{FlowMetadata, FlowPersistence};
use super::node::{InstanceNode, retire_chain};
use super::responder::{OnAbandoned, OnFinish, OrchestrationResponder};
use super::state::{FlowState, LaunchOutcome};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared state behind a [`Workflow`] handle
pub struct WorkflowCore {
    blueprint: Vec<FlowMetadata>,
    head: Option<Rc<InstanceNode>>,
    active: Option<Rc<InstanceNode>>,
    responder: Option<Rc<dyn OrchestrationResponder>>,
    on_finish: Option<OnFinish>,
    state: FlowState,
    generation: u64,
    next_node_id: u64,
}

/// An ordered blueprint of steps plus, once launched, its live chain
///
/// Cloning the handle shares the same workflow. Not thread-safe: every
/// transition must happen on the thread that owns it.
#[derive(Clone)]
pub struct Workflow {
    core: Rc<RefCell<WorkflowCore>>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Nodes to link for one transition; `target` (if any) is the last of `nodes`
#[derive(Default)]
struct Plan {
    nodes: Vec<Rc<InstanceNode>>,
    target: Option<Rc<InstanceNode>>,
}

impl Workflow {
    /// Create an empty workflow
    pub fn new() -> Self {
        Self {
            core: Rc::new(RefCell::new(WorkflowCore {
                blueprint: Vec::new(),
                head: None,
                active: None,
                responder: None,
                on_finish: None,
                state: FlowState::Idle,
                generation: 0,
                next_node_id: 0,
            })),
        }
    }

    /// Create a workflow whose first step is `metadata`
    pub fn starting_with(metadata: FlowMetadata) -> Self {
        let workflow = Self::new();
        workflow.core.borrow_mut().blueprint.push(metadata);
        workflow
    }

    pub(crate) fn from_core(core: Rc<RefCell<WorkflowCore>>) -> Self {
        Self { core }
    }

    /// Add a step to the end of the blueprint
    ///
    /// Fails if the step's input cannot take the previous step's output.
    pub fn append(&self, metadata: FlowMetadata) -> Result<(), AssemblyError> {
        let mut core = self.core.borrow_mut();

        if let Some(last) = core.blueprint.last() {
            if !metadata.input().accepts(last.output()) {
                return Err(AssemblyError::IncompatibleArgs {
                    step: metadata.name().to_string(),
                    expected: metadata.input().name(),
                    found: last.output().name(),
                });
            }
        }

        tracing::debug!(
            step = metadata.name(),
            index = core.blueprint.len(),
            "Appended step to blueprint"
        );
        core.blueprint.push(metadata);
        Ok(())
    }

    /// Builder form of [`Workflow::append`]
    pub fn then_proceed_with(self, metadata: FlowMetadata) -> Result<Self, AssemblyError> {
        self.append(metadata)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.core.borrow().blueprint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.borrow().blueprint.is_empty()
    }

    pub fn blueprint(&self) -> Vec<FlowMetadata> {
        self.core.borrow().blueprint.clone()
    }

    pub fn metadata(&self, index: usize) -> Option<FlowMetadata> {
        self.core.borrow().blueprint.get(index).cloned()
    }

    pub fn state(&self) -> FlowState {
        self.core.borrow().state
    }

    pub fn is_launched(&self) -> bool {
        self.state() != FlowState::Idle
    }

    pub fn active_node(&self) -> Option<Rc<InstanceNode>> {
        self.core.borrow().active.clone()
    }

    pub fn head(&self) -> Option<Rc<InstanceNode>> {
        self.core.borrow().head.clone()
    }

    /// Nodes currently linked, head first
    pub fn live_chain(&self) -> Vec<Rc<InstanceNode>> {
        let mut chain = Vec::new();
        let mut current = self.head();
        while let Some(node) = current {
            current = node.next();
            chain.push(node);
        }
        chain
    }

    pub fn ptr_eq(&self, other: &Workflow) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// Start a run
    ///
    /// Presents the first step whose skip predicate does not match `args`.
    /// When every step is skipped the run completes immediately with `args`.
    /// Rejected without any state change if a run is already in progress or
    /// finished but not yet abandoned.
    pub fn launch(
        &self,
        responder: Rc<dyn OrchestrationResponder>,
        args: PassedArgs,
        on_finish: Option<OnFinish>,
    ) -> Result<LaunchOutcome, WorkflowError> {
        let (target, on_finish) = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;

            if core.state != FlowState::Idle {
                tracing::warn!(state = %core.state, "Rejected launch of a workflow that is already launched");
                return Err(WorkflowError::AlreadyLaunched);
            }

            let plan = self.plan(core, 0, &args)?;

            let leftover = retire_chain(core.head.take());
            if leftover > 0 {
                tracing::debug!(leftover, "Tore down chain left from a previous run");
            }

            core.generation += 1;
            core.responder = Some(responder.clone());
            link_after(core, None, plan.nodes);

            tracing::info!(
                steps = core.blueprint.len(),
                generation = core.generation,
                "Launched workflow"
            );

            match plan.target {
                Some(target) => {
                    core.active = Some(target.clone());
                    core.state = FlowState::Active;
                    core.on_finish = on_finish;
                    (Some(target), None)
                }
                None => {
                    core.state = FlowState::Finished;
                    (None, on_finish)
                }
            }
        };

        match target {
            Some(node) => {
                tracing::debug!(step = node.name(), "Presenting first step");
                responder.proceed(&node, None);
                Ok(LaunchOutcome::Presented(node))
            }
            None => {
                tracing::info!("Every step skipped, completing immediately");
                responder.complete(self, args, on_finish);
                Ok(LaunchOutcome::Completed)
            }
        }
    }

    /// Proceed from the active step with `args`
    pub fn proceed(&self, args: PassedArgs) -> Result<(), WorkflowError> {
        let active = self.active_node().ok_or(WorkflowError::NotRunning)?;
        self.advance(&active, args)
    }

    /// Back up from the active step
    pub fn back_up(&self) -> Result<(), WorkflowError> {
        let active = self.active_node().ok_or(WorkflowError::NotRunning)?;
        self.back_up_from(&active)
    }

    /// Abandon the run
    ///
    /// Returns false, without calling the responder, when nothing is
    /// launched. Otherwise the workflow goes back to idle at once and the
    /// responder is asked to tear down; the live chain is released and
    /// `on_finish` runs when the responder reports it is done.
    pub fn abandon(&self, animated: bool, on_finish: Option<OnAbandoned>) -> bool {
        let (responder, generation) = {
            let mut core = self.core.borrow_mut();
            if core.state == FlowState::Idle {
                tracing::debug!("Ignoring abandon of a workflow that is not launched");
                return false;
            }
            core.state = FlowState::Idle;
            core.active = None;
            core.on_finish = None;
            (core.responder.take(), core.generation)
        };

        tracing::info!(animated, generation, "Abandoning workflow");

        let weak = Rc::downgrade(&self.core);
        let completion: OnAbandoned = Box::new(move || {
            if let Some(core) = weak.upgrade() {
                Workflow::from_core(core).teardown(generation);
            }
            if let Some(on_finish) = on_finish {
                on_finish();
            }
        });

        match responder {
            Some(responder) => responder.abandon(self, animated, completion),
            None => completion(),
        }
        true
    }

    /// Move forward from `from`, which must be the active node
    pub(crate) fn advance(
        &self,
        from: &Rc<InstanceNode>,
        args: PassedArgs,
    ) -> Result<(), WorkflowError> {
        let (responder, target, on_finish) = {
            let mut guard = self.core.borrow_mut();
            let core = &mut *guard;

            if !Self::is_active(core, from) {
                tracing::warn!(step = from.name(), state = %core.state, "Rejected proceed from a step that is not active");
                return Err(WorkflowError::NotActive {
                    step: from.name().to_string(),
                });
            }

            let plan = self.plan(core, from.blueprint_index() + 1, &args)?;

            let discarded = retire_chain(from.take_next());
            if discarded > 0 {
                tracing::debug!(step = from.name(), discarded, "Discarded steps ahead of the proceeding step");
            }

            let anchor = if from.persistence() == FlowPersistence::RemovedAfterProceeding {
                let previous = from.previous();
                match &previous {
                    Some(previous) => previous.set_next(None),
                    None => core.head = None,
                }
                from.set_previous(None);
                from.retire();
                tracing::debug!(step = from.name(), "Removed step from history after proceeding");
                previous
            } else {
                Some(from.clone())
            };

            link_after(core, anchor.as_ref(), plan.nodes);

            match plan.target {
                Some(target) => {
                    core.active = Some(target.clone());
                    (core.responder.clone(), Some(target), None)
                }
                None => {
                    core.active = None;
                    core.state = FlowState::Finished;
                    (core.responder.clone(), None, core.on_finish.take())
                }
            }
        };

        match target {
            Some(to) => {
                tracing::debug!(from = from.name(), to = to.name(), "Proceeding to next step");
                if let Some(responder) = responder {
                    responder.proceed(&to, Some(from));
                }
            }
            None => {
                tracing::info!(last = from.name(), "Workflow finished");
                match responder {
                    Some(responder) => responder.complete(self, args, on_finish),
                    None => {
                        if let Some(on_finish) = on_finish {
                            on_finish(args);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Move back from `from`, which must be the active node
    pub(crate) fn back_up_from(&self, from: &Rc<InstanceNode>) -> Result<(), WorkflowError> {
        let (responder, to) = {
            let mut core = self.core.borrow_mut();

            if !Self::is_active(&core, from) {
                tracing::warn!(step = from.name(), state = %core.state, "Rejected back up from a step that is not active");
                return Err(WorkflowError::NotActive {
                    step: from.name().to_string(),
                });
            }

            let Some(to) = from.previous() else {
                tracing::warn!(step = from.name(), "Rejected back up from the first step");
                return Err(WorkflowError::NoPreviousStep {
                    step: from.name().to_string(),
                });
            };

            core.active = Some(to.clone());
            (core.responder.clone(), to)
        };

        tracing::debug!(from = from.name(), to = to.name(), "Backing up");
        if let Some(responder) = responder {
            responder.back_up(from, &to);
        }
        Ok(())
    }

    fn is_active(core: &WorkflowCore, node: &Rc<InstanceNode>) -> bool {
        core.state == FlowState::Active
            && node.is_live()
            && core
                .active
                .as_ref()
                .is_some_and(|active| Rc::ptr_eq(active, node))
    }

    /// Walk the blueprint from `start`, building every node the transition needs
    ///
    /// Nothing is linked here, so a failed instantiation leaves the chain as it was.
    fn plan(
        &self,
        core: &mut WorkflowCore,
        start: usize,
        args: &PassedArgs,
    ) -> Result<Plan, WorkflowError> {
        let workflow = Rc::downgrade(&self.core);
        let WorkflowCore {
            blueprint,
            next_node_id,
            ..
        } = core;

        let mut plan = Plan::default();
        for (index, metadata) in blueprint.iter().enumerate().skip(start) {
            let persistence = metadata.persistence_for(args);

            if metadata.should_skip(args) {
                tracing::debug!(step = metadata.name(), index, "Skipping step");
                if persistence == FlowPersistence::PersistWhenSkipped {
                    let node =
                        instantiate(next_node_id, &workflow, index, metadata, args, persistence, true)?;
                    plan.nodes.push(node);
                }
                continue;
            }

            let node = instantiate(next_node_id, &workflow, index, metadata, args, persistence, false)?;
            plan.nodes.push(node.clone());
            plan.target = Some(node);
            break;
        }
        Ok(plan)
    }

    /// Release a chain left behind by an abandoned run
    fn teardown(&self, generation: u64) {
        let head = {
            let mut core = self.core.borrow_mut();
            if core.generation != generation {
                tracing::debug!(generation, current = core.generation, "Ignoring stale abandon completion");
                return;
            }
            core.head.take()
        };
        let retired = retire_chain(head);
        tracing::debug!(retired, "Tore down live chain");
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Workflow")
            .field(
                "blueprint",
                &core.blueprint.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("state", &core.state)
            .field("active", &core.active.as_ref().map(|n| n.name().to_string()))
            .finish()
    }
}

fn instantiate(
    next_node_id: &mut u64,
    workflow: &Weak<RefCell<WorkflowCore>>,
    index: usize,
    metadata: &FlowMetadata,
    args: &PassedArgs,
    persistence: FlowPersistence,
    skipped: bool,
) -> Result<Rc<InstanceNode>, WorkflowError> {
    let step = metadata
        .instantiate(args)
        .map_err(|source| WorkflowError::ArgumentMismatch {
            step: metadata.name().to_string(),
            source,
        })?;

    *next_node_id += 1;
    let node = Rc::new(InstanceNode::new(
        *next_node_id,
        metadata.clone(),
        index,
        persistence,
        skipped,
        step,
    ));
    node.attach_step(workflow.clone());
    Ok(node)
}

fn link_after(
    core: &mut WorkflowCore,
    anchor: Option<&Rc<InstanceNode>>,
    nodes: Vec<Rc<InstanceNode>>,
) {
    let mut previous = anchor.cloned();
    for node in nodes {
        node.set_previous(previous.as_ref());
        match &previous {
            Some(previous) => previous.set_next(Some(node.clone())),
            None => core.head = Some(node.clone()),
        }
        previous = Some(node);
    }
}
