//! Static step descriptors that make up a blueprint

use super::args::{ArgsMismatch, ArgsType, PassedArgs, extract_input};
use super::flow::{AnyFlowRepresentable, FlowRepresentable};
use serde::{Deserialize, Serialize};
use std::any::{TypeId, type_name};
use std::fmt;
use std::rc::Rc;

/// How the embedding should present a step
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStyle {
    /// Whatever the embedding considers normal
    #[default]
    Default,
    /// Sheet-style modal
    Modal,
    /// Fullscreen modal
    ModalFullscreen,
    /// Pushed onto a navigation stack
    NavigationLink,
}

impl LaunchStyle {
    pub const ALL: [LaunchStyle; 4] = [
        LaunchStyle::Default,
        LaunchStyle::Modal,
        LaunchStyle::ModalFullscreen,
        LaunchStyle::NavigationLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchStyle::Default => "default",
            LaunchStyle::Modal => "modal",
            LaunchStyle::ModalFullscreen => "modal_fullscreen",
            LaunchStyle::NavigationLink => "navigation_link",
        }
    }
}

impl fmt::Display for LaunchStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a step stays reachable by backing up
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlowPersistence {
    /// Stays in history after proceeding
    #[default]
    Default,
    /// Kept in history, hidden, even when its skip predicate says skip
    #[serde(alias = "hidden_initially")]
    PersistWhenSkipped,
    /// Unlinked from history once proceeded past
    RemovedAfterProceeding,
}

impl fmt::Display for FlowPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowPersistence::Default => "default",
            FlowPersistence::PersistWhenSkipped => "persist_when_skipped",
            FlowPersistence::RemovedAfterProceeding => "removed_after_proceeding",
        };
        f.write_str(s)
    }
}

pub type SkipPredicate = Rc<dyn Fn(&PassedArgs) -> bool>;

type StepFactory = Rc<dyn Fn(&PassedArgs) -> Result<Box<dyn AnyFlowRepresentable>, ArgsMismatch>>;

/// Persistence fixed up front or decided from the incoming args
#[derive(Clone)]
pub enum PersistenceRule {
    Fixed(FlowPersistence),
    Computed(Rc<dyn Fn(&PassedArgs) -> FlowPersistence>),
}

impl PersistenceRule {
    pub fn resolve(&self, args: &PassedArgs) -> FlowPersistence {
        match self {
            PersistenceRule::Fixed(p) => *p,
            PersistenceRule::Computed(f) => f(args),
        }
    }
}

impl Default for PersistenceRule {
    fn default() -> Self {
        PersistenceRule::Fixed(FlowPersistence::Default)
    }
}

impl fmt::Debug for PersistenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceRule::Fixed(p) => write!(f, "Fixed({})", p),
            PersistenceRule::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// Immutable descriptor for one step of a blueprint
#[derive(Clone)]
pub struct FlowMetadata {
    name: String,
    step_type: TypeId,
    input: ArgsType,
    output: ArgsType,
    launch_style: LaunchStyle,
    persistence: PersistenceRule,
    skip: Option<SkipPredicate>,
    factory: StepFactory,
}

impl FlowMetadata {
    /// Descriptor for a concrete step type
    ///
    /// The step is built with `S::new` from the incoming args.
    pub fn of<S: FlowRepresentable>() -> Self {
        let full = type_name::<S>();
        let name = full.rsplit("::").next().unwrap_or(full).to_string();
        Self {
            name,
            step_type: TypeId::of::<S>(),
            input: ArgsType::of::<S::Input>(),
            output: ArgsType::of::<S::Output>(),
            launch_style: LaunchStyle::default(),
            persistence: PersistenceRule::default(),
            skip: None,
            factory: Rc::new(|args: &PassedArgs| {
                let input = extract_input::<S::Input>(args)?;
                Ok(Box::new(S::new(input)) as Box<dyn AnyFlowRepresentable>)
            }),
        }
    }

    /// Descriptor for a step built by a custom factory
    ///
    /// Used for steps whose construction needs more than the incoming args,
    /// e.g. steps described in configuration files.
    pub fn from_factory<S, F>(name: impl Into<String>, factory: F) -> Self
    where
        S: FlowRepresentable,
        F: Fn(&PassedArgs) -> Result<S, ArgsMismatch> + 'static,
    {
        Self {
            name: name.into(),
            step_type: TypeId::of::<S>(),
            input: ArgsType::of::<S::Input>(),
            output: ArgsType::of::<S::Output>(),
            launch_style: LaunchStyle::default(),
            persistence: PersistenceRule::default(),
            skip: None,
            factory: Rc::new(move |args: &PassedArgs| {
                factory(args).map(|step| Box::new(step) as Box<dyn AnyFlowRepresentable>)
            }),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_launch_style(mut self, style: LaunchStyle) -> Self {
        self.launch_style = style;
        self
    }

    pub fn with_persistence(mut self, persistence: FlowPersistence) -> Self {
        self.persistence = PersistenceRule::Fixed(persistence);
        self
    }

    /// Decide persistence from the args the step is reached with
    pub fn with_persistence_fn(
        mut self,
        f: impl Fn(&PassedArgs) -> FlowPersistence + 'static,
    ) -> Self {
        self.persistence = PersistenceRule::Computed(Rc::new(f));
        self
    }

    /// Skip this step whenever `predicate` returns true for the incoming args
    pub fn skip_when(mut self, predicate: impl Fn(&PassedArgs) -> bool + 'static) -> Self {
        self.skip = Some(Rc::new(predicate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_type(&self) -> TypeId {
        self.step_type
    }

    pub fn is_step<S: FlowRepresentable>(&self) -> bool {
        self.step_type == TypeId::of::<S>()
    }

    pub fn input(&self) -> ArgsType {
        self.input
    }

    pub fn output(&self) -> ArgsType {
        self.output
    }

    pub fn launch_style(&self) -> LaunchStyle {
        self.launch_style
    }

    pub fn has_skip_predicate(&self) -> bool {
        self.skip.is_some()
    }

    pub fn should_skip(&self, args: &PassedArgs) -> bool {
        self.skip.as_ref().is_some_and(|skip| skip(args))
    }

    pub fn persistence_for(&self, args: &PassedArgs) -> FlowPersistence {
        self.persistence.resolve(args)
    }

    pub(crate) fn instantiate(
        &self,
        args: &PassedArgs,
    ) -> Result<Box<dyn AnyFlowRepresentable>, ArgsMismatch> {
        (self.factory)(args)
    }
}

impl fmt::Debug for FlowMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowMetadata")
            .field("name", &self.name)
            .field("input", &self.input.name())
            .field("output", &self.output.name())
            .field("launch_style", &self.launch_style)
            .field("persistence", &self.persistence)
            .field("skip", &self.skip.is_some())
            .finish()
    }
}
