//! Arguments passed between steps

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Value handed from one step to the next
#[derive(Clone, Default)]
pub enum PassedArgs {
    /// No arguments
    #[default]
    None,
    /// A single runtime-typed value
    Args(AnyArgs),
}

impl PassedArgs {
    /// Wrap a value
    pub fn args<T: Any>(value: T) -> Self {
        Self::Args(AnyArgs::new(value))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Borrow the payload if it is a `T`
    pub fn extract_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Args(args) => args.downcast_ref::<T>(),
            Self::None => None,
        }
    }

    /// Clone the payload out if it is a `T`
    pub fn extract<T: Any + Clone>(&self) -> Option<T> {
        self.extract_ref::<T>().cloned()
    }

    /// Name of the payload type, `"none"` when empty
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Args(args) => args.type_name(),
            Self::None => "none",
        }
    }

    /// Render JSON-compatible payloads for template evaluation
    ///
    /// Returns `Some(Value::Null)` for `None` and `None` for payloads
    /// that have no JSON form.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        let args = match self {
            Self::None => return Some(Value::Null),
            Self::Args(args) => args,
        };

        if let Some(v) = args.downcast_ref::<Value>() {
            return Some(v.clone());
        }
        if let Some(s) = args.downcast_ref::<String>() {
            return Some(Value::from(s.clone()));
        }
        if let Some(s) = args.downcast_ref::<&'static str>() {
            return Some(Value::from(*s));
        }
        if let Some(b) = args.downcast_ref::<bool>() {
            return Some(Value::from(*b));
        }
        if let Some(n) = args.downcast_ref::<i64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = args.downcast_ref::<i32>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = args.downcast_ref::<u64>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = args.downcast_ref::<u32>() {
            return Some(Value::from(*n));
        }
        if let Some(n) = args.downcast_ref::<f64>() {
            return Some(Value::from(*n));
        }
        None
    }
}

impl fmt::Debug for PassedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "PassedArgs::None"),
            Self::Args(args) => match self.to_json() {
                Some(json) => write!(f, "PassedArgs::Args({})", json),
                None => write!(f, "PassedArgs::Args(<{}>)", args.type_name()),
            },
        }
    }
}

/// Runtime-typed payload, cheap to clone
#[derive(Clone)]
pub struct AnyArgs {
    value: Rc<dyn Any>,
    type_name: &'static str,
}

impl AnyArgs {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(value),
            type_name: type_name::<T>(),
        }
    }

    fn from_boxed(value: Box<dyn Any>, type_name: &'static str) -> Self {
        Self {
            value: Rc::from(value),
            type_name,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for AnyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyArgs(<{}>)", self.type_name)
    }
}

/// Incoming args could not be turned into a step's declared input
#[derive(Debug, Clone, Error)]
#[error("expected {expected}, got {found}")]
pub struct ArgsMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Runtime tag for a step's declared input or output type
#[derive(Debug, Clone, Copy)]
pub struct ArgsType {
    id: TypeId,
    name: &'static str,
}

impl PartialEq for ArgsType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ArgsType {}

impl ArgsType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Tag for "no args" (`()`)
    pub fn no_args() -> Self {
        Self::of::<()>()
    }

    /// Tag for "any args" (`PassedArgs`)
    pub fn passed_args() -> Self {
        Self::of::<PassedArgs>()
    }

    pub fn is_no_args(&self) -> bool {
        self.id == TypeId::of::<()>()
    }

    pub fn is_passed_args(&self) -> bool {
        self.id == TypeId::of::<PassedArgs>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a step declaring this input can follow a step producing `upstream`
    ///
    /// `()` and `PassedArgs` inputs accept anything; a `PassedArgs` output
    /// defers the check to instantiation.
    pub fn accepts(&self, upstream: ArgsType) -> bool {
        self.is_no_args() || self.is_passed_args() || upstream.is_passed_args() || *self == upstream
    }
}

/// Convert a step's typed output into args for the next step
pub fn into_passed_args<T: Any>(value: T) -> PassedArgs {
    let boxed: Box<dyn Any> = Box::new(value);
    let boxed = match boxed.downcast::<PassedArgs>() {
        Ok(args) => return *args,
        Err(other) => other,
    };
    if boxed.is::<()>() {
        return PassedArgs::None;
    }
    PassedArgs::Args(AnyArgs::from_boxed(boxed, type_name::<T>()))
}

/// Build a step's typed input from incoming args
pub fn extract_input<T: Any + Clone>(args: &PassedArgs) -> Result<T, ArgsMismatch> {
    let mismatch = || ArgsMismatch {
        expected: type_name::<T>(),
        found: args.type_name(),
    };

    if TypeId::of::<T>() == TypeId::of::<()>() {
        let unit: Box<dyn Any> = Box::new(());
        return unit.downcast::<T>().map(|v| *v).map_err(|_| mismatch());
    }
    if TypeId::of::<T>() == TypeId::of::<PassedArgs>() {
        let passed: Box<dyn Any> = Box::new(args.clone());
        return passed.downcast::<T>().map(|v| *v).map_err(|_| mismatch());
    }

    args.extract::<T>().ok_or_else(mismatch)
}
