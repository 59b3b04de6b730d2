//! The embedding's side of orchestration

use super::args::PassedArgs;
use super::engine::Workflow;
use super::node::InstanceNode;
use std::rc::Rc;

/// Called with the final args when a workflow runs off the end of its blueprint
pub type OnFinish = Box<dyn FnOnce(PassedArgs)>;

/// Called once the embedding has torn down an abandoned workflow
pub type OnAbandoned = Box<dyn FnOnce()>;

/// Presents and dismisses steps on behalf of a workflow
///
/// The workflow never holds its own borrow while calling these, so
/// implementations may call back into the workflow. Methods take `&self`;
/// use interior mutability for any state.
pub trait OrchestrationResponder {
    /// Make `to` the visible step; `from` is `None` on a fresh launch
    fn proceed(&self, to: &Rc<InstanceNode>, from: Option<&Rc<InstanceNode>>);

    /// Tear down everything presented for `workflow`, then call `on_finish`
    fn abandon(&self, workflow: &Workflow, animated: bool, on_finish: OnAbandoned);

    /// Return from `from` to the earlier step `to`
    fn back_up(&self, from: &Rc<InstanceNode>, to: &Rc<InstanceNode>) {
        self.proceed(to, Some(from));
    }

    /// The workflow finished with `args`
    fn complete(&self, _workflow: &Workflow, args: PassedArgs, on_finish: Option<OnFinish>) {
        if let Some(on_finish) = on_finish {
            on_finish(args);
        }
    }
}
