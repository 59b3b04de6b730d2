//! Responder that routes each step to a presenter for its launch style
//!
//! Every [`LaunchStyle`] has exactly one presenter slot and dispatch is an
//! exhaustive `match`, so adding a style means adding a slot here.

use crate::workflow::{InstanceNode, LaunchStyle, OnAbandoned, OrchestrationResponder, Workflow};
use std::rc::Rc;

/// Shows and hides steps for one launch style
pub trait Presenter {
    fn present(&self, to: &Rc<InstanceNode>, from: Option<&Rc<InstanceNode>>);

    fn dismiss(&self, _node: &Rc<InstanceNode>, _animated: bool) {}
}

/// [`OrchestrationResponder`] that dispatches on the step's launch style
#[derive(Clone)]
pub struct PresentationRouter {
    default: Rc<dyn Presenter>,
    modal: Rc<dyn Presenter>,
    modal_fullscreen: Rc<dyn Presenter>,
    navigation_link: Rc<dyn Presenter>,
}

impl PresentationRouter {
    /// Route every style to `presenter`
    pub fn new(presenter: Rc<dyn Presenter>) -> Self {
        Self {
            default: presenter.clone(),
            modal: presenter.clone(),
            modal_fullscreen: presenter.clone(),
            navigation_link: presenter,
        }
    }

    /// Replace the presenter for one style
    pub fn with_presenter(mut self, style: LaunchStyle, presenter: Rc<dyn Presenter>) -> Self {
        match style {
            LaunchStyle::Default => self.default = presenter,
            LaunchStyle::Modal => self.modal = presenter,
            LaunchStyle::ModalFullscreen => self.modal_fullscreen = presenter,
            LaunchStyle::NavigationLink => self.navigation_link = presenter,
        }
        self
    }

    pub fn presenter_for(&self, style: LaunchStyle) -> &Rc<dyn Presenter> {
        match style {
            LaunchStyle::Default => &self.default,
            LaunchStyle::Modal => &self.modal,
            LaunchStyle::ModalFullscreen => &self.modal_fullscreen,
            LaunchStyle::NavigationLink => &self.navigation_link,
        }
    }

    fn presenter_of(&self, node: &InstanceNode) -> &Rc<dyn Presenter> {
        self.presenter_for(node.metadata().launch_style())
    }
}

impl OrchestrationResponder for PresentationRouter {
    fn proceed(&self, to: &Rc<InstanceNode>, from: Option<&Rc<InstanceNode>>) {
        tracing::debug!(
            step = to.name(),
            style = %to.metadata().launch_style(),
            "Presenting step"
        );
        self.presenter_of(to).present(to, from);
    }

    fn back_up(&self, from: &Rc<InstanceNode>, to: &Rc<InstanceNode>) {
        self.presenter_of(from).dismiss(from, true);
        self.presenter_of(to).present(to, Some(from));
    }

    fn abandon(&self, workflow: &Workflow, animated: bool, on_finish: OnAbandoned) {
        for node in workflow.live_chain().iter().rev() {
            self.presenter_of(node).dismiss(node, animated);
        }
        on_finish();
    }
}
