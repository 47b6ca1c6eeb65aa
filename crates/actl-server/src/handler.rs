//! The per-command handler interface.

use std::future::Future;
use std::pin::Pin;

use actl_owner::Dispatcher;
use actl_protocol::{CommandName, Response};
use actl_scene::{DynScene, SceneBackend, SceneOp};
use tracing::debug;

use crate::params::Params;

/// What a handler may use: submission to the owner, nothing else.
#[derive(Clone)]
pub struct HandlerContext {
    dispatcher: Dispatcher<DynScene>,
}

impl HandlerContext {
    pub fn new(dispatcher: Dispatcher<DynScene>) -> Self {
        Self { dispatcher }
    }

    /// Run one scene operation on the owner and wrap its outcome.
    pub async fn execute(&self, op: SceneOp) -> Response {
        let name = op.name();
        match self.dispatcher.run(move |scene| scene.execute(op)).await {
            Ok(Ok(output)) => Response::ok_with(output.into_fields()),
            Ok(Err(err)) => {
                debug!("Scene op {name} failed: {err}");
                Response::error(err.to_string())
            }
            Err(err) => {
                debug!("Scene op {name} not completed: {err}");
                Response::error(err.to_string())
            }
        }
    }
}

/// Trait implemented by every command handler.
pub trait CommandHandler: Send + Sync + 'static {
    /// Wire name of the command, matched case-sensitively.
    fn name(&self) -> CommandName;

    /// Whether `params` must be present and an object.
    fn requires_params(&self) -> bool {
        true
    }

    /// Validate params, perform the operation and build the envelope.
    fn handle(
        &self,
        ctx: &HandlerContext,
        params: Params<'_>,
    ) -> impl Future<Output = Response> + Send;
}

/// Object-safe wrapper for the CommandHandler trait.
pub(crate) trait HandlerDyn: Send + Sync {
    fn name_dyn(&self) -> CommandName;
    fn requires_params_dyn(&self) -> bool;
    fn handle_dyn<'a>(
        &'a self,
        ctx: &'a HandlerContext,
        params: Params<'a>,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>>;
}

impl<T: CommandHandler> HandlerDyn for T {
    fn name_dyn(&self) -> CommandName {
        self.name()
    }

    fn requires_params_dyn(&self) -> bool {
        self.requires_params()
    }

    fn handle_dyn<'a>(
        &'a self,
        ctx: &'a HandlerContext,
        params: Params<'a>,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(self.handle(ctx, params))
    }
}
