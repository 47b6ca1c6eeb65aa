//! Command router: validates envelopes and dispatches to handlers.

use actl_owner::Dispatcher;
use actl_protocol::{CommandFailure, CommandRequest, Response};
use actl_scene::DynScene;
use actl_transport::RequestHandler;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::handler::HandlerContext;
use crate::params::Params;
use crate::table::HandlerTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    Running,
    ShuttingDown,
}

/// Routes one frame at a time. Never touches owner state itself and never
/// fails: every outcome is an envelope.
pub struct CommandRouter {
    table: HandlerTable,
    ctx: HandlerContext,
    state: RwLock<RouterState>,
}

impl CommandRouter {
    pub fn new(table: HandlerTable, dispatcher: Dispatcher<DynScene>) -> Self {
        info!("Command router ready ({} commands)", table.len());
        Self {
            table,
            ctx: HandlerContext::new(dispatcher),
            state: RwLock::new(RouterState::Running),
        }
    }

    /// Refuse every further frame with "Server is shutting down". Idempotent.
    pub fn begin_shutdown(&self) {
        let mut state = self.state.write();
        if *state == RouterState::Running {
            *state = RouterState::ShuttingDown;
            info!("Command router shutting down");
        }
    }

    pub fn is_running(&self) -> bool {
        *self.state.read() == RouterState::Running
    }

    /// Route one frame to its handler and return the response envelope.
    pub async fn route(&self, frame: &str) -> Response {
        if !self.is_running() {
            return CommandFailure::ShuttingDown.into();
        }

        let request = match CommandRequest::parse(frame) {
            Ok(request) => request,
            Err(failure) => {
                debug!("Rejected frame: {failure}");
                return failure.into();
            }
        };

        let Some(handler) = self.table.get(&request.command) else {
            debug!("Unknown command: {}", request.command);
            return CommandFailure::UnknownCommand.into();
        };

        let params = request.params_object();
        if handler.requires_params_dyn() && params.is_none() {
            return CommandFailure::missing_params(&request.command).into();
        }

        debug!("Dispatching {}", request.command);
        let response = handler.handle_dyn(&self.ctx, Params::new(params)).await;
        debug!("{} -> success={}", request.command, response.is_success());
        response
    }
}

impl RequestHandler for CommandRouter {
    async fn handle_line(&self, frame: &str) -> String {
        self.route(frame).await.to_line()
    }
}
