//! Agentic Control Server: routes command frames to handlers.
//!
//! The server owns the handler table and provides the `RequestHandler`
//! implementation for the transport layer. Handlers reach the owner only
//! through the dispatch bridge held by [`HandlerContext`].

pub mod handler;
pub mod handlers;
pub mod params;
pub mod router;
pub mod table;

pub use handler::{CommandHandler, HandlerContext};
pub use params::Params;
pub use router::CommandRouter;
pub use table::HandlerTable;
