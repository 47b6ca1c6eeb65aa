//! Agentic Control - Scene Operations
//!
//! The owner-side half of the system: the operations a controller can ask
//! for ([`SceneOp`]), what they return ([`SceneOutput`]), how they fail
//! ([`SceneError`]), and an in-memory [`Scene`] that executes them.
//!
//! A backend is only ever touched from the owner context; handlers reach it
//! exclusively through the dispatch bridge.

pub mod memory;
pub mod ops;
pub mod types;

pub use memory::{GENERATED_ROOT, Scene};
pub use ops::{SceneError, SceneOp, SceneOutput};
pub use types::{ActorInfo, ActorKind, Rotator, Transform, TransformPatch, Vec3};

/// Executes owner operations against live scene state.
///
/// Implementations need not be `Send` or `Sync`: the owner thread holds the
/// backend for its whole life.
pub trait SceneBackend {
    fn execute(&mut self, op: SceneOp) -> Result<SceneOutput, SceneError>;
}

/// The boxed backend the owner thread drives.
pub type DynScene = Box<dyn SceneBackend>;

impl<B: SceneBackend + ?Sized> SceneBackend for Box<B> {
    fn execute(&mut self, op: SceneOp) -> Result<SceneOutput, SceneError> {
        (**self).execute(op)
    }
}
