//! Endpoint side of a connection: handler bindings, lifecycle and dispatch.

pub mod bindings;
mod handler;
mod sinks;
mod state;

pub use bindings::{
    BinaryBinding, HandlerBindings, HandlerBindingsBuilder, HandlerResult, TextBinding,
};
pub use handler::FrameHandler;
pub use sinks::SinkManager;
pub use state::LifecycleState;
