//! Core vocabulary shared by every layer.
//!
//! - States via the `State` trait
//! - Message families via the `Message` trait
//! - Guards and actions, in free and message-taking arities
//! - Diagnostic traces of resolve passes

mod guard;
mod message;
mod state;
mod trace;

pub use guard::{Action, FreeEffect, FreePredicate, Guard, MessageEffect, MessagePredicate};
pub use message::Message;
pub use state::State;
pub use trace::{Halt, ResolveTrace, StepTrigger, TraceStep};
