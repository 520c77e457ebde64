//! In-process publish/subscribe registry.
//!
//! ```
//! use pubsub_core::Registry;
//!
//! let registry: Registry<String> = Registry::new();
//! registry.subscribe("signin", "comps.context.refresh".to_string(), |user: &String| {
//!     println!("{user} signed in");
//! });
//! registry.publish("signin", &"ptrdo".to_string());
//! registry.unsubscribe("signin", "comps.context.refresh");
//! ```

pub mod diagnostic;
pub mod error;
mod registry;
mod snapshot;
mod subscription;

pub use diagnostic::{Diagnostic, DiagnosticSink, MemorySink, Operation, TracingSink};
pub use error::{RegistryError, Result};
pub use registry::{Registry, DEFAULT_EVENT};
pub use snapshot::Snapshot;
pub use subscription::{Callback, CallbackOutcome, Subscription};
