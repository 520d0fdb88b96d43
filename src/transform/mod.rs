//! Named operations moving values between form fields and the bundle
//!
//! Every operation is one [`Transformer`] implementing both directions. The
//! mutation direction writes into a slot of the bundle fragment being built; the
//! query direction reads from the bundle scope of the section. Parameters are
//! literals or nested operations, interpreted by the operation that owns them.

pub mod args;
pub mod builtins;
pub mod context;
pub mod registry;

pub use args::Args;
pub use context::{within, SectionLookup, TransformContext};
pub use registry::{Transformer, TransformerRegistry};
