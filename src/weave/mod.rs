//! Weave rule triggers into method bodies
//!
//! A [`ThrowTriggerRewriter`] is built for one target method and one rule. Rewriting the body of
//! the method inserts, right before the Nth explicit `athrow`, a call to the rule hook:
//!
//! ```text
//! start:
//!   ldc "<rule key>"
//!   aload_0 | aconst_null            // receiver, or null for static methods
//!   <Object[] of the boxed arguments>
//!   invokestatic org/jboss/byteman/rule/Rule.execute(Ljava/lang/String;Ljava/lang/Object;[Ljava/lang/Object;)V
//! end:
//!   athrow
//! ```
//!
//! Throws that only re-raise an exception after releasing a monitor don't count. In constructors
//! the call can't happen before the receiver is initialized, so it is held back until the
//! `super(...)`/`this(...)` call (and placed right after that call if the throw it belongs to
//! came before).

mod classifier;
mod errors;
mod latch;
mod registry;
mod rewriter;
mod settings;
mod synthesizer;
mod target;

pub use classifier::*;
pub use errors::*;
pub use latch::*;
pub use registry::*;
pub use rewriter::*;
pub use settings::*;
pub use synthesizer::*;
pub use target::*;
