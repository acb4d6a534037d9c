//! Model JVM methods at the level needed to rewrite their bodies
//!
//! Names and descriptors use the internal forms from the class file format (eg. `java/lang/Object`
//! and `(ILjava/lang/String;)V`), and method bodies are modelled as label-addressable streams of
//! instructions (see [`code`]).

mod access_flags;
pub mod code;
mod descriptors;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use names::*;
