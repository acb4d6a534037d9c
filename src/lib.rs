//! Weave rule trigger calls into JVM method bodies at the Nth explicit throw
//!
//! The [`jvm`] module models method bodies as label-addressable instruction streams and the
//! [`weave`] module rewrites them. Reading and writing class files is left to the caller.

pub mod jvm;
pub mod weave;
