//! Typed invocations of the external tools the pipeline depends on.

pub mod npm;
pub mod scaffold;
