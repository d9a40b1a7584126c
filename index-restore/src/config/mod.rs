//! Configuration and dependency wiring for the restore binary.

mod dependencies;

pub use dependencies::Dependencies;
