//! Whole-program queries over the dependency graph and the context caches.

pub mod circular;
pub mod deps;
pub mod related;
pub mod stats;
pub mod unused;
