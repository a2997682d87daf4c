pub mod compiler;
pub mod factory;
pub mod runtime;
