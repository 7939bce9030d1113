//! Import pipeline: registry guard, transformation policies and the insert action

pub mod action;
pub mod policy;
pub mod registry;

pub use action::*;
pub use policy::*;
pub use registry::*;
