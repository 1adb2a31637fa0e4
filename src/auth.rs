//! Credential types, the resolution context, and the ordered token fallback chain.

pub mod context;
pub mod credential;
pub mod resolver;

pub use context::*;
pub use credential::*;
pub use resolver::*;
