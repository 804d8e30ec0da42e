//! Foundation types shared across the Vaani voice stack.
//!
//! This crate holds the error taxonomy, the supported locales, and the
//! timing policies that the speech channel and the conversation engine
//! agree on. It has no async machinery of its own.

pub mod error;
pub mod locale;
pub mod policy;

pub use error::*;
pub use locale::*;
pub use policy::*;
