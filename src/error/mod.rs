//! Defines the errors raised by every stage of the library, one enum per module.

mod error_types;

pub use error_types::*;
