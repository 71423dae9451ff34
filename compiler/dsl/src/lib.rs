//! Provides definitions of objects from the IEC 61131-3 language elements
//! that the typing core consumes: identifiers, literals, type declarations
//! and the diagnostics produced while checking them.

pub mod common;
pub mod core;
pub mod diagnostic;
pub mod time;
