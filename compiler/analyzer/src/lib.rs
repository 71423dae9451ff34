//! Semantic typing core for IEC 61131-3.
//!
//! The registry holds the canonical types of one compilation unit. The
//! inferrer types literals, constants fold within those types and the
//! legacy bridge translates the annotations of the legacy semantic pass
//! into registry types. Problems go to an `ErrorReporter`; violated
//! compiler invariants return an `InternalCompilerError`.

// Allow large errors because this is a compiler - we expect large errors.
#![allow(clippy::result_large_err)]

pub mod annotation_export;
pub mod const_fold;
pub mod const_value;
pub mod legacy;
pub mod legacy_bridge;
pub mod options;
pub mod outcome;
pub mod reporter;
pub mod stages;
pub mod type_inferrer;
pub mod type_model;
pub mod type_registry;
mod widening;

#[cfg(test)]
mod test_helpers;
