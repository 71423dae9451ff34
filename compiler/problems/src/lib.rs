//! Problem codes for the semantic typing core.
//!
//! The enumeration is generated by the build script from
//! `resources/problem-codes.csv` so that codes remain stable between
//! releases and documentation can refer to them.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
