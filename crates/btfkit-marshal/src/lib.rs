#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Encoding of BTF type graphs.
//!
//! A [`Builder`] collects root nodes of a [`TypeGraph`](btfkit_core::TypeGraph)
//! and [`marshal`](Builder::marshal)s them into a blob the kernel can load:
//! - [`Registry`] hands out dense type IDs by node identity
//! - the encoder walks the graph, applies the [`rewrite`] downgrades selected
//!   by [`MarshalOptions`] and writes records in ID order
//! - [`StringTable`] deduplicates every name into the string section

mod builder;
mod encoder;
mod error;
mod options;
mod registry;
pub mod rewrite;
mod string_table;

#[cfg(test)]
mod string_table_tests;

pub use builder::Builder;
pub use error::MarshalError;
pub use options::MarshalOptions;
pub use registry::Registry;
pub use string_table::StringTable;
