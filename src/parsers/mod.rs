//! Parsers for the text reports of the on-device benchmark engines
//!
//! - [`TableOutputParser`] reads the per-operator profiling table printed by
//!   the generic tensor-graph runner
//! - [`EmbeddedJsonParser`] reads the JSON performance report embedded in the
//!   vendor executor's mixed output

pub mod embedded_json;
pub mod table;

pub use self::embedded_json::EmbeddedJsonParser;
pub use self::table::{ParsedTable, TableOutputParser};
