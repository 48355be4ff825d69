//! Core library for the materials-tools command line application.
//!
//! The library turns loosely-typed material documents returned by the
//! Materials Project service into fixed-schema records and lays them out for
//! the console or a spreadsheet. Raw document shapes live under
//! [`materials::tools::model`], the JSON-safe conversion in
//! [`materials::tools::normalize`], record extraction in
//! [`materials::tools::record`], the shared grid in
//! [`materials::tools::matrix`], sinks and the HTTP client under
//! [`materials::tools::io`], and the three use cases in
//! [`materials::tools::usecase`].

pub mod materials;

pub use materials::tools::{
    Result, ToolError, catalogue, config, error, io, matrix, model, normalize, outcome, record,
    usecase,
};
