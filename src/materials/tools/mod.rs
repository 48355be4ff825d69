pub mod catalogue;
pub mod config;
pub mod error;
pub mod io;
pub mod matrix;
pub mod model;
pub mod normalize;
pub mod outcome;
pub mod record;
pub mod usecase;

pub use error::{Result, ToolError};
