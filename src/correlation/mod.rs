//! Feature correlation data
//!
//! This module provides the precomputed tables that guide the
//! correlation-aware operators:
//!
//! - [`table`]: pairwise correlation between feature dimensions
//! - [`target`]: correlation of each feature dimension with the label
//! - [`io`]: CSV loaders for both

pub mod io;
pub mod table;
pub mod target;

pub mod prelude {
    pub use super::io::*;
    pub use super::table::*;
    pub use super::target::*;
}
