//! Hocell
//!
//! Higher-order finite element cells: flat point ordering bijections,
//! collocation point generation, Lagrange interpolation, linear sub-cell
//! decomposition and the geometric queries built on top of them.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod cells;
pub mod collocation;
pub mod indexing;
pub mod interpolation;
pub mod linear;
pub mod reference_cell;
pub mod subdivision;
pub mod types;
