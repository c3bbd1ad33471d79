//! Domain core for the annotation review overlay service.
//!
//! Decrypts the polygon dataset, answers point-in-region queries against the
//! mutable disabled-region state, and composites the SVG overlay that the
//! browser shows on top of the sample image. Nothing here knows about HTTP.

pub mod crypto;
pub mod dataset;
pub mod disabled;
pub mod error;
pub mod geometry;
pub mod hashing;
pub mod overlay;
pub mod region;
