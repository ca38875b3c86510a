//! Plan dependency resolution and compilation.
//!
//! Parsed plan files go in, a single validated [`plan::Plan`] with waves and a
//! resolved quality-control policy comes out.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod plan;
pub mod quality;
