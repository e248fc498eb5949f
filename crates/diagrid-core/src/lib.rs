//! Diagrid Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Diagrid layout
//! engine and its collaborators:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Model**: Inbound graph description and outbound positioned layout ([`model`] module)

pub mod geometry;
pub mod model;
