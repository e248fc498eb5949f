//! The layout pipeline.
//!
//! A layout call flows through these stages, each taking the previous
//! [`Placement`](placement::Placement) and producing a new one:
//!
//! 1. [`validate`] - structural checks, producing an index-based [`graph::LayoutGraph`]
//! 2. [`placer`] (or [`complex`] for large graphs) - layered base placement
//! 3. [`archetypes`] - archetype-specific re-placement
//! 4. [`overlap`] - collision detection and repulsion
//! 5. [`aesthetic`] - bounded local search on the aesthetic score
//!
//! The [`controller`] drives the stages and falls back to [`fallback`] grid
//! packing whenever a stage fails or the zero-overlap postcondition does not hold.

pub mod aesthetic;
pub mod archetypes;
pub mod complex;
pub mod controller;
pub mod deadline;
pub mod fallback;
pub mod graph;
pub mod overlap;
pub mod placement;
pub mod placer;
pub mod routing;
pub mod sizing;
pub mod validate;

/// Per-stage salts mixed into the configured seed, so stages draw independent streams.
pub(crate) mod seeds {
    pub const OVERLAP: u64 = 0x6f76_6572_6c61_7031;
    pub const AESTHETIC: u64 = 0x6165_7374_6865_7431;
}
