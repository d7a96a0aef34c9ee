//! Planograph core domain library.
//!
//! Annotates scanned construction drawings with a typed graph of visual and
//! conceptual entities connected by semantically-restricted relationships.
//! This crate holds the pure domain model (geometry, coordinate transforms,
//! the entity/concept/relationship union), the spatial auto-linking engine,
//! and the mutation workflows that keep the graph consistent. Persistence
//! and HTTP live behind the `repository` traits in sibling crates.

pub mod concept;
pub mod coords;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod link;
pub mod linking;
pub mod mutation;
pub mod patch;
pub mod repository;
pub mod types;
