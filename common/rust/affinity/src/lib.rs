//! Affinity domain masks.
//!
//! This crate contains [`AffinityMask`], a fixed-width set of hardware
//! affinity domains (CPU sockets, NUMA nodes) with the set algebra that
//! topology-aware placement relies on, plus helpers that operate on several
//! masks at once.

mod error;
mod mask;
mod ops;

pub use crate::{
    error::Error,
    mask::{AffinityMask, DEFAULT_WIDTH},
    ops::{and_all, iterate_masks, or_all},
};
