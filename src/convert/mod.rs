// src/convert/mod.rs

//! Event-Graph Conversion Engine
//!
//! Converts one columnar source event into an object-based destination event
//! in two passes:
//!
//! 1. Kind converters run in a fixed order, copying fields, registering each
//!    (source row, destination record) pair in the kind's identity map, and
//!    wiring whatever relations already resolve.
//! 2. The deferred fill pass revisits every converted record with the
//!    complete map set and repairs relations the first pass had to leave
//!    unresolved (forward references and cross-kind cycles).
//!
//! Relation misses are never errors: a reference whose target does not exist
//! stays an explicit null. The only fatal condition is a broken identity
//! invariant (the same source row converted twice).

mod bits;
mod converter;
mod maps;
mod report;
mod resolve;

pub use bits::{set_bits, split_cell_id};
pub use converter::{convert_event, ConvertedEvent, EventConverter};
pub use maps::{ConversionMaps, IdentityMap};
pub use report::{ConversionReport, RecordCounts};
pub use resolve::{fill_deferred, fill_deferred_between};

use std::fmt;

use thiserror::Error;

/// The fixed record kinds both event models share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    McParticle,
    TrackerHit,
    SimTrackerHit,
    CalorimeterHit,
    RawCalorimeterHit,
    SimCalorimeterHit,
    TimeSeriesHit,
    Track,
    Vertex,
    Cluster,
    RecoParticle,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::McParticle => "MC particle",
            Self::TrackerHit => "tracker hit",
            Self::SimTrackerHit => "sim tracker hit",
            Self::CalorimeterHit => "calorimeter hit",
            Self::RawCalorimeterHit => "raw calorimeter hit",
            Self::SimCalorimeterHit => "sim calorimeter hit",
            Self::TimeSeriesHit => "time-series hit",
            Self::Track => "track",
            Self::Vertex => "vertex",
            Self::Cluster => "cluster",
            Self::RecoParticle => "reconstructed particle",
        };
        write!(f, "{}", name)
    }
}

/// Errors that can occur during event conversion.
///
/// Missing or unavailable data is not an error; only invariant violations
/// abort a conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("duplicate identity: {kind} row {index} was already converted")]
    DuplicateIdentity { kind: RecordKind, index: usize },
}

/// Result type for conversion operations
pub type ConvResult<T> = Result<T, ConversionError>;

/// Options for event conversion
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Minimum width of the per-subdetector hit-count array on destination
    /// tracks; shorter source arrays are zero-padded up to this many slots.
    pub min_subdetector_slots: usize,
    /// Copy non-empty cell-encoding descriptors onto destination hit arenas.
    pub propagate_cell_encoding: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            min_subdetector_slots: 50,
            propagate_cell_encoding: true,
        }
    }
}
