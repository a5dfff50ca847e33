// src/convert/maps.rs

//! Identity maps: per-kind associations between source rows and destination
//! records.
//!
//! One map exists per record kind per event. A map is built monotonically
//! (insert-once) while its kind is converted and is read-only afterwards.
//! Lookups for rows that were never converted return `None`; that is the
//! normal outcome for forward references and is never an error.

use std::collections::HashMap;

use crate::columnar::Ref;
use crate::convert::{ConvResult, ConversionError, RecordKind};

/// Insert-once association from source row index to destination arena index.
///
/// The map also keeps the (source, destination) pairs in insertion order so
/// that passes iterating over converted records are deterministic, and a
/// reverse index so callers can recover the source row of a destination
/// record.
#[derive(Debug, Clone)]
pub struct IdentityMap {
    kind: RecordKind,
    forward: HashMap<usize, usize>,
    reverse: HashMap<usize, usize>,
    pairs: Vec<(usize, usize)>,
}

impl IdentityMap {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            forward: HashMap::new(),
            reverse: HashMap::new(),
            pairs: Vec::new(),
        }
    }

    /// The record kind this map belongs to.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Register a (source row, destination record) pair.
    ///
    /// Fails with [`ConversionError::DuplicateIdentity`] if the source row is
    /// already present; converting the same row twice is a broken invariant,
    /// not a recoverable state.
    pub fn insert(&mut self, src: usize, dst: usize) -> ConvResult<()> {
        if self.forward.contains_key(&src) {
            return Err(ConversionError::DuplicateIdentity {
                kind: self.kind,
                index: src,
            });
        }
        self.forward.insert(src, dst);
        self.reverse.insert(dst, src);
        self.pairs.push((src, dst));
        Ok(())
    }

    /// The destination record for a source row, if that row was converted.
    pub fn lookup(&self, src: usize) -> Option<usize> {
        self.forward.get(&src).copied()
    }

    /// Resolve a source reference through this map.
    ///
    /// This is the shared relation-resolution primitive: a null reference and
    /// a not-yet-converted target both come back as `None`. Pure lookup, no
    /// side effects.
    pub fn resolve(&self, reference: Ref) -> Option<usize> {
        reference.index().and_then(|idx| self.lookup(idx))
    }

    /// The source row a destination record was converted from.
    pub fn source_of(&self, dst: usize) -> Option<usize> {
        self.reverse.get(&dst).copied()
    }

    /// All (source, destination) pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The full set of identity maps for one event, one per record kind.
///
/// Maps for different kinds are independent; within a kind, all inserts
/// happen during that kind's converter and the map is complete before the
/// deferred fill pass reads it.
#[derive(Debug, Clone)]
pub struct ConversionMaps {
    pub mc_particles: IdentityMap,
    pub tracker_hits: IdentityMap,
    pub sim_tracker_hits: IdentityMap,
    pub calo_hits: IdentityMap,
    pub raw_calo_hits: IdentityMap,
    pub sim_calo_hits: IdentityMap,
    pub tpc_hits: IdentityMap,
    pub tracks: IdentityMap,
    pub vertices: IdentityMap,
    pub clusters: IdentityMap,
    pub reco_particles: IdentityMap,
}

impl ConversionMaps {
    pub fn new() -> Self {
        Self {
            mc_particles: IdentityMap::new(RecordKind::McParticle),
            tracker_hits: IdentityMap::new(RecordKind::TrackerHit),
            sim_tracker_hits: IdentityMap::new(RecordKind::SimTrackerHit),
            calo_hits: IdentityMap::new(RecordKind::CalorimeterHit),
            raw_calo_hits: IdentityMap::new(RecordKind::RawCalorimeterHit),
            sim_calo_hits: IdentityMap::new(RecordKind::SimCalorimeterHit),
            tpc_hits: IdentityMap::new(RecordKind::TimeSeriesHit),
            tracks: IdentityMap::new(RecordKind::Track),
            vertices: IdentityMap::new(RecordKind::Vertex),
            clusters: IdentityMap::new(RecordKind::Cluster),
            reco_particles: IdentityMap::new(RecordKind::RecoParticle),
        }
    }
}

impl Default for ConversionMaps {
    fn default() -> Self {
        Self::new()
    }
}
