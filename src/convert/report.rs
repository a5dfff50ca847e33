// src/convert/report.rs

//! Conversion reporting
//!
//! Summarizes one event's conversion: how many records of each kind were
//! created, how much relation wiring had to wait for the deferred pass, and
//! what was degraded along the way. Advisory only; nothing here feeds back
//! into conversion behavior.

use serde::{Deserialize, Serialize};

/// Destination records created, per kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecordCounts {
    pub mc_particles: usize,
    pub tracker_hits: usize,
    pub sim_tracker_hits: usize,
    pub calo_hits: usize,
    pub raw_calo_hits: usize,
    pub sim_calo_hits: usize,
    pub tpc_hits: usize,
    pub tracks: usize,
    pub vertices: usize,
    pub clusters: usize,
    pub reco_particles: usize,
}

impl RecordCounts {
    /// Total destination records across all kinds.
    pub fn total(&self) -> usize {
        self.mc_particles
            + self.tracker_hits
            + self.sim_tracker_hits
            + self.calo_hits
            + self.raw_calo_hits
            + self.sim_calo_hits
            + self.tpc_hits
            + self.tracks
            + self.vertices
            + self.clusters
            + self.reco_particles
    }
}

/// Report of one event's conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Destination records created per kind.
    pub records: RecordCounts,

    /// Relation edges the first pass could not resolve and handed to the
    /// deferred fill pass.
    pub relations_deferred: usize,

    /// Relation edges still unresolved after the deferred pass; these stay
    /// null/absent permanently.
    pub relations_unresolved: usize,

    /// Warnings about degraded data (skipped contributions and the like).
    pub warnings: Vec<String>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Whether anything was degraded or left unresolved.
    pub fn is_clean(&self) -> bool {
        self.relations_unresolved == 0 && self.warnings.is_empty()
    }

    /// Serialize the report to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
