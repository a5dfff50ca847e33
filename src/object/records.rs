// src/object/records.rs

//! Record types of the object-based destination model.
//!
//! Relation fields hold arena indices into the owning [`Event`]'s arenas;
//! `None` is an explicit null. Where the destination toolkit narrows or
//! reshapes a field (split cell identifiers, string algorithm types, int
//! cell ids on TPC hits), the types here do the same.
//!
//! [`Event`]: super::Event

/// Monte-Carlo truth particle.
///
/// The simulator-status word packs the per-flag booleans into its high bits;
/// `set_simulator_status` writes the whole word, the individual setters flip
/// single bits. Bit positions match the columnar model's
/// [`sim_status`](crate::columnar::sim_status) layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct McParticle {
    pub pdg: i32,
    pub generator_status: i32,
    simulator_status: i32,
    pub charge: f32,
    pub time: f32,
    pub mass: f64,
    pub vertex: [f64; 3],
    pub endpoint: [f64; 3],
    pub momentum: [f64; 3],
    pub momentum_at_endpoint: [f64; 3],
    pub spin: [f32; 3],
    pub color_flow: [i32; 2],
    /// Parent particles, as arena indices.
    pub parents: Vec<usize>,
    /// Daughter particles, as arena indices. Derived from parent links.
    pub daughters: Vec<usize>,
}

// Simulator-status bit positions.
const BIT_CREATED_IN_SIMULATION: u32 = 30;
const BIT_BACKSCATTER: u32 = 29;
const BIT_VERTEX_IS_NOT_ENDPOINT_OF_PARENT: u32 = 28;
const BIT_DECAYED_IN_TRACKER: u32 = 27;
const BIT_DECAYED_IN_CALORIMETER: u32 = 26;
const BIT_HAS_LEFT_DETECTOR: u32 = 25;
const BIT_STOPPED: u32 = 24;
const BIT_OVERLAY: u32 = 23;

impl McParticle {
    pub fn simulator_status(&self) -> i32 {
        self.simulator_status
    }

    /// Overwrite the whole status word.
    pub fn set_simulator_status(&mut self, status: i32) {
        self.simulator_status = status;
    }

    fn set_status_bit(&mut self, bit: u32, value: bool) {
        if value {
            self.simulator_status |= 1 << bit;
        } else {
            self.simulator_status &= !(1 << bit);
        }
    }

    fn status_bit(&self, bit: u32) -> bool {
        (self.simulator_status >> bit) & 1 == 1
    }

    pub fn set_created_in_simulation(&mut self, value: bool) {
        self.set_status_bit(BIT_CREATED_IN_SIMULATION, value);
    }

    pub fn set_backscatter(&mut self, value: bool) {
        self.set_status_bit(BIT_BACKSCATTER, value);
    }

    pub fn set_vertex_is_not_endpoint_of_parent(&mut self, value: bool) {
        self.set_status_bit(BIT_VERTEX_IS_NOT_ENDPOINT_OF_PARENT, value);
    }

    pub fn set_decayed_in_tracker(&mut self, value: bool) {
        self.set_status_bit(BIT_DECAYED_IN_TRACKER, value);
    }

    pub fn set_decayed_in_calorimeter(&mut self, value: bool) {
        self.set_status_bit(BIT_DECAYED_IN_CALORIMETER, value);
    }

    pub fn set_has_left_detector(&mut self, value: bool) {
        self.set_status_bit(BIT_HAS_LEFT_DETECTOR, value);
    }

    pub fn set_stopped(&mut self, value: bool) {
        self.set_status_bit(BIT_STOPPED, value);
    }

    pub fn set_overlay(&mut self, value: bool) {
        self.set_status_bit(BIT_OVERLAY, value);
    }

    pub fn created_in_simulation(&self) -> bool {
        self.status_bit(BIT_CREATED_IN_SIMULATION)
    }

    pub fn backscatter(&self) -> bool {
        self.status_bit(BIT_BACKSCATTER)
    }

    pub fn vertex_is_not_endpoint_of_parent(&self) -> bool {
        self.status_bit(BIT_VERTEX_IS_NOT_ENDPOINT_OF_PARENT)
    }

    pub fn decayed_in_tracker(&self) -> bool {
        self.status_bit(BIT_DECAYED_IN_TRACKER)
    }

    pub fn decayed_in_calorimeter(&self) -> bool {
        self.status_bit(BIT_DECAYED_IN_CALORIMETER)
    }

    pub fn has_left_detector(&self) -> bool {
        self.status_bit(BIT_HAS_LEFT_DETECTOR)
    }

    pub fn stopped(&self) -> bool {
        self.status_bit(BIT_STOPPED)
    }

    pub fn overlay(&self) -> bool {
        self.status_bit(BIT_OVERLAY)
    }
}

/// One track-state snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackState {
    pub location: i32,
    pub d0: f32,
    pub phi: f32,
    pub omega: f32,
    pub z0: f32,
    pub tan_lambda: f32,
    pub reference_point: [f32; 3],
    pub cov_matrix: [f32; 15],
}

/// Reconstructed track. The type word has no direct integer setter; callers
/// flip individual bits through [`Track::set_type_bit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    type_word: i32,
    pub chi2: f32,
    pub ndf: i32,
    pub dedx: f32,
    pub dedx_error: f32,
    pub radius_of_innermost_hit: f32,
    pub subdetector_hit_numbers: Vec<i32>,
    pub track_states: Vec<TrackState>,
    pub tracker_hits: Vec<usize>,
    pub tracks: Vec<usize>,
}

impl Track {
    pub fn type_word(&self) -> i32 {
        self.type_word
    }

    /// Set or clear a single bit of the type word.
    pub fn set_type_bit(&mut self, bit: u32, value: bool) {
        if value {
            self.type_word |= 1 << bit;
        } else {
            self.type_word &= !(1 << bit);
        }
    }
}

/// Reconstructed tracker hit with a split cell identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerHit {
    pub cell_id0: i32,
    pub cell_id1: i32,
    pub type_code: i32,
    pub quality: i32,
    pub time: f32,
    pub edep: f32,
    pub edep_error: f32,
    pub position: [f64; 3],
    pub cov_matrix: [f32; 6],
}

/// Simulated tracker hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimTrackerHit {
    pub cell_id0: i32,
    pub cell_id1: i32,
    pub edep: f32,
    pub time: f32,
    pub path_length: f32,
    pub quality: i32,
    pub position: [f64; 3],
    pub momentum: [f32; 3],
    /// Causing particle; explicit null when the source reference was
    /// unavailable or could not be resolved.
    pub particle: Option<usize>,
}

/// Reconstructed calorimeter hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalorimeterHit {
    pub cell_id0: i32,
    pub cell_id1: i32,
    pub energy: f32,
    pub energy_error: f32,
    pub time: f32,
    pub position: [f32; 3],
    pub type_code: i32,
}

/// Raw calorimeter hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCalorimeterHit {
    pub cell_id0: i32,
    pub cell_id1: i32,
    pub amplitude: i32,
    pub time_stamp: i32,
}

/// One attached contribution of a simulated calorimeter hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contribution {
    /// Contributing particle; null when the reference could not be resolved.
    pub particle: Option<usize>,
    pub energy: f32,
    pub time: f32,
    pub pdg: i32,
    pub step_position: [f32; 3],
}

/// Simulated calorimeter hit.
///
/// Attaching a contribution accumulates the hit energy, mirroring the
/// destination toolkit. Callers that want to preserve a previously assigned
/// aggregate energy must restore it after attaching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimCalorimeterHit {
    pub cell_id0: i32,
    pub cell_id1: i32,
    pub energy: f32,
    pub position: [f32; 3],
    contributions: Vec<Contribution>,
}

impl SimCalorimeterHit {
    /// Attach a contribution, accumulating its energy onto the hit.
    pub fn add_contribution(&mut self, contribution: Contribution) {
        self.energy += contribution.energy;
        self.contributions.push(contribution);
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }
}

/// Time-series (TPC-style) hit. The destination kind keeps a single 32-bit
/// cell identifier, so the source's 64-bit id arrives truncated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TpcHit {
    pub cell_id: i32,
    pub time: f32,
    pub charge: f32,
    pub quality: i32,
    pub raw_data: Vec<i32>,
}

/// Particle-identification record, owned by a cluster or particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleId {
    pub type_code: i32,
    pub pdg: i32,
    pub likelihood: f32,
    pub algorithm_type: i32,
    pub parameters: Vec<f32>,
}

/// Calorimeter cluster. Type word is bit-level only, like [`Track`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    type_word: i32,
    pub energy: f32,
    pub energy_error: f32,
    pub position: [f32; 3],
    pub position_error: [f32; 6],
    pub i_theta: f32,
    pub phi: f32,
    pub shape_parameters: Vec<f32>,
    pub subdetector_energies: Vec<f32>,
    pub particle_ids: Vec<ParticleId>,
    pub clusters: Vec<usize>,
}

impl Cluster {
    pub fn type_word(&self) -> i32 {
        self.type_word
    }

    pub fn set_type_bit(&mut self, bit: u32, value: bool) {
        if value {
            self.type_word |= 1 << bit;
        } else {
            self.type_word &= !(1 << bit);
        }
    }
}

/// Interaction vertex. The algorithm type is a string in this model; the
/// converter formats the source integer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    pub primary: bool,
    pub chi2: f32,
    pub probability: f32,
    pub position: [f32; 3],
    pub covariance: [f32; 6],
    pub algorithm_type: String,
    pub parameters: Vec<f32>,
    pub associated_particle: Option<usize>,
}

/// Reconstructed particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoParticle {
    pub type_code: i32,
    pub energy: f64,
    pub momentum: [f64; 3],
    pub reference_point: [f32; 3],
    pub charge: f32,
    pub mass: f64,
    pub goodness_of_pid: f32,
    pub covariance: [f32; 10],
    pub particle_ids: Vec<ParticleId>,
    /// Index into `particle_ids` of the preferred hypothesis.
    pub particle_id_used: Option<usize>,
    pub start_vertex: Option<usize>,
    pub tracks: Vec<usize>,
    pub clusters: Vec<usize>,
    pub particles: Vec<usize>,
}

/// Event header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventHeader {
    pub event_number: i32,
    pub run_number: i32,
    pub time_stamp: i64,
    pub weight: f64,
}
