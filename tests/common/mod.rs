// tests/common/mod.rs

//! Shared test-data generators for integration tests.
//!
//! Every generator is deterministic: field values follow fixed formulas of
//! the row index, so tests can predict each converted value. Relation
//! topology is driven by index tables passed in by the caller; the
//! `config` module holds the default tables used by [`create_example_event`].

use hepconv::columnar::{
    CaloContribution, CalorimeterHit, Cluster, Collection, Event, EventHeader, McParticle,
    ParticleId, RawCalorimeterHit, RecoParticle, Ref, SimCalorimeterHit, SimTrackerHit,
    TimeSeriesHit, Track, TrackState, TrackerHit, Vertex,
};

/// Default shapes and relation tables for the example event.
pub mod config {
    /// Number of MC particles to generate.
    pub const N_MC_PARTICLES: usize = 5;
    /// Parent hierarchy: (child, parent) pairs, e.g. (4, 0) gives mc[4] the
    /// parent mc[0].
    pub const MCP_PARENT_IDCS: &[(usize, usize)] =
        &[(4, 0), (4, 1), (3, 2), (3, 0), (3, 1), (2, 1)];

    pub const N_CALO_HITS: usize = 2;
    pub const N_RAW_CALO_HITS: usize = 2;

    pub const N_TPC_HITS: usize = 4;
    /// Number of ADC words in each time-series hit.
    pub const N_TPC_RAW_WORDS: usize = 6;

    pub const N_TRACKER_HITS: usize = 5;

    pub const N_SIM_TRACKER_HITS: usize = 3;
    /// (hit, particle) pairs wiring sim tracker hits to MC particles.
    pub const SIM_TRACKER_MC_IDCS: &[(usize, usize)] = &[(0, 0), (1, 2), (2, 4)];

    pub const N_TRACKS: usize = 4;
    /// Per-subdetector hit-count entries on each track.
    pub const N_SUBDETECTOR_HIT_NUMBERS: usize = 4;
    /// Tracker hits added to every track, in this order.
    pub const TRACK_TRACKER_HIT_IDCS: &[usize] = &[0, 2, 4];
    pub const N_TRACK_STATES: usize = 5;
    /// Track links: (track, linked track) pairs; includes the 2<->3 cycle.
    pub const TRACK_LINK_IDCS: &[(usize, usize)] =
        &[(0, 2), (1, 3), (2, 3), (3, 2), (3, 0)];

    pub const N_SIM_CALO_HITS: usize = 3;
    pub const N_CALO_HIT_CONTRIBUTIONS: usize = 4;
    /// (hit, contribution, particle) triples wiring contributions to MC
    /// particles.
    pub const SIM_CALO_HIT_MC_IDCS: &[(usize, usize, usize)] = &[
        (0, 0, 0),
        (0, 1, 2),
        (0, 2, 1),
        (0, 3, 4),
        (1, 0, 1),
        (1, 1, 3),
        (1, 2, 4),
        (1, 3, 4),
        (2, 0, 0),
        (2, 1, 3),
        (2, 2, 2),
        (2, 3, 0),
    ];

    pub const N_CLUSTERS: usize = 3;
    /// Sub-cluster links: (cluster, sub-cluster) pairs forming a cycle.
    pub const CLUSTER_SUB_IDCS: &[(usize, usize)] = &[(0, 1), (1, 2), (2, 0)];

    pub const N_VERTICES: usize = 2;
    /// (vertex, particle) pairs; forward references resolved by the deferred
    /// fill pass.
    pub const VERTEX_RECO_IDCS: &[(usize, usize)] = &[(0, 1), (1, 0)];

    pub const N_RECO_PARTICLES: usize = 3;
    /// Tracks added to every reconstructed particle, in this order.
    pub const RECO_TRACK_IDCS: &[usize] = &[2, 0];
    /// Clusters added to every reconstructed particle, in this order.
    pub const RECO_CLUSTER_IDCS: &[usize] = &[1, 0];
    /// (particle, vertex) start-vertex pairs.
    pub const RECO_START_VERTEX_IDCS: &[(usize, usize)] = &[(0, 0), (2, 1)];
    /// Constituent links: (particle, constituent) pairs with a 0<->2 cycle.
    pub const RECO_SUB_IDCS: &[(usize, usize)] = &[(0, 2), (2, 0), (2, 1)];
}

/// Predefined 64-bit cell identifiers, cycled by row index.
const CELL_IDS: [u64; 6] = [0xcaffee, 0xbeef, 0xfe47, 0x1234_5678, 0, u64::MAX];

pub fn cell_id(i: usize) -> u64 {
    CELL_IDS[i % CELL_IDS.len()]
}

/// Fill a lower-triangular covariance block for an `n`-dimensional matrix:
/// the strictly-lower entry (i, j) gets `i + 10*j`, the diagonal stays zero.
fn cov<const LEN: usize>(n: usize) -> [f32; LEN] {
    let mut result = [0.0; LEN];
    for i in 0..n {
        for j in 0..i {
            let index = j * (2 * n - j - 1) / 2 + i;
            result[index] = (i + 10 * j) as f32;
        }
    }
    result
}

pub fn create_mc_particles(
    num_elements: usize,
    parent_idcs: &[(usize, usize)],
) -> Collection<McParticle> {
    let mut rows = Vec::with_capacity(num_elements);
    for i in 0..num_elements {
        let fi = i as f32;
        let di = i as f64;
        let mut particle = McParticle {
            pdg: i as i32,
            generator_status: i as i32 + 42,
            vertex: [di * 10.0, di * 20.0, di * 30.0],
            time: fi * 100.0,
            endpoint: [di * 30.0, di * 20.0, di * 30.0],
            momentum: [fi, fi * 2.0, fi * 3.0],
            momentum_at_endpoint: [fi * 3.0, fi * 2.0, fi],
            mass: 125.0 * di,
            spin: [fi * 0.5, fi * 0.25, fi * 0.25],
            color_flow: [i as i32, i as i32 * 2],
            ..Default::default()
        };
        particle.set_created_in_simulation(true);
        particle.set_backscatter(false);
        particle.set_vertex_is_not_endpoint_of_parent(true);
        particle.set_decayed_in_tracker(false);
        particle.set_decayed_in_calorimeter(true);
        particle.set_has_left_detector(false);
        particle.set_stopped(true);
        particle.set_overlay(false);
        rows.push(particle);
    }

    for &(child, parent) in parent_idcs {
        rows[child].parents.push(Ref::To(parent));
    }

    let mut coll = Collection::new();
    for row in rows {
        coll.push(row);
    }
    coll
}

pub fn create_calorimeter_hits(num_elements: usize) -> Collection<CalorimeterHit> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        let fi = i as f32;
        coll.push(CalorimeterHit {
            cell_id: cell_id(i),
            energy: fi,
            energy_error: fi / (fi + 1.0).sqrt(),
            time: fi * 10.0,
            position: [fi * 20.0, fi * 30.0, fi * 40.0],
            type_code: i as i32 * 123,
        });
    }
    coll
}

pub fn create_raw_calorimeter_hits(num_elements: usize) -> Collection<RawCalorimeterHit> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        coll.push(RawCalorimeterHit {
            cell_id: cell_id(i),
            amplitude: i as i32 * 1000,
            time_stamp: i as i32 * 100,
        });
    }
    coll
}

pub fn create_tpc_hits(num_elements: usize, num_rawwords: usize) -> Collection<TimeSeriesHit> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        let fi = i as f32;
        coll.push(TimeSeriesHit {
            cell_id: cell_id(i),
            quality: i as i32,
            time: fi * 10.0,
            charge: fi * 0.1,
            adc_counts: (0..num_rawwords).map(|j| ((i + 10) * j) as i32).collect(),
        });
    }
    coll
}

pub fn create_tracker_hits(num_elements: usize) -> Collection<TrackerHit> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        let fi = i as f32;
        let di = i as f64;
        coll.push(TrackerHit {
            cell_id: cell_id(i),
            type_code: i as i32 * 1234,
            quality: i as i32 * 321,
            time: fi * 100.0,
            edep: fi * 1111.0,
            edep_error: fi * 10.0_f32.sqrt(),
            position: [di * 10.0, di * 20.0, di * 30.0],
            cov_matrix: cov::<6>(3),
        });
    }
    coll
}

pub fn create_sim_tracker_hits(
    num_elements: usize,
    particle_idcs: &[(usize, usize)],
) -> Collection<SimTrackerHit> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        let fi = i as f32;
        let di = i as f64;
        let particle = particle_idcs
            .iter()
            .find(|&&(hit, _)| hit == i)
            .map(|&(_, mcp)| Ref::To(mcp))
            .unwrap_or(Ref::Null);
        coll.push(SimTrackerHit {
            cell_id: cell_id(i),
            edep: fi * 0.5,
            time: fi * 2.0,
            path_length: fi * 0.1,
            quality: i as i32,
            position: [di * 5.0, di * 15.0, di * 25.0],
            momentum: [fi * 0.1, fi * 0.2, fi * 0.3],
            particle,
        });
    }
    coll
}

pub fn create_tracks(
    num_elements: usize,
    subdetectorhitnumbers: usize,
    num_track_states: usize,
    link_trackerhit_idcs: &[usize],
    track_link_tracks_idcs: &[(usize, usize)],
) -> Collection<Track> {
    let mut rows = Vec::with_capacity(num_elements);
    for i in 0..num_elements {
        let fi = i as f32;
        let mut track_states = Vec::with_capacity(num_track_states);
        for j in 0..num_track_states {
            let fj = j as f32;
            track_states.push(TrackState {
                location: j as i32,
                d0: (fi + fj) * 2.0,
                phi: (fi - fj) * 2.0,
                omega: (fi * fj) * 2.0,
                z0: (fi + fj) * 0.5,
                tan_lambda: fj * 2.0,
                reference_point: [fj, fi, fj + fi],
                cov_matrix: cov::<15>(5),
            });
        }
        rows.push(Track {
            type_code: 2,
            chi2: fi * 10.0,
            ndf: i as i32 * 12,
            dedx: fi,
            dedx_error: fi / (fi + 1.0).sqrt(),
            radius_of_innermost_hit: fi * 5.0,
            subdetector_hit_numbers: (0..subdetectorhitnumbers)
                .map(|j| (i + 10 * j) as i32)
                .collect(),
            track_states,
            tracker_hits: link_trackerhit_idcs.iter().map(|&h| Ref::To(h)).collect(),
            ..Default::default()
        });
    }

    for &(track, linked) in track_link_tracks_idcs {
        rows[track].tracks.push(Ref::To(linked));
    }

    let mut coll = Collection::new();
    for row in rows {
        coll.push(row);
    }
    coll
}

/// Create sim calorimeter hits plus the accompanying contribution
/// collection. `link_mcparticles_idcs` holds (hit, contribution, particle)
/// triples; contributions without a triple stay unlinked.
pub fn create_sim_calorimeter_hits(
    num_elements: usize,
    num_contributions: usize,
    link_mcparticles_idcs: &[(usize, usize, usize)],
) -> (Collection<SimCalorimeterHit>, Collection<CaloContribution>) {
    let mut hits = Collection::new();
    let mut contributions = Collection::new();

    for i in 0..num_elements {
        let fi = i as f32;
        let mut hit = SimCalorimeterHit {
            cell_id: cell_id(i),
            energy: fi * 1000.0,
            position: [fi * 10.0, fi * 20.0, fi * 30.0],
            ..Default::default()
        };
        for j in 0..num_contributions {
            let fj = j as f32;
            let particle = link_mcparticles_idcs
                .iter()
                .find(|&&(hit_idx, contrib_idx, _)| hit_idx == i && contrib_idx == j)
                .map(|&(_, _, mcp)| Ref::To(mcp))
                .unwrap_or(Ref::Null);
            let contrib_idx = contributions.push(CaloContribution {
                pdg: j as i32 * 42,
                energy: fj + fi * 1000.0,
                time: fj * 1000.0 - fi,
                step_position: [fj, fj * 2.0, fj * 3.0],
                particle,
            });
            hit.contributions.push(Ref::To(contrib_idx));
        }
        hits.push(hit);
    }

    (hits, contributions)
}

pub fn create_clusters(
    num_elements: usize,
    sub_cluster_idcs: &[(usize, usize)],
) -> Collection<Cluster> {
    let mut rows = Vec::with_capacity(num_elements);
    for i in 0..num_elements {
        let fi = i as f32;
        rows.push(Cluster {
            type_code: i as i32 * 5 + 1,
            energy: fi * 250.0,
            energy_error: fi * 2.5,
            position: [fi * 4.0, fi * 8.0, fi * 12.0],
            position_error: [fi, fi * 2.0, fi * 3.0, fi * 4.0, fi * 5.0, fi * 6.0],
            i_theta: fi * 0.1,
            phi: fi * 0.2,
            shape_parameters: vec![fi, fi + 1.0],
            subdetector_energies: vec![fi * 100.0, fi * 50.0],
            particle_ids: create_particle_ids(i),
            ..Default::default()
        });
    }

    for &(cluster, sub) in sub_cluster_idcs {
        rows[cluster].clusters.push(Ref::To(sub));
    }

    let mut coll = Collection::new();
    for row in rows {
        coll.push(row);
    }
    coll
}

pub fn create_vertices(
    num_elements: usize,
    particle_idcs: &[(usize, usize)],
) -> Collection<Vertex> {
    let mut coll = Collection::new();
    for i in 0..num_elements {
        let fi = i as f32;
        let associated_particle = particle_idcs
            .iter()
            .find(|&&(vtx, _)| vtx == i)
            .map(|&(_, particle)| Ref::To(particle))
            .unwrap_or(Ref::Null);
        coll.push(Vertex {
            primary: i % 2 == 0,
            chi2: fi * 1.5,
            probability: 1.0 / (fi + 1.0),
            position: [fi * 0.1, fi * 0.2, fi * 0.3],
            covariance: [fi, fi + 1.0, fi + 2.0, fi + 3.0, fi + 4.0, fi + 5.0],
            algorithm_type: i as i32 * 7,
            parameters: vec![fi * 0.5],
            associated_particle,
        });
    }
    coll
}

pub fn create_reco_particles(
    num_elements: usize,
    link_track_idcs: &[usize],
    link_cluster_idcs: &[usize],
    start_vertex_idcs: &[(usize, usize)],
    sub_particle_idcs: &[(usize, usize)],
) -> Collection<RecoParticle> {
    let mut rows = Vec::with_capacity(num_elements);
    for i in 0..num_elements {
        let fi = i as f32;
        let particle_ids = create_particle_ids(i);
        // Every odd particle prefers its second hypothesis.
        let particle_id_used = (i % 2 == 1).then(|| particle_ids[1].clone());
        let start_vertex = start_vertex_idcs
            .iter()
            .find(|&&(particle, _)| particle == i)
            .map(|&(_, vtx)| Ref::To(vtx))
            .unwrap_or(Ref::Null);
        let mut covariance = [0.0_f32; 10];
        for (k, entry) in covariance.iter_mut().enumerate() {
            *entry = fi * 10.0 + k as f32;
        }
        rows.push(RecoParticle {
            type_code: i as i32 * 11,
            energy: fi * 101.0,
            momentum: [fi, fi * 2.0, fi * 3.0],
            reference_point: [fi * 0.5, fi * 0.6, fi * 0.7],
            charge: (i % 3) as f32 - 1.0,
            mass: fi * 0.139,
            goodness_of_pid: fi * 0.25,
            covariance,
            particle_ids,
            particle_id_used,
            start_vertex,
            tracks: link_track_idcs.iter().map(|&t| Ref::To(t)).collect(),
            clusters: link_cluster_idcs.iter().map(|&c| Ref::To(c)).collect(),
            ..Default::default()
        });
    }

    for &(particle, sub) in sub_particle_idcs {
        rows[particle].particles.push(Ref::To(sub));
    }

    let mut coll = Collection::new();
    for row in rows {
        coll.push(row);
    }
    coll
}

fn create_particle_ids(i: usize) -> Vec<ParticleId> {
    let fi = i as f32;
    vec![
        ParticleId {
            type_code: i as i32,
            pdg: 11 + i as i32,
            likelihood: fi * 0.5,
            algorithm_type: 42,
            parameters: vec![fi, fi * 2.0],
        },
        ParticleId {
            type_code: i as i32 + 1,
            pdg: 13 + i as i32,
            likelihood: fi * 0.25,
            algorithm_type: 43,
            parameters: vec![fi * 3.0],
        },
    ]
}

pub fn create_event_header() -> EventHeader {
    EventHeader {
        event_number: 123_456_789,
        run_number: 42,
        time_stamp: 0x71AAE,
        weight: 3.14,
    }
}

/// Assemble the full example event from the `config` tables.
pub fn create_example_event() -> Event {
    let mut event = Event::new();
    event.header = Some(create_event_header());
    event.mc_particles = create_mc_particles(config::N_MC_PARTICLES, config::MCP_PARENT_IDCS);
    event.calo_hits = create_calorimeter_hits(config::N_CALO_HITS);
    event.raw_calo_hits = create_raw_calorimeter_hits(config::N_RAW_CALO_HITS);
    event.tpc_hits = create_tpc_hits(config::N_TPC_HITS, config::N_TPC_RAW_WORDS);
    event.tracker_hits = create_tracker_hits(config::N_TRACKER_HITS);
    event.tracker_hits.cell_id_encoding = "system:5,side:2,layer:9,module:8,sensor:8".to_string();
    event.sim_tracker_hits =
        create_sim_tracker_hits(config::N_SIM_TRACKER_HITS, config::SIM_TRACKER_MC_IDCS);
    event.tracks = create_tracks(
        config::N_TRACKS,
        config::N_SUBDETECTOR_HIT_NUMBERS,
        config::N_TRACK_STATES,
        config::TRACK_TRACKER_HIT_IDCS,
        config::TRACK_LINK_IDCS,
    );
    let (sim_calo_hits, calo_contributions) = create_sim_calorimeter_hits(
        config::N_SIM_CALO_HITS,
        config::N_CALO_HIT_CONTRIBUTIONS,
        config::SIM_CALO_HIT_MC_IDCS,
    );
    event.sim_calo_hits = sim_calo_hits;
    event.calo_contributions = calo_contributions;
    event.clusters = create_clusters(config::N_CLUSTERS, config::CLUSTER_SUB_IDCS);
    event.vertices = create_vertices(config::N_VERTICES, config::VERTEX_RECO_IDCS);
    event.reco_particles = create_reco_particles(
        config::N_RECO_PARTICLES,
        config::RECO_TRACK_IDCS,
        config::RECO_CLUSTER_IDCS,
        config::RECO_START_VERTEX_IDCS,
        config::RECO_SUB_IDCS,
    );
    event
}
