// src/convert/converter.rs

//! Kind converters and the event assembler.
//!
//! One converter per record kind, each following the same shape: walk the
//! source collection in row order, copy fields into a freshly allocated
//! destination record, wire whatever relations already resolve, and register
//! the pair in the kind's identity map. Self-kind relations (track links,
//! sub-clusters, parent particles, constituent particles) need the kind's own
//! map to be complete, so each of those converters runs a second loop over
//! the same collection after the first.
//!
//! Relations that do not resolve here are left null or unappended and picked
//! up by the deferred fill pass ([`fill_deferred`]).

use crate::columnar::{self, Collection, Ref};
use crate::convert::bits::{set_bits, split_cell_id};
use crate::convert::resolve::fill_deferred;
use crate::convert::{
    ConvResult, ConversionMaps, ConversionOptions, ConversionReport, IdentityMap,
};
use crate::object::{self, Arena};

/// Output of one event conversion: the destination event, the identity maps
/// (callers may need them to convert further collections referencing the same
/// entities), and the advisory report.
#[derive(Debug)]
pub struct ConvertedEvent {
    pub event: object::Event,
    pub maps: ConversionMaps,
    pub report: ConversionReport,
}

/// Converts one columnar event at a time into the object model.
pub struct EventConverter {
    options: ConversionOptions,
}

impl EventConverter {
    /// Create a converter with the given options.
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Create a converter with default options.
    pub fn with_defaults() -> Self {
        Self::new(ConversionOptions::default())
    }

    /// Convert one event.
    ///
    /// Runs every kind converter in a fixed order chosen to minimize
    /// first-pass misses (hits before tracks, MC particles before sim hits,
    /// tracks/vertices/clusters before reconstructed particles), then the
    /// deferred fill pass. Fails only on a broken identity invariant; missing
    /// or unavailable data degrades to null fields.
    pub fn convert(&self, event: &columnar::Event) -> ConvResult<ConvertedEvent> {
        let mut maps = ConversionMaps::new();
        let mut report = ConversionReport::new();
        let mut dst = object::Event::new();

        if let Some(header) = &event.header {
            dst.header = Some(convert_header(header));
        }

        self.convert_mc_particles(
            &event.mc_particles,
            &mut dst.mc_particles,
            &mut maps.mc_particles,
            &mut report,
        )?;
        self.convert_tracker_hits(
            &event.tracker_hits,
            &mut dst.tracker_hits,
            &mut maps.tracker_hits,
            &mut report,
        )?;
        self.convert_sim_tracker_hits(
            &event.sim_tracker_hits,
            &mut dst.sim_tracker_hits,
            &mut maps.sim_tracker_hits,
            &maps.mc_particles,
            &mut report,
        )?;
        self.convert_calo_hits(
            &event.calo_hits,
            &mut dst.calo_hits,
            &mut maps.calo_hits,
            &mut report,
        )?;
        self.convert_raw_calo_hits(
            &event.raw_calo_hits,
            &mut dst.raw_calo_hits,
            &mut maps.raw_calo_hits,
            &mut report,
        )?;
        self.convert_sim_calo_hits(
            &event.sim_calo_hits,
            &mut dst.sim_calo_hits,
            &mut maps.sim_calo_hits,
            &mut report,
        )?;
        self.convert_tpc_hits(
            &event.tpc_hits,
            &mut dst.tpc_hits,
            &mut maps.tpc_hits,
            &mut report,
        )?;
        self.convert_tracks(
            &event.tracks,
            &mut dst.tracks,
            &mut maps.tracks,
            &maps.tracker_hits,
            &mut report,
        )?;
        self.convert_vertices(
            &event.vertices,
            &mut dst.vertices,
            &mut maps.vertices,
            &maps.reco_particles,
            &mut report,
        )?;
        self.convert_clusters(
            &event.clusters,
            &mut dst.clusters,
            &mut maps.clusters,
            &mut report,
        )?;
        self.convert_reco_particles(
            &event.reco_particles,
            &mut dst.reco_particles,
            &mut maps.reco_particles,
            &maps.tracks,
            &maps.clusters,
            &maps.vertices,
            &mut report,
        )?;

        fill_deferred(event, &mut dst, &maps, &mut report);

        tracing::debug!(
            "converted event: {} records, {} warnings",
            report.records.total(),
            report.warnings.len()
        );
        Ok(ConvertedEvent {
            event: dst,
            maps,
            report,
        })
    }

    fn convert_mc_particles(
        &self,
        coll: &Collection<columnar::McParticle>,
        arena: &mut Arena<object::McParticle>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let mut mcp = object::McParticle::default();
            if let Some(row) = row {
                mcp.pdg = row.pdg;
                mcp.generator_status = row.generator_status;
                mcp.charge = row.charge;
                mcp.time = row.time;
                mcp.mass = row.mass;
                mcp.vertex = row.vertex;
                mcp.endpoint = row.endpoint;
                mcp.momentum = widen3(row.momentum);
                mcp.momentum_at_endpoint = widen3(row.momentum_at_endpoint);
                mcp.spin = row.spin;
                mcp.color_flow = row.color_flow;
                // Aggregate word first, then the individual flags the
                // destination model also requires.
                mcp.set_simulator_status(row.simulator_status);
                mcp.set_created_in_simulation(row.created_in_simulation());
                mcp.set_backscatter(row.backscatter());
                mcp.set_vertex_is_not_endpoint_of_parent(row.vertex_is_not_endpoint_of_parent());
                mcp.set_decayed_in_tracker(row.decayed_in_tracker());
                mcp.set_decayed_in_calorimeter(row.decayed_in_calorimeter());
                mcp.set_has_left_detector(row.has_left_detector());
                mcp.set_stopped(row.stopped());
                mcp.set_overlay(row.overlay());
            }
            // Particle kinds allocate even for unavailable rows to keep
            // positional alignment with the source collection.
            let dst = arena.push(mcp);
            map.insert(idx, dst)?;
        }

        // Parent links can only resolve once every particle of the
        // collection exists; daughters are derived as the inverse.
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let Some(dst) = map.lookup(idx) else { continue };
            for parent_ref in &row.parents {
                match map.resolve(*parent_ref) {
                    Some(parent) => {
                        arena[dst].parents.push(parent);
                        arena[parent].daughters.push(dst);
                    }
                    None => report.relations_unresolved += 1,
                }
            }
        }

        report.records.mc_particles = arena.len();
        tracing::debug!("converted {} MC particles", arena.len());
        Ok(())
    }

    fn convert_tracker_hits(
        &self,
        coll: &Collection<columnar::TrackerHit>,
        arena: &mut Arena<object::TrackerHit>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let (cell_id0, cell_id1) = split_cell_id(row.cell_id);
            let dst = arena.push(object::TrackerHit {
                cell_id0,
                cell_id1,
                type_code: row.type_code,
                quality: row.quality,
                time: row.time,
                edep: row.edep,
                edep_error: row.edep_error,
                position: row.position,
                cov_matrix: row.cov_matrix,
            });
            map.insert(idx, dst)?;
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.tracker_hits = arena.len();
        tracing::debug!("converted {} tracker hits", arena.len());
        Ok(())
    }

    fn convert_sim_tracker_hits(
        &self,
        coll: &Collection<columnar::SimTrackerHit>,
        arena: &mut Arena<object::SimTrackerHit>,
        map: &mut IdentityMap,
        mc_map: &IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            // An unavailable particle reference stays null; a reference
            // missing from the map gets an explicit null too, and the
            // deferred pass retries it.
            let particle = match row.particle {
                Ref::Null => None,
                reference => {
                    let resolved = mc_map.resolve(reference);
                    if resolved.is_none() {
                        report.relations_deferred += 1;
                    }
                    resolved
                }
            };
            let (cell_id0, cell_id1) = split_cell_id(row.cell_id);
            let dst = arena.push(object::SimTrackerHit {
                cell_id0,
                cell_id1,
                edep: row.edep,
                time: row.time,
                path_length: row.path_length,
                quality: row.quality,
                position: row.position,
                momentum: row.momentum,
                particle,
            });
            map.insert(idx, dst)?;
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.sim_tracker_hits = arena.len();
        tracing::debug!("converted {} sim tracker hits", arena.len());
        Ok(())
    }

    fn convert_calo_hits(
        &self,
        coll: &Collection<columnar::CalorimeterHit>,
        arena: &mut Arena<object::CalorimeterHit>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let (cell_id0, cell_id1) = split_cell_id(row.cell_id);
            let dst = arena.push(object::CalorimeterHit {
                cell_id0,
                cell_id1,
                energy: row.energy,
                energy_error: row.energy_error,
                time: row.time,
                position: row.position,
                type_code: row.type_code,
            });
            map.insert(idx, dst)?;
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.calo_hits = arena.len();
        tracing::debug!("converted {} calorimeter hits", arena.len());
        Ok(())
    }

    fn convert_raw_calo_hits(
        &self,
        coll: &Collection<columnar::RawCalorimeterHit>,
        arena: &mut Arena<object::RawCalorimeterHit>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let (cell_id0, cell_id1) = split_cell_id(row.cell_id);
            let dst = arena.push(object::RawCalorimeterHit {
                cell_id0,
                cell_id1,
                amplitude: row.amplitude,
                time_stamp: row.time_stamp,
            });
            map.insert(idx, dst)?;
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.raw_calo_hits = arena.len();
        tracing::debug!("converted {} raw calorimeter hits", arena.len());
        Ok(())
    }

    fn convert_sim_calo_hits(
        &self,
        coll: &Collection<columnar::SimCalorimeterHit>,
        arena: &mut Arena<object::SimCalorimeterHit>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let mut hit = object::SimCalorimeterHit::default();
            (hit.cell_id0, hit.cell_id1) = split_cell_id(row.cell_id);
            hit.energy = row.energy;
            hit.position = row.position;
            let dst = arena.push(hit);
            map.insert(idx, dst)?;
            // Contributions reference particles converted independently;
            // attaching them is deferred entirely to the fill pass.
            report.relations_deferred += row.contributions.len();
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.sim_calo_hits = arena.len();
        tracing::debug!("converted {} sim calorimeter hits", arena.len());
        Ok(())
    }

    fn convert_tpc_hits(
        &self,
        coll: &Collection<columnar::TimeSeriesHit>,
        arena: &mut Arena<object::TpcHit>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let dst = arena.push(object::TpcHit {
                // The destination kind has no split representation; the
                // 64-bit id truncates to 32 bits.
                cell_id: row.cell_id as i32,
                time: row.time,
                charge: row.charge,
                quality: row.quality,
                raw_data: row.adc_counts.clone(),
            });
            map.insert(idx, dst)?;
        }
        self.propagate_encoding(&coll.cell_id_encoding, &mut arena.cell_id_encoding);

        report.records.tpc_hits = arena.len();
        tracing::debug!("converted {} time-series hits", arena.len());
        Ok(())
    }

    fn convert_tracks(
        &self,
        coll: &Collection<columnar::Track>,
        arena: &mut Arena<object::Track>,
        map: &mut IdentityMap,
        tracker_hit_map: &IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let mut track = object::Track::default();
            track.chi2 = row.chi2;
            track.ndf = row.ndf;
            track.dedx = row.dedx;
            track.dedx_error = row.dedx_error;
            track.radius_of_innermost_hit = row.radius_of_innermost_hit;
            track.subdetector_hit_numbers = row.subdetector_hit_numbers.clone();
            track.track_states = row.track_states.iter().map(convert_track_state).collect();
            // The type word only has a bit-level setter on this side.
            for bit in set_bits(row.type_code) {
                track.set_type_bit(bit, true);
            }
            // Pad the per-subdetector counts up to the fixed minimum width.
            if track.subdetector_hit_numbers.len() < self.options.min_subdetector_slots {
                track
                    .subdetector_hit_numbers
                    .resize(self.options.min_subdetector_slots, 0);
            }
            for hit_ref in &row.tracker_hits {
                match tracker_hit_map.resolve(*hit_ref) {
                    Some(hit) => track.tracker_hits.push(hit),
                    None => report.relations_deferred += 1,
                }
            }
            let dst = arena.push(track);
            map.insert(idx, dst)?;
        }

        // Linked tracks live in the same collection; resolve them in a
        // second loop against the completed map.
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let Some(dst) = map.lookup(idx) else { continue };
            for link in &row.tracks {
                match map.resolve(*link) {
                    Some(linked) => arena[dst].tracks.push(linked),
                    None => report.relations_unresolved += 1,
                }
            }
        }

        report.records.tracks = arena.len();
        tracing::debug!("converted {} tracks", arena.len());
        Ok(())
    }

    fn convert_vertices(
        &self,
        coll: &Collection<columnar::Vertex>,
        arena: &mut Arena<object::Vertex>,
        map: &mut IdentityMap,
        reco_map: &IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let associated_particle = match row.associated_particle {
                Ref::Null => None,
                reference => {
                    let resolved = reco_map.resolve(reference);
                    if resolved.is_none() {
                        report.relations_deferred += 1;
                    }
                    resolved
                }
            };
            let dst = arena.push(object::Vertex {
                primary: row.primary,
                chi2: row.chi2,
                probability: row.probability,
                position: row.position,
                covariance: row.covariance,
                algorithm_type: row.algorithm_type.to_string(),
                parameters: row.parameters.clone(),
                associated_particle,
            });
            map.insert(idx, dst)?;
        }

        report.records.vertices = arena.len();
        tracing::debug!("converted {} vertices", arena.len());
        Ok(())
    }

    fn convert_clusters(
        &self,
        coll: &Collection<columnar::Cluster>,
        arena: &mut Arena<object::Cluster>,
        map: &mut IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let mut cluster = object::Cluster::default();
            cluster.energy = row.energy;
            cluster.energy_error = row.energy_error;
            cluster.position = row.position;
            cluster.position_error = row.position_error;
            cluster.i_theta = row.i_theta;
            cluster.phi = row.phi;
            cluster.shape_parameters = row.shape_parameters.clone();
            cluster.subdetector_energies = row.subdetector_energies.clone();
            // Particle-ID records are owned sub-objects, not identities;
            // they are copied, never mapped.
            cluster.particle_ids = row.particle_ids.iter().map(convert_particle_id).collect();
            for bit in set_bits(row.type_code) {
                cluster.set_type_bit(bit, true);
            }
            let dst = arena.push(cluster);
            map.insert(idx, dst)?;
        }

        // Sub-clusters are a self-kind relation; second loop.
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let Some(dst) = map.lookup(idx) else { continue };
            for sub_ref in &row.clusters {
                match map.resolve(*sub_ref) {
                    Some(sub) => arena[dst].clusters.push(sub),
                    None => report.relations_unresolved += 1,
                }
            }
        }

        report.records.clusters = arena.len();
        tracing::debug!("converted {} clusters", arena.len());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_reco_particles(
        &self,
        coll: &Collection<columnar::RecoParticle>,
        arena: &mut Arena<object::RecoParticle>,
        map: &mut IdentityMap,
        track_map: &IdentityMap,
        cluster_map: &IdentityMap,
        vertex_map: &IdentityMap,
        report: &mut ConversionReport,
    ) -> ConvResult<()> {
        for (idx, row) in coll.iter() {
            let mut particle = object::RecoParticle::default();
            if let Some(row) = row {
                particle.type_code = row.type_code;
                particle.energy = row.energy as f64;
                particle.momentum = widen3(row.momentum);
                particle.reference_point = row.reference_point;
                particle.charge = row.charge;
                particle.mass = row.mass as f64;
                particle.goodness_of_pid = row.goodness_of_pid;
                particle.covariance = row.covariance;
                particle.particle_ids =
                    row.particle_ids.iter().map(convert_particle_id).collect();
                // The preferred hypothesis is not an identity: it is matched
                // structurally against the just-converted list, first match
                // wins. Exact float equality is the documented behavior.
                if let Some(used) = &row.particle_id_used {
                    let used = convert_particle_id(used);
                    particle.particle_id_used =
                        particle.particle_ids.iter().position(|pid| *pid == used);
                }
                particle.start_vertex = match row.start_vertex {
                    Ref::Null => None,
                    reference => {
                        let resolved = vertex_map.resolve(reference);
                        if resolved.is_none() {
                            report.relations_deferred += 1;
                        }
                        resolved
                    }
                };
                for track_ref in &row.tracks {
                    match track_map.resolve(*track_ref) {
                        Some(track) => particle.tracks.push(track),
                        None => report.relations_deferred += 1,
                    }
                }
                for cluster_ref in &row.clusters {
                    match cluster_map.resolve(*cluster_ref) {
                        Some(cluster) => particle.clusters.push(cluster),
                        None => report.relations_deferred += 1,
                    }
                }
            }
            // Particle kinds allocate even for unavailable rows to keep
            // positional alignment with the source collection.
            let dst = arena.push(particle);
            map.insert(idx, dst)?;
        }

        // Constituent particles are a self-kind relation; second loop.
        for (idx, row) in coll.iter() {
            let Some(row) = row else { continue };
            let Some(dst) = map.lookup(idx) else { continue };
            for sub_ref in &row.particles {
                match map.resolve(*sub_ref) {
                    Some(sub) => arena[dst].particles.push(sub),
                    None => report.relations_unresolved += 1,
                }
            }
        }

        report.records.reco_particles = arena.len();
        tracing::debug!("converted {} reconstructed particles", arena.len());
        Ok(())
    }

    fn propagate_encoding(&self, encoding: &str, slot: &mut Option<String>) {
        // An empty descriptor means no encoding is attached.
        if self.options.propagate_cell_encoding && !encoding.is_empty() {
            *slot = Some(encoding.to_string());
        }
    }
}

/// Convert one event with default options.
pub fn convert_event(event: &columnar::Event) -> ConvResult<ConvertedEvent> {
    EventConverter::with_defaults().convert(event)
}

fn convert_header(header: &columnar::EventHeader) -> object::EventHeader {
    object::EventHeader {
        event_number: header.event_number,
        run_number: header.run_number,
        time_stamp: header.time_stamp as i64,
        weight: header.weight,
    }
}

fn convert_track_state(state: &columnar::TrackState) -> object::TrackState {
    object::TrackState {
        location: state.location,
        d0: state.d0,
        phi: state.phi,
        omega: state.omega,
        z0: state.z0,
        tan_lambda: state.tan_lambda,
        reference_point: state.reference_point,
        cov_matrix: state.cov_matrix,
    }
}

fn convert_particle_id(pid: &columnar::ParticleId) -> object::ParticleId {
    object::ParticleId {
        type_code: pid.type_code,
        pdg: pid.pdg,
        likelihood: pid.likelihood,
        algorithm_type: pid.algorithm_type,
        parameters: pid.parameters.clone(),
    }
}

fn widen3(v: [f32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}
