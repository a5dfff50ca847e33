// src/convert/resolve.rs

//! Deferred fill pass.
//!
//! Runs once after every kind converter has completed, with the full set of
//! identity maps. Each step only touches relations the first pass left
//! unresolved, guarded so the pass is idempotent: invoking it again on the
//! same state changes nothing.
//!
//! The pass takes two map sets, "maps to update" and "maps to look up", to
//! support linking records of one conversion against entities resolved in a
//! larger map set; within a single event both are the same set (see
//! [`fill_deferred`]). Destination indices obtained through the lookup maps
//! must belong to the destination event being updated.

use crate::columnar::{self, Ref};
use crate::convert::{ConversionMaps, ConversionReport};
use crate::object;

/// Fill deferred relations of one event, looking up and updating the same
/// map set.
pub fn fill_deferred(
    src: &columnar::Event,
    dst: &mut object::Event,
    maps: &ConversionMaps,
    report: &mut ConversionReport,
) {
    fill_deferred_between(src, dst, maps, maps, report);
}

/// Fill deferred relations, updating the records tracked by `update` while
/// resolving targets through `lookup`.
///
/// Safe to invoke multiple times; every step checks the destination state
/// before writing. Report counters accumulate per invocation, so callers
/// that re-run the pass should read the report from the first run.
pub fn fill_deferred_between(
    src: &columnar::Event,
    dst: &mut object::Event,
    update: &ConversionMaps,
    lookup: &ConversionMaps,
    report: &mut ConversionReport,
) {
    // Track -> tracker hits. Only when no hit was linked yet; a partially
    // wired list is never appended to twice.
    for (src_idx, dst_idx) in update.tracks.pairs() {
        let Some(row) = src.tracks.get(src_idx) else { continue };
        let Some(track) = dst.tracks.get_mut(dst_idx) else { continue };
        if !track.tracker_hits.is_empty() || row.tracker_hits.is_empty() {
            continue;
        }
        for hit_ref in &row.tracker_hits {
            match lookup.tracker_hits.resolve(*hit_ref) {
                Some(hit) => track.tracker_hits.push(hit),
                None => report.relations_unresolved += 1,
            }
        }
    }

    // Sim tracker hit -> particle. Only when currently null and the source
    // actually references something.
    for (src_idx, dst_idx) in update.sim_tracker_hits.pairs() {
        let Some(row) = src.sim_tracker_hits.get(src_idx) else { continue };
        let Some(hit) = dst.sim_tracker_hits.get_mut(dst_idx) else { continue };
        if hit.particle.is_some() || row.particle.is_null() {
            continue;
        }
        match lookup.mc_particles.resolve(row.particle) {
            Some(particle) => hit.particle = Some(particle),
            None => report.relations_unresolved += 1,
        }
    }

    // Sim calorimeter hit -> contributions. Always done here, never in the
    // first pass; guarded on the destination having none yet.
    for (src_idx, dst_idx) in update.sim_calo_hits.pairs() {
        let Some(row) = src.sim_calo_hits.get(src_idx) else { continue };
        let Some(hit) = dst.sim_calo_hits.get_mut(dst_idx) else { continue };
        if !hit.contributions().is_empty() || row.contributions.is_empty() {
            continue;
        }
        // Attaching accumulates energy on the destination side; the
        // converted aggregate is restored afterwards.
        let converted_energy = hit.energy;
        for (pos, contrib_ref) in row.contributions.iter().enumerate() {
            let Some(contrib) = src.calo_contributions.resolve(*contrib_ref) else {
                let warning = format!(
                    "skipping unavailable contribution {} of sim calorimeter hit {}",
                    pos, src_idx
                );
                tracing::warn!("{}", warning);
                report.add_warning(warning);
                continue;
            };
            // An unresolvable particle still attaches the contribution,
            // with a null particle reference.
            let particle = match contrib.particle {
                Ref::Null => None,
                reference => {
                    let resolved = lookup.mc_particles.resolve(reference);
                    if resolved.is_none() {
                        report.relations_unresolved += 1;
                    }
                    resolved
                }
            };
            hit.add_contribution(object::Contribution {
                particle,
                energy: contrib.energy,
                time: contrib.time,
                pdg: contrib.pdg,
                step_position: contrib.step_position,
            });
        }
        hit.energy = converted_energy;
    }

    // Vertex -> associated particle. Only when currently null.
    for (src_idx, dst_idx) in update.vertices.pairs() {
        let Some(row) = src.vertices.get(src_idx) else { continue };
        let Some(vertex) = dst.vertices.get_mut(dst_idx) else { continue };
        if vertex.associated_particle.is_some() || row.associated_particle.is_null() {
            continue;
        }
        match lookup.reco_particles.resolve(row.associated_particle) {
            Some(particle) => vertex.associated_particle = Some(particle),
            None => report.relations_unresolved += 1,
        }
    }

    // Reconstructed particle -> start vertex, tracks, clusters.
    for (src_idx, dst_idx) in update.reco_particles.pairs() {
        let Some(row) = src.reco_particles.get(src_idx) else { continue };
        let Some(particle) = dst.reco_particles.get_mut(dst_idx) else { continue };

        if particle.start_vertex.is_none() && !row.start_vertex.is_null() {
            match lookup.vertices.resolve(row.start_vertex) {
                Some(vertex) => particle.start_vertex = Some(vertex),
                None => report.relations_unresolved += 1,
            }
        }

        // The source relation count is the ground truth: a matching count
        // means this list was already fully processed. On a mismatch the
        // list is rebuilt in source order, which cannot duplicate entries.
        if particle.tracks.len() != row.tracks.len() {
            particle.tracks.clear();
            for track_ref in &row.tracks {
                match lookup.tracks.resolve(*track_ref) {
                    Some(track) => particle.tracks.push(track),
                    None => report.relations_unresolved += 1,
                }
            }
        }

        if particle.clusters.len() != row.clusters.len() {
            particle.clusters.clear();
            for cluster_ref in &row.clusters {
                match lookup.clusters.resolve(*cluster_ref) {
                    Some(cluster) => particle.clusters.push(cluster),
                    None => report.relations_unresolved += 1,
                }
            }
        }
    }
}
