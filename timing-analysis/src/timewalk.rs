use crate::{Real, aggregate};
use ndarray::array;
use ndarray_stats::histogram::{Bins, Edges, Grid};
use noisy_float::types::N64;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A populated peak-amplitude bin and the jitter of its members' crossing times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmplitudeBin {
    pub lower_bound: Real,
    pub upper_bound: Real,
    pub center: Real,
    pub n_samples: usize,
    pub rms_jitter_ns: Real,
}

/// Edges at `start + k * width` for each index `k`.
/// Indices need not be contiguous; non-finite edges are skipped.
pub fn make_bin_edges(
    start: Real,
    width: Real,
    indices: impl IntoIterator<Item = usize>,
) -> Edges<N64> {
    let edges: Vec<N64> = indices
        .into_iter()
        .filter_map(|k| N64::try_new(start + k as Real * width))
        .collect();
    Edges::from(edges)
}

/// Groups `(peak_amplitude, crossing_time)` pairs into fixed-width amplitude
/// bins whose edges are aligned to multiples of `bin_width`, and computes the
/// jitter of each bin. Bins are half-open `[lower, upper)`; an amplitude on
/// the uppermost edge falls outside the range. Bins with fewer than two
/// members are not emitted.
///
/// Only the edges around occupied bins are materialised.
pub fn bin_by_amplitude(pulses: &[(Real, Real)], bin_width: Real) -> Vec<AmplitudeBin> {
    if !(bin_width.is_finite() && bin_width > 0.0) {
        warn!("Invalid bin width {bin_width}, no amplitude bins produced");
        return Vec::new();
    }
    let Some((min_amplitude, max_amplitude)) = pulses
        .iter()
        .map(|(amplitude, _)| (*amplitude, *amplitude))
        .reduce(|(min, max), (a, b)| (min.min(a), max.max(b)))
    else {
        return Vec::new();
    };

    let min_edge = (min_amplitude / bin_width).floor() * bin_width;
    let max_edge = (max_amplitude / bin_width).ceil() * bin_width;
    let last_edge = ((max_edge - min_edge) / bin_width).round().max(0.0) as usize;

    // The edges either side of each amplitude's estimated bin, with one
    // to spare on each side to absorb rounding in the estimate.
    let mut edge_indices = BTreeSet::new();
    for (amplitude, _) in pulses {
        let estimate = ((amplitude - min_edge) / bin_width).floor().max(0.0) as usize;
        edge_indices.extend(
            (estimate.saturating_sub(1)..=estimate.saturating_add(2)).filter(|k| *k <= last_edge),
        );
    }
    let edges = make_bin_edges(min_edge, bin_width, edge_indices);
    let grid = Grid::from(vec![Bins::new(edges)]);

    let mut members = BTreeMap::<usize, Vec<Real>>::new();
    for (amplitude, time) in pulses {
        let index = N64::try_new(*amplitude)
            .and_then(|amplitude| grid.index_of(&array![amplitude]))
            .and_then(|index| index.first().copied());
        match index {
            Some(index) => members.entry(index).or_default().push(*time),
            None => debug!("Amplitude {amplitude} lies outside the bin range"),
        }
    }

    let bins = grid.projections().first();
    members
        .into_iter()
        .filter_map(|(index, times)| {
            let range = bins?.index(index);
            let (lower_bound, upper_bound) = (range.start.raw(), range.end.raw());
            let dispersion = aggregate(&times)?;
            Some(AmplitudeBin {
                lower_bound,
                upper_bound,
                center: (lower_bound + upper_bound) / 2.0,
                n_samples: dispersion.n_samples,
                rms_jitter_ns: dispersion.rms_jitter_ns,
            })
        })
        .collect()
}
