use log::{trace, warn};
use munkres::{solve_assignment, Position, WeightMatrix};
use nalgebra as na;
use ndarray::Array2;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::math::{argmin, argsort};

const PADDING_COST: f32 = 100000.0;
const MAX_OPTIMAL_SIZE: usize = 256;

/// How tracks and detections are paired once costs are known.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// Rows ordered by their cheapest pair, each taking its own arg-min.
    /// Not globally optimal.
    Greedy,
    /// Minimum total cost bipartite matching (Hungarian). Tie-breaks can
    /// differ from `Greedy`.
    Optimal,
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment::Greedy
    }
}

/// Position and box of either side of the association.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub centroid: na::Point2<f32>,
    pub bbox: BBox<Ltrb>,
}

/// Pairwise costs between `N` tracks (rows) and `M` detections (columns).
#[derive(Debug, Clone)]
pub struct CostMatrix {
    /// Raw centroid distance in pixels, used for gating.
    pub distance: Array2<f32>,
    /// `0.5 * distance / max_distance + 0.5 * (1 - IoU)`, used for ordering.
    pub cost: Array2<f32>,
}

impl CostMatrix {
    pub fn new(tracks: &[Candidate], detections: &[Candidate], max_distance: f32) -> Self {
        let shape = (tracks.len(), detections.len());

        let distance = Array2::from_shape_fn(shape, |(r, c)| {
            na::distance(&tracks[r].centroid, &detections[c].centroid)
        });

        let cost = Array2::from_shape_fn(shape, |(r, c)| {
            let euc_norm = distance[[r, c]] / max_distance;
            let iou_cost = 1.0 - tracks[r].bbox.iou(&detections[c].bbox);

            0.5 * euc_norm + 0.5 * iou_cost
        });

        Self { distance, cost }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.cost.nrows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cost.ncols()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matching {
    /// `(track, detection)` index pairs in the order they were accepted.
    pub matched: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl Matching {
    fn from_pairs(matched: Vec<(usize, usize)>, rows: usize, cols: usize) -> Self {
        let mut used_rows = vec![false; rows];
        let mut used_cols = vec![false; cols];

        for &(r, c) in &matched {
            used_rows[r] = true;
            used_cols[c] = true;
        }

        Self {
            matched,
            unmatched_tracks: (0..rows).filter(|&r| !used_rows[r]).collect(),
            unmatched_detections: (0..cols).filter(|&c| !used_cols[c]).collect(),
        }
    }
}

pub fn assign(costs: &CostMatrix, max_distance: f32, strategy: Assignment) -> Matching {
    match strategy {
        Assignment::Greedy => greedy(costs, max_distance),
        Assignment::Optimal => optimal(costs, max_distance),
    }
}

/// Rows sorted by their minimum cost (ties by row index), each row takes
/// its first arg-min column unless that column is taken or the raw
/// distance exceeds `max_distance`.
pub fn greedy(costs: &CostMatrix, max_distance: f32) -> Matching {
    let (rows, cols) = (costs.rows(), costs.cols());
    if rows == 0 || cols == 0 {
        return Matching::from_pairs(Vec::new(), rows, cols);
    }

    let best: Vec<(usize, f32)> = costs
        .cost
        .rows()
        .into_iter()
        .map(|row| argmin(row.iter().copied()).unwrap_or((0, f32::INFINITY)))
        .collect();

    let minima: Vec<f32> = best.iter().map(|&(_, v)| v).collect();

    let mut used_rows = vec![false; rows];
    let mut used_cols = vec![false; cols];
    let mut matched = Vec::new();

    for row in argsort(&minima) {
        let col = best[row].0;

        if used_rows[row] || used_cols[col] {
            continue;
        }

        let dist = costs.distance[[row, col]];
        if dist > max_distance {
            trace!("greedy: track #{} gated from detection #{} ({:.1}px)", row, col, dist);
            continue;
        }

        used_rows[row] = true;
        used_cols[col] = true;
        matched.push((row, col));
    }

    Matching::from_pairs(matched, rows, cols)
}

/// Hungarian assignment over the blended cost with the same distance gate.
pub fn optimal(costs: &CostMatrix, max_distance: f32) -> Matching {
    let (rows, cols) = (costs.rows(), costs.cols());
    if rows == 0 || cols == 0 {
        return Matching::from_pairs(Vec::new(), rows, cols);
    }

    let n = rows.max(cols);
    if n > MAX_OPTIMAL_SIZE {
        warn!("optimal: {}x{} cost matrix is too big, using greedy", rows, cols);
        return greedy(costs, max_distance);
    }

    let mut mat = WeightMatrix::from_fn(n, |(r, c)| {
        if r < rows && c < cols {
            costs.cost[[r, c]]
        } else {
            PADDING_COST
        }
    });
    let solved = solve_assignment(&mut mat);

    let positions: Vec<Position> = match solved {
        Ok(inner) => inner,
        Err(err) => {
            warn!("optimal: assignment could not be solved ({:?}), using greedy", err);
            return greedy(costs, max_distance);
        }
    };

    let mut matched: Vec<(usize, usize)> = positions
        .into_iter()
        .filter(|p| p.row < rows && p.column < cols)
        .filter(|p| costs.distance[[p.row, p.column]] <= max_distance)
        .map(|p| (p.row, p.column))
        .collect();

    matched.sort_unstable();

    Matching::from_pairs(matched, rows, cols)
}
