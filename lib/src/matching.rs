//! Scores a texton against every placement in the sample and keeps the
//! placements within tolerance of the best one

use crate::{
    window::{GaussianMask, NeighborhoodWindow},
    Coord2D, Pixel, Sample,
};

/// Below this many (cell, placement) comparisons the scan runs on the calling
/// thread, spawning workers costs more than it saves
const PARALLEL_WORK_THRESHOLD: usize = 1 << 14;

/// No sample placement qualified, the caller relaxes its tolerance
#[derive(Debug, PartialEq)]
pub(crate) struct MatchExhausted;

/// A filled window cell, flattened for the inner scoring loop
#[derive(Clone, Copy)]
struct Tap<'a> {
    dx: u32,
    dy: u32,
    weight: f32,
    pixel: &'a Pixel,
}

/// Weighted SSD of one window against every sample placement.
///
/// A placement is identified by the sample coordinate under the window's
/// center cell; only placements where the whole window lies inside the
/// sample are scored.
pub(crate) struct SsdTable {
    /// Sample coordinate of the first placement
    origin: Coord2D,
    cols: u32,
    rows: u32,
    scores: Vec<f32>,
}

impl SsdTable {
    pub(crate) fn compute(
        window: &NeighborhoodWindow<'_>,
        mask: &GaussianMask,
        sample: &Sample,
        max_thread_count: usize,
    ) -> Self {
        debug_assert_eq!(window.diameter(), mask.diameter());

        let diameter = window.diameter();
        let radius = diameter / 2;
        let sdims = sample.dims();

        let cols = (sdims.width + 1).saturating_sub(diameter);
        let rows = (sdims.height + 1).saturating_sub(diameter);

        let taps: Vec<Tap<'_>> = window
            .present()
            .map(|(dx, dy, pixel)| Tap {
                dx,
                dy,
                weight: mask.weight(dx, dy),
                pixel,
            })
            .collect();
        let valid_weight: f32 = taps.iter().map(|t| t.weight).sum();

        let mut scores = vec![0.0; cols as usize * rows as usize];

        // A window with nothing filled in scores every placement the same
        if valid_weight > 0.0 && !scores.is_empty() {
            let score_row = |row: u32, out: &mut [f32]| {
                for (col, score) in out.iter_mut().enumerate() {
                    let mut acc = 0.0;
                    for tap in &taps {
                        let channels = sample.pixel(col as u32 + tap.dx, row + tap.dy);
                        acc += tap.weight
                            * tap.pixel.squared_distance(channels, sample.color_space());
                    }
                    *score = acc / valid_weight;
                }
            };

            let work = scores.len() * taps.len();
            let n_workers = if work < PARALLEL_WORK_THRESHOLD {
                1
            } else {
                max_thread_count.max(1).min(rows as usize)
            };

            fan_out_rows(&mut scores, cols as usize, n_workers, &score_row);
        }

        Self {
            origin: Coord2D::from(radius, radius),
            cols,
            rows,
            scores,
        }
    }

    /// The score of the placement centered on `coord`, if it is a valid placement
    #[cfg(test)]
    pub(crate) fn score_at(&self, coord: Coord2D) -> Option<f32> {
        if coord.x < self.origin.x || coord.y < self.origin.y {
            return None;
        }

        let (col, row) = (coord.x - self.origin.x, coord.y - self.origin.y);
        if col >= self.cols || row >= self.rows {
            return None;
        }

        Some(self.scores[(row * self.cols + col) as usize])
    }

    /// Every placement whose score is within `error_tolerance` of the best
    /// one, in row major order
    pub(crate) fn select(&self, error_tolerance: f32) -> Result<Vec<Coord2D>, MatchExhausted> {
        let best = self
            .scores
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);

        if !best.is_finite() {
            return Err(MatchExhausted);
        }

        let threshold = best * (1.0 + error_tolerance);

        let selected: Vec<Coord2D> = self
            .scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score <= threshold)
            .map(|(i, _)| {
                let i = i as u32;
                Coord2D::from(self.origin.x + i % self.cols, self.origin.y + i / self.cols)
            })
            .collect();

        if selected.is_empty() {
            Err(MatchExhausted)
        } else {
            Ok(selected)
        }
    }
}

/// Splits `scores` into contiguous bands of rows and scores each band on its
/// own worker. Rows never share state, so the result does not depend on the
/// number of workers.
fn fan_out_rows<F>(scores: &mut [f32], cols: usize, n_workers: usize, score_row: &F)
where
    F: Fn(u32, &mut [f32]) + Sync,
{
    let rows = scores.len() / cols;

    // for WASM we do not have threads and crossbeam panics,
    // so let's just score every row directly
    #[cfg(target_arch = "wasm32")]
    let n_workers = {
        let _ = n_workers;
        1
    };

    if n_workers <= 1 {
        for (row, out) in scores.chunks_mut(cols).enumerate() {
            score_row(row as u32, out);
        }
        return;
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let rows_per_worker = (rows + n_workers - 1) / n_workers;

        let scoped = crossbeam_utils::thread::scope(|scope| {
            for (band, band_scores) in scores.chunks_mut(rows_per_worker * cols).enumerate() {
                scope.spawn(move |_| {
                    let first_row = band * rows_per_worker;
                    for (i, out) in band_scores.chunks_mut(cols).enumerate() {
                        score_row((first_row + i) as u32, out);
                    }
                });
            }
        });

        if let Err(panic) = scoped {
            std::panic::resume_unwind(panic);
        }
    }
}

/// Finds every sample pixel whose neighborhood is an acceptable match for
/// `window`
pub(crate) fn find_matches(
    window: &NeighborhoodWindow<'_>,
    mask: &GaussianMask,
    sample: &Sample,
    error_tolerance: f32,
    max_thread_count: usize,
) -> Result<Vec<Pixel>, MatchExhausted> {
    let table = SsdTable::compute(window, mask, sample, max_thread_count);
    let space = sample.color_space();

    Ok(table
        .select(error_tolerance)?
        .into_iter()
        .map(|c| Pixel::from_channels(sample.pixel(c.x, c.y), space))
        .collect())
}
