//! Texton extraction and the gaussian weighting applied to it

use crate::{canvas::Canvas, Coord2D, Pixel};

/// A `diameter x diameter` view of the canvas around a target pixel.
///
/// Cells that fall outside the canvas, or that are not yet filled, are
/// `None`. The target sits in the middle cell, `diameter / 2` cells from
/// every edge.
pub(crate) struct NeighborhoodWindow<'a> {
    diameter: u32,
    cells: Vec<Option<&'a Pixel>>,
}

impl<'a> NeighborhoodWindow<'a> {
    pub(crate) fn extract(canvas: &'a Canvas, center: Coord2D, diameter: u32) -> Self {
        let radius = (diameter / 2) as i64;
        let dims = canvas.dims();
        let mut cells = Vec::with_capacity(diameter as usize * diameter as usize);

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = i64::from(center.x) + dx;
                let y = i64::from(center.y) + dy;

                let in_bounds =
                    x >= 0 && y >= 0 && x < i64::from(dims.width) && y < i64::from(dims.height);

                let cell = if in_bounds {
                    Some(canvas.get(Coord2D::from(x as u32, y as u32))).filter(|px| px.is_filled())
                } else {
                    None
                };

                cells.push(cell);
            }
        }

        Self { diameter, cells }
    }

    #[inline]
    pub(crate) fn diameter(&self) -> u32 {
        self.diameter
    }

    #[cfg(test)]
    pub(crate) fn cell(&self, wx: u32, wy: u32) -> Option<&'a Pixel> {
        self.cells[wy as usize * self.diameter as usize + wx as usize]
    }

    /// Iterates the filled cells as `(window x, window y, pixel)`
    pub(crate) fn present(&self) -> impl Iterator<Item = (u32, u32, &'a Pixel)> + '_ {
        let d = self.diameter;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|px| (i as u32 % d, i as u32 / d, px)))
    }
}

/// Normalized 2D gaussian over a `diameter x diameter` window, favoring
/// cells close to the target when scoring a texton.
pub(crate) struct GaussianMask {
    diameter: u32,
    weights: Vec<f32>,
}

impl GaussianMask {
    pub(crate) fn new(diameter: u32) -> Self {
        let radius = (diameter / 2) as i32;
        let d = f64::from(diameter);

        let raw: Vec<f64> = (-radius..=radius)
            .flat_map(|y| (-radius..=radius).map(move |x| (x, y)))
            .map(|(x, y)| {
                let (x, y) = (f64::from(x), f64::from(y));
                f64::exp(-(x * x / d + y * y / d))
            })
            .collect();

        let sum: f64 = raw.iter().sum();

        Self {
            diameter,
            weights: raw.into_iter().map(|w| (w / sum) as f32).collect(),
        }
    }

    #[inline]
    pub(crate) fn weight(&self, wx: u32, wy: u32) -> f32 {
        self.weights[wy as usize * self.diameter as usize + wx as usize]
    }

    #[inline]
    pub(crate) fn diameter(&self) -> u32 {
        self.diameter
    }
}
