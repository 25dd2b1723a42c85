use crate::{ColorSpace, Coord2D, Dims, GeneratedTexture, Pixel, Sample, SEED_SIZE};
use rand::Rng;

/// The image being grown, a dense row major grid of `Pixel`s
pub(crate) struct Canvas {
    dims: Dims,
    pixels: Vec<Pixel>,
}

impl Canvas {
    pub(crate) fn new(dims: Dims) -> Self {
        Self {
            dims,
            pixels: vec![Pixel::default(); dims.width as usize * dims.height as usize],
        }
    }

    #[inline]
    pub(crate) fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub(crate) fn get(&self, coord: Coord2D) -> &Pixel {
        &self.pixels[coord.to_flat(self.dims)]
    }

    /// Fills the pixel at `coord` with the color of `value`. Every pixel is
    /// committed at most once.
    pub(crate) fn commit(&mut self, coord: Coord2D, value: &Pixel) {
        let px = &mut self.pixels[coord.to_flat(self.dims)];
        debug_assert!(!px.is_filled(), "{:?} was already filled", coord);
        px.assign(value);
    }

    pub(crate) fn filled_count(&self) -> usize {
        self.pixels.iter().filter(|px| px.is_filled()).count()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.pixels.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.pixels.iter().all(Pixel::is_filled)
    }

    /// Copies a random 3x3 block of `sample` into the middle of the canvas,
    /// returning the top left corner of the block in the sample
    pub(crate) fn seed<R: Rng>(&mut self, sample: &Sample, rng: &mut R) -> Coord2D {
        let sdims = sample.dims();
        let anchor = Coord2D::from(
            rng.gen_range(0..=sdims.width - SEED_SIZE),
            rng.gen_range(0..=sdims.height - SEED_SIZE),
        );

        let origin = Coord2D::from(self.dims.width / 2 - 1, self.dims.height / 2 - 1);
        let space = sample.color_space();

        for dy in 0..SEED_SIZE {
            for dx in 0..SEED_SIZE {
                let value =
                    Pixel::from_channels(sample.pixel(anchor.x + dx, anchor.y + dy), space);
                self.commit(Coord2D::from(origin.x + dx, origin.y + dy), &value);
            }
        }

        anchor
    }

    /// All unfilled coordinates with at least one filled 4-neighbor, in row
    /// major order
    pub(crate) fn frontier(&self) -> Vec<Coord2D> {
        let Dims { width, height } = self.dims;
        let mut frontier = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let coord = Coord2D::from(x, y);
                if self.get(coord).is_filled() {
                    continue;
                }

                let touches_filled = (x > 0 && self.get(Coord2D::from(x - 1, y)).is_filled())
                    || (x + 1 < width && self.get(Coord2D::from(x + 1, y)).is_filled())
                    || (y > 0 && self.get(Coord2D::from(x, y - 1)).is_filled())
                    || (y + 1 < height && self.get(Coord2D::from(x, y + 1)).is_filled());

                if touches_filled {
                    frontier.push(coord);
                }
            }
        }

        frontier
    }

    pub(crate) fn into_texture(self, space: ColorSpace) -> GeneratedTexture {
        let mut data = Vec::with_capacity(self.pixels.len() * space.channel_count());
        for px in &self.pixels {
            px.extend_channels(space, &mut data);
        }

        GeneratedTexture::new(self.dims, space, data)
    }
}
