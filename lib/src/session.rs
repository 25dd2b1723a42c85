use crate::{
    canvas::Canvas,
    errors::InvalidArgument,
    matching::{find_matches, MatchExhausted},
    window::{GaussianMask, NeighborhoodWindow},
    *,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

const DESCRIPTION: &str = "Pixel based texture synthesis using methods derived from Efros & Leung's \
    1999 paper. Grows the texture outward from a 3x3 seed, picking each new pixel among the \
    sample pixels whose neighborhood best matches the already synthesized one.";

/// Largest accepted texton diameter, the mask and every window hold
/// `diameter * diameter` cells
pub const MAX_DIAMETER: u32 = 255;

struct Parameters {
    diameter: u32,
    error_tolerance: f32,
    tolerance_growth: f32,
    max_error_tolerance: f32,
    max_sweeps: Option<u32>,
    max_thread_count: Option<usize>,
    seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            diameter: 3,
            error_tolerance: 0.2,
            tolerance_growth: 1.1,
            max_error_tolerance: 1.0e6,
            max_sweeps: None,
            max_thread_count: None,
            seed: 0,
        }
    }
}

/// Grows textures the way Efros & Leung describe in "Texture Synthesis by
/// Non-parametric Sampling" (1999).
///
/// Starting from a 3x3 block copied out of the sample, every unfilled pixel
/// that touches the filled region is given the color of a sample pixel whose
/// neighborhood matches its own, until the whole output is filled.
///
/// The error tolerance is loosened every time a pixel finds no match and is
/// never tightened again for the lifetime of the synthesizer.
///
/// # Example
/// ```no_run
/// use texture_growth::{Dims, EfrosLeung, Sample, TextureSynthesizer};
///
/// let sample = Sample::load(&"imgs/bricks.png").expect("failed to load sample");
/// let mut synth = EfrosLeung::builder()
///     .diameter(5)
///     .seed(10)
///     .build()
///     .expect("invalid parameters");
///
/// let texture = synth
///     .generate_texture(&sample, Dims::square(64))
///     .expect("failed to grow texture");
/// texture.save("out/bricks.png").expect("failed to save texture");
/// ```
pub struct EfrosLeung {
    params: Parameters,
    mask: GaussianMask,
    error_tolerance: f32,
    rng: Pcg32,
}

impl EfrosLeung {
    /// Creates a new builder with default parameters.
    pub fn builder() -> EfrosLeungBuilder {
        EfrosLeungBuilder::default()
    }

    /// Creates a synthesizer with the given texton diameter and default
    /// parameters otherwise
    pub fn new(diameter: u32) -> Result<Self, Error> {
        Self::builder().diameter(diameter).build()
    }

    /// The current error tolerance, which only ever grows
    pub fn error_tolerance(&self) -> f32 {
        self.error_tolerance
    }

    pub fn diameter(&self) -> u32 {
        self.params.diameter
    }

    /// Grows a texture of `size` from `sample`.
    ///
    /// `progress` is notified after every sweep over the frontier, `cancel`
    /// is checked before every sweep.
    pub fn run(
        &mut self,
        sample: &Sample,
        size: Dims,
        mut progress: Option<Box<dyn GeneratorProgress>>,
        cancel: Option<&CancelToken>,
    ) -> Result<GeneratedTexture, Error> {
        self.check_call_validity(sample, size)?;

        let max_threads = self
            .params
            .max_thread_count
            .unwrap_or_else(num_cpus::get);
        let max_sweeps = self
            .params
            .max_sweeps
            .unwrap_or_else(|| size.width.saturating_mul(size.height));

        let mut canvas = Canvas::new(size);
        let anchor = canvas.seed(sample, &mut self.rng);
        tracing::debug!(x = anchor.x, y = anchor.y, "seeded canvas from sample");

        let total = canvas.len();
        let mut filled = canvas.filled_count();
        let mut sweeps = 0;

        while filled < total {
            if cancel.map_or(false, CancelToken::is_cancelled) {
                return Err(Error::Cancelled);
            }

            self.check_caps(sweeps, max_sweeps)?;
            sweeps += 1;

            let frontier = canvas.frontier();
            let frontier_len = frontier.len();
            // A connected seed grown through 4-neighbors can't strand pixels
            debug_assert!(!frontier.is_empty(), "unfilled pixels unreachable from the seed");

            for coord in frontier {
                let matches = {
                    let window = NeighborhoodWindow::extract(&canvas, coord, self.params.diameter);
                    find_matches(&window, &self.mask, sample, self.error_tolerance, max_threads)
                };

                if self.place(&mut canvas, coord, matches) {
                    filled += 1;
                }
            }

            tracing::trace!(
                sweep = sweeps,
                frontier = frontier_len,
                filled,
                total,
                "finished sweep"
            );

            if let Some(ref mut progress) = progress {
                progress.update(ProgressUpdate {
                    pixels: ProgressStat {
                        current: filled,
                        total,
                    },
                    sweep: sweeps,
                    error_tolerance: self.error_tolerance,
                });
            }
        }

        debug_assert!(canvas.is_full());
        tracing::info!(
            width = size.width,
            height = size.height,
            sweeps,
            "texture complete"
        );

        Ok(canvas.into_texture(sample.color_space()))
    }

    /// Commits a random candidate at `coord`, or relaxes the error tolerance
    /// when there is none. Returns whether `coord` was filled.
    fn place(
        &mut self,
        canvas: &mut Canvas,
        coord: Coord2D,
        matches: Result<Vec<Pixel>, MatchExhausted>,
    ) -> bool {
        match matches {
            Ok(candidates) => {
                let pick = &candidates[self.rng.gen_range(0..candidates.len())];
                canvas.commit(coord, pick);
                true
            }
            Err(MatchExhausted) => {
                self.error_tolerance *= self.params.tolerance_growth;
                tracing::debug!(
                    x = coord.x,
                    y = coord.y,
                    error_tolerance = self.error_tolerance,
                    "no match within tolerance, relaxing"
                );
                false
            }
        }
    }

    fn check_caps(&self, sweeps: u32, max_sweeps: u32) -> Result<(), Error> {
        if sweeps >= max_sweeps || self.error_tolerance > self.params.max_error_tolerance {
            return Err(Error::SynthesisTimeout {
                sweeps,
                error_tolerance: self.error_tolerance,
            });
        }

        Ok(())
    }

    fn check_call_validity(&self, sample: &Sample, size: Dims) -> Result<(), Error> {
        if size.width < SEED_SIZE || size.height < SEED_SIZE {
            return Err(InvalidArgument::new(
                "output-size",
                format!(
                    "{}x{} is smaller than the minimum of {}x{}",
                    size.width, size.height, SEED_SIZE, SEED_SIZE
                ),
            )
            .into());
        }

        let sdims = sample.dims();
        if sdims.width < self.params.diameter || sdims.height < self.params.diameter {
            return Err(InvalidArgument::new(
                "diameter",
                format!(
                    "a texton of {} pixels does not fit in the {}x{} sample",
                    self.params.diameter, sdims.width, sdims.height
                ),
            )
            .into());
        }

        Ok(())
    }
}

impl TextureSynthesizer for EfrosLeung {
    fn generate_texture(&mut self, sample: &Sample, size: Dims) -> Result<GeneratedTexture, Error> {
        self.run(sample, size, None, None)
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }
}

/// Builds an `EfrosLeung` synthesizer by setting parameters, calling `build`
/// checks all of them up front
#[derive(Default)]
pub struct EfrosLeungBuilder {
    params: Parameters,
}

impl EfrosLeungBuilder {
    /// Creates a new `EfrosLeungBuilder`, can also be created via
    /// `EfrosLeung::builder()`
    pub fn new() -> Self {
        Self::default()
    }

    /// The width and height, in pixels, of the neighborhood compared against
    /// the sample. Must be odd.
    ///
    /// Larger textons capture larger structures, at a quadratic cost. At most
    /// `MAX_DIAMETER`.
    ///
    /// Default: 3
    pub fn diameter(mut self, diameter: u32) -> Self {
        self.params.diameter = diameter;
        self
    }

    /// The fraction above the best match score that still counts as a match.
    ///
    /// Default: 0.2
    pub fn error_tolerance(mut self, value: f32) -> Self {
        self.params.error_tolerance = value;
        self
    }

    /// The factor the error tolerance is multiplied by each time a pixel
    /// finds no match.
    ///
    /// Default: 1.1
    pub fn tolerance_growth(mut self, value: f32) -> Self {
        self.params.tolerance_growth = value;
        self
    }

    /// Fails synthesis with `Error::SynthesisTimeout` once the error
    /// tolerance grows past this value.
    ///
    /// Default: 1e6
    pub fn max_error_tolerance(mut self, value: f32) -> Self {
        self.params.max_error_tolerance = value;
        self
    }

    /// Fails synthesis with `Error::SynthesisTimeout` after this many sweeps
    /// over the frontier.
    ///
    /// Default: the number of pixels in the output
    pub fn max_sweeps(mut self, count: u32) -> Self {
        self.params.max_sweeps = Some(count);
        self
    }

    /// Seeds the random source used to place the seed block and to pick
    /// among equally good matches.
    ///
    /// The same seed with the same inputs always produces the same texture,
    /// regardless of the thread count.
    pub fn seed(mut self, value: u64) -> Self {
        self.params.seed = value;
        self
    }

    /// Controls the maximum number of threads used to score sample rows.
    ///
    /// Default: The number of logical cores on this system.
    pub fn max_thread_count(mut self, count: usize) -> Self {
        self.params.max_thread_count = Some(count);
        self
    }

    /// Creates an `EfrosLeung` synthesizer, or returns an error if any
    /// parameter is invalid.
    pub fn build(self) -> Result<EfrosLeung, Error> {
        self.check_parameters_validity()?;

        Ok(EfrosLeung {
            mask: GaussianMask::new(self.params.diameter),
            error_tolerance: self.params.error_tolerance,
            rng: Pcg32::seed_from_u64(self.params.seed),
            params: self.params,
        })
    }

    fn check_parameters_validity(&self) -> Result<(), Error> {
        let p = &self.params;

        if p.diameter % 2 == 0 {
            return Err(
                InvalidArgument::new("diameter", format!("{} is not an odd number", p.diameter))
                    .into(),
            );
        }

        if p.diameter > MAX_DIAMETER {
            return Err(InvalidArgument::new(
                "diameter",
                format!("{} is larger than the maximum of {}", p.diameter, MAX_DIAMETER),
            )
            .into());
        }

        if p.error_tolerance.is_nan() || p.error_tolerance < 0.0 {
            return Err(InvalidArgument::new(
                "error-tolerance",
                format!("{} must not be negative", p.error_tolerance),
            )
            .into());
        }

        if p.tolerance_growth.is_nan() || p.tolerance_growth <= 1.0 {
            return Err(InvalidArgument::new(
                "tolerance-growth",
                format!("{} must be greater than 1", p.tolerance_growth),
            )
            .into());
        }

        if !p.max_error_tolerance.is_finite() || p.max_error_tolerance < p.error_tolerance {
            return Err(InvalidArgument::new(
                "max-error-tolerance",
                format!(
                    "{} must be finite and at least the error tolerance of {}",
                    p.max_error_tolerance, p.error_tolerance
                ),
            )
            .into());
        }

        if p.max_sweeps == Some(0) {
            return Err(InvalidArgument::new("max-sweeps", "must be at least 1").into());
        }

        if p.max_thread_count == Some(0) {
            return Err(InvalidArgument::new("max-thread-count", "must be at least 1").into());
        }

        Ok(())
    }
}

/// Cooperative cancellation for a running synthesis, checked between sweeps
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Helper struct for passing progress information to external callers
pub struct ProgressStat {
    /// The current amount of work that has been done
    pub current: usize,
    /// The total amount of work to do
    pub total: usize,
}

/// The state of the synthesizer after a sweep over the frontier
pub struct ProgressUpdate {
    /// Filled pixels out of all output pixels
    pub pixels: ProgressStat,
    /// The number of sweeps done so far
    pub sweep: u32,
    /// The error tolerance after the sweep
    pub error_tolerance: f32,
}

/// Allows the synthesizer to update external callers with the current
/// progress of the texture growth
pub trait GeneratorProgress {
    fn update(&mut self, info: ProgressUpdate);
}

impl<G> GeneratorProgress for G
where
    G: FnMut(ProgressUpdate) + Send,
{
    fn update(&mut self, info: ProgressUpdate) {
        self(info)
    }
}
