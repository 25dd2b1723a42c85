// BEGIN - Embark standard lints v0.4
// do not change or add/remove here, but one can add exceptions after this section
// for more info see: <https://github.com/EmbarkStudios/rust-ecosystem/issues/59>
#![deny(unsafe_code)]
#![warn(
    clippy::all,
    clippy::await_holding_lock,
    clippy::char_lit_as_u8,
    clippy::checked_conversions,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_markdown,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::exit,
    clippy::expl_impl_clone_on_copy,
    clippy::explicit_deref_methods,
    clippy::explicit_into_iter_loop,
    clippy::fallible_impl_from,
    clippy::filter_map_next,
    clippy::float_cmp_const,
    clippy::fn_params_excessive_bools,
    clippy::if_let_mutex,
    clippy::implicit_clone,
    clippy::imprecise_flops,
    clippy::inefficient_to_string,
    clippy::invalid_upcast_comparisons,
    clippy::large_types_passed_by_value,
    clippy::let_unit_value,
    clippy::linkedlist,
    clippy::lossy_float_literal,
    clippy::macro_use_imports,
    clippy::manual_ok_or,
    clippy::map_err_ignore,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::match_on_vec_items,
    clippy::match_same_arms,
    clippy::match_wildcard_for_single_variants,
    clippy::mem_forget,
    clippy::mismatched_target_os,
    clippy::mut_mut,
    clippy::mutex_integer,
    clippy::needless_borrow,
    clippy::needless_continue,
    clippy::option_option,
    clippy::path_buf_push_overwrite,
    clippy::ptr_as_ptr,
    clippy::ref_option_ref,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_functions_in_if_condition,
    clippy::semicolon_if_nothing_returned,
    clippy::string_add_assign,
    clippy::string_add,
    clippy::string_lit_as_bytes,
    clippy::string_to_string,
    clippy::todo,
    clippy::trait_duplication_in_bounds,
    clippy::unimplemented,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::useless_transmute,
    clippy::verbose_file_reads,
    clippy::zero_sized_map_values,
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms
)]
// END - Embark standard lints v0.4

//! `texture-growth` synthesizes textures of any size from a small example
//! image by growing pixels outward from a seed, the way Efros & Leung
//! describe in "Texture Synthesis by Non-parametric Sampling" (1999).
//!
//! A `Sample` holds the decoded example. A synthesizer, built through
//! `EfrosLeung::builder()`, grows a `GeneratedTexture` of the requested size
//! from it, in the same color space as the sample (greyscale, RGB or RGBA).
//!
//! ## Usage
//!
//! ```no_run
//! use texture_growth::{Dims, EfrosLeung, Sample, TextureSynthesizer};
//!
//! // Load the example image
//! let sample = Sample::load(&"imgs/1.png").expect("failed to load sample");
//!
//! // Create a synthesizer comparing 5x5 neighborhoods
//! let mut synth = EfrosLeung::builder()
//!     .diameter(5)
//!     .seed(10)
//!     .build()
//!     .expect("invalid parameters");
//!
//! // Grow a new texture
//! let texture = synth
//!     .generate_texture(&sample, Dims::new(96, 64))
//!     .expect("failed to grow texture");
//!
//! // Save it to disk
//! texture.save("out/1.png").expect("failed to save texture");
//! ```
mod canvas;
mod errors;
mod matching;
mod pixel;
mod sample;
pub mod session;
mod window;

pub use image;
use std::path::Path;

pub use errors::{Error, InvalidArgument};
pub use pixel::{ColorSpace, Pixel};
pub use sample::{load_dynamic_image, ImageSource, Sample};
pub use session::{
    CancelToken, EfrosLeung, EfrosLeungBuilder, GeneratorProgress, ProgressStat, ProgressUpdate,
    MAX_DIAMETER,
};

/// Side length of the block copied from the sample to start growing from
pub(crate) const SEED_SIZE: u32 = 3;

/// Simple dimensions struct
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dims {
    pub width: u32,
    pub height: u32,
}

impl Dims {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Coord2D {
    pub(crate) x: u32,
    pub(crate) y: u32,
}

impl Coord2D {
    #[inline]
    pub(crate) fn from(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub(crate) fn to_flat(self, dims: Dims) -> usize {
        self.y as usize * dims.width as usize + self.x as usize
    }
}

/// The capabilities every texture synthesis algorithm offers, letting a
/// caller pick an algorithm at runtime
pub trait TextureSynthesizer {
    /// Grows a texture of `size` from `sample`, in the sample's color space
    fn generate_texture(&mut self, sample: &Sample, size: Dims) -> Result<GeneratedTexture, Error>;

    /// A human readable description of the algorithm and its assumptions
    fn description(&self) -> &'static str;
}

/// A fully grown texture
#[derive(Clone, Debug)]
pub struct GeneratedTexture {
    dims: Dims,
    color_space: ColorSpace,
    data: Vec<f32>,
}

impl GeneratedTexture {
    pub(crate) fn new(dims: Dims, color_space: ColorSpace, data: Vec<f32>) -> Self {
        debug_assert_eq!(
            data.len(),
            dims.width as usize * dims.height as usize * color_space.channel_count()
        );
        Self {
            dims,
            color_space,
            data,
        }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// The channel values of the pixel at column `x`, row `y`
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let cc = self.color_space.channel_count();
        let ind = (y as usize * self.dims.width as usize + x as usize) * cc;
        &self.data[ind..ind + cc]
    }

    /// All channel values, row major and interleaved
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    /// Converts the texture to an 8 bit image of the matching color type
    pub fn to_image(&self) -> image::DynamicImage {
        let Dims { width, height } = self.dims;
        let channel = |x: u32, y: u32, c: usize| -> u8 {
            self.pixel(x, y)[c].round().max(0.0).min(255.0) as u8
        };

        match self.color_space {
            ColorSpace::Greyscale => image::DynamicImage::ImageLuma8(image::ImageBuffer::from_fn(
                width,
                height,
                |x, y| image::Luma([channel(x, y, 0)]),
            )),
            ColorSpace::Rgb => image::DynamicImage::ImageRgb8(image::ImageBuffer::from_fn(
                width,
                height,
                |x, y| image::Rgb([channel(x, y, 0), channel(x, y, 1), channel(x, y, 2)]),
            )),
            ColorSpace::Rgba => image::DynamicImage::ImageRgba8(image::ImageBuffer::from_fn(
                width,
                height,
                |x, y| {
                    image::Rgba([
                        channel(x, y, 0),
                        channel(x, y, 1),
                        channel(x, y, 2),
                        channel(x, y, 3),
                    ])
                },
            )),
        }
    }

    pub fn into_image(self) -> image::DynamicImage {
        self.to_image()
    }

    /// Saves the texture to the specified path, the format is inferred from
    /// the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent_path) = path.parent() {
            std::fs::create_dir_all(&parent_path)?;
        }

        self.to_image().save(&path)?;
        Ok(())
    }

    /// Writes the texture to the specified stream
    pub fn write<W: std::io::Write>(
        &self,
        writer: &mut W,
        fmt: image::ImageOutputFormat,
    ) -> Result<(), Error> {
        Ok(self.to_image().write_to(writer, fmt)?)
    }
}
