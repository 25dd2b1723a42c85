use crate::{errors::InvalidArgument, ColorSpace, Dims, Error, SEED_SIZE};
use image::GenericImageView;
use std::{convert::TryFrom, path::Path};

/// Channel values are 8 bit intensities stored as floats
const CHANNEL_MAX: f32 = 255.0;

/// Where the pixels of a `Sample` come from
#[derive(Clone)]
pub enum ImageSource<'a> {
    /// A raw buffer of encoded image data, see `image::load_from_memory` for
    /// details on what is supported
    Memory(&'a [u8]),
    /// The path to an image to load from disk. The image format is inferred
    /// from the file extension, see `image::open` for details
    Path(&'a Path),
    /// An already decoded image
    Image(image::DynamicImage),
}

impl<'a> From<image::DynamicImage> for ImageSource<'a> {
    fn from(img: image::DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl<'a, S> From<&'a S> for ImageSource<'a>
where
    S: AsRef<Path> + 'a,
{
    fn from(path: &'a S) -> Self {
        Self::Path(path.as_ref())
    }
}

pub fn load_dynamic_image(src: ImageSource<'_>) -> Result<image::DynamicImage, image::ImageError> {
    match src {
        ImageSource::Memory(data) => image::load_from_memory(data),
        ImageSource::Path(path) => image::open(path),
        ImageSource::Image(img) => Ok(img),
    }
}

/// The example image textures are grown from.
///
/// Channel values are stored row major, interleaved, in the 0-255 range.
/// A sample is never mutated once built.
#[derive(Clone, Debug)]
pub struct Sample {
    dims: Dims,
    color_space: ColorSpace,
    data: Vec<f32>,
}

impl Sample {
    /// Wraps an already decoded buffer of `width * height * channels` values,
    /// each in the 0-255 range
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<f32>) -> Result<Self, Error> {
        let color_space = ColorSpace::from_channel_count(channels)?;

        if width < SEED_SIZE || height < SEED_SIZE {
            return Err(InvalidArgument::new(
                "sample",
                format!(
                    "a {}x{} sample is smaller than the {}x{} seed",
                    width, height, SEED_SIZE, SEED_SIZE
                ),
            )
            .into());
        }

        let expected = width as usize * height as usize * color_space.channel_count();
        if data.len() != expected {
            return Err(InvalidArgument::new(
                "sample",
                format!(
                    "buffer holds {} values, but {}x{} with {} channel(s) needs {}",
                    data.len(),
                    width,
                    height,
                    channels,
                    expected
                ),
            )
            .into());
        }

        if let Some(bad) = data.iter().find(|v| !(0.0..=CHANNEL_MAX).contains(*v)) {
            return Err(InvalidArgument::new(
                "sample",
                format!("channel value {} is outside 0-{}", bad, CHANNEL_MAX),
            )
            .into());
        }

        Ok(Self {
            dims: Dims::new(width, height),
            color_space,
            data,
        })
    }

    /// Loads and decodes a sample from the specified image source
    pub fn load<'a, S: Into<ImageSource<'a>>>(src: S) -> Result<Self, Error> {
        let img = load_dynamic_image(src.into())?;
        Self::try_from(&img)
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// The channel values of the pixel at column `x`, row `y`
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let cc = self.color_space.channel_count();
        let ind = (y as usize * self.dims.width as usize + x as usize) * cc;
        &self.data[ind..ind + cc]
    }

    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }
}

impl TryFrom<&image::DynamicImage> for Sample {
    type Error = Error;

    fn try_from(img: &image::DynamicImage) -> Result<Self, Error> {
        let channels = img.color().channel_count();
        let (width, height) = img.dimensions();

        // 16 bit and BGR variants are narrowed to 8 bit RGB(A) of the same shape
        let data: Vec<f32> = match ColorSpace::from_channel_count(channels)? {
            ColorSpace::Greyscale => to_values(img.to_luma().into_raw()),
            ColorSpace::Rgb => to_values(img.to_rgb().into_raw()),
            ColorSpace::Rgba => to_values(img.to_rgba().into_raw()),
        };

        Self::from_raw(width, height, channels, data)
    }
}

fn to_values(raw: Vec<u8>) -> Vec<f32> {
    raw.into_iter().map(f32::from).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let err = Sample::from_raw(3, 3, 3, vec![0.0; 26]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref ia) if ia.name() == "sample"));
    }

    #[test]
    fn rejects_tiny_sample() {
        assert!(matches!(
            Sample::from_raw(2, 5, 1, vec![0.0; 10]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_nan_values() {
        let mut data = vec![1.0; 9];
        data[4] = f32::NAN;
        assert!(matches!(
            Sample::from_raw(3, 3, 1, data),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for &bad in &[256.0, -1.0, 1e19, f32::INFINITY] {
            let mut data = vec![10.0; 16];
            data[5] = bad;
            assert!(
                matches!(
                    Sample::from_raw(4, 4, 1, data),
                    Err(Error::InvalidArgument(ref ia)) if ia.name() == "sample"
                ),
                "{} was accepted",
                bad
            );
        }

        let edges = (0..16).map(|i| if i % 2 == 0 { 0.0 } else { 255.0 }).collect();
        assert!(Sample::from_raw(4, 4, 1, edges).is_ok());
    }

    #[test]
    fn rejects_luma_alpha() {
        let img = image::DynamicImage::ImageLumaA8(image::ImageBuffer::new(4, 4));
        assert!(matches!(
            Sample::try_from(&img),
            Err(Error::UnsupportedFormat(2))
        ));
    }

    #[test]
    fn decodes_rgb_image() {
        let buf = image::RgbImage::from_fn(4, 3, |x, y| image::Rgb([x as u8, y as u8, 7]));
        let sample = Sample::try_from(&image::DynamicImage::ImageRgb8(buf)).unwrap();

        assert_eq!(sample.dims(), Dims::new(4, 3));
        assert_eq!(sample.color_space(), ColorSpace::Rgb);
        assert_eq!(sample.pixel(3, 2), &[3.0, 2.0, 7.0]);
    }

    #[test]
    fn pixel_indexing_is_row_major() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let sample = Sample::from_raw(4, 3, 1, data).unwrap();
        assert_eq!(sample.pixel(1, 2), &[9.0]);
    }
}
