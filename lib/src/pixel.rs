use crate::Error;

/// Alpha value given to pixels sourced from samples without an alpha channel
pub(crate) const OPAQUE: f32 = 255.0;

/// The color layout of a sample, and therefore of the texture grown from it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// A single value per pixel
    Greyscale,
    /// Red, green and blue
    Rgb,
    /// Red, green, blue and alpha
    Rgba,
}

impl ColorSpace {
    pub fn from_channel_count(channels: u8) -> Result<Self, Error> {
        match channels {
            1 => Ok(Self::Greyscale),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }

    #[inline]
    pub fn channel_count(self) -> usize {
        match self {
            Self::Greyscale => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// A single ARGB value on the canvas being grown.
///
/// The color is only meaningful once `is_filled` returns true. For greyscale
/// data the single value lives in the alpha slot.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pixel {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    filled: bool,
}

impl Pixel {
    /// Builds a filled pixel from the channel values of a sample pixel
    pub(crate) fn from_channels(channels: &[f32], space: ColorSpace) -> Self {
        match space {
            ColorSpace::Greyscale => Self {
                a: channels[0],
                filled: true,
                ..Self::default()
            },
            ColorSpace::Rgb => Self {
                a: OPAQUE,
                r: channels[0],
                g: channels[1],
                b: channels[2],
                filled: true,
            },
            ColorSpace::Rgba => Self {
                a: channels[3],
                r: channels[0],
                g: channels[1],
                b: channels[2],
                filled: true,
            },
        }
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    #[inline]
    pub fn greyscale(&self) -> f32 {
        self.a
    }

    #[inline]
    pub fn rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Copies every channel of `other` and marks this pixel as filled
    pub fn assign(&mut self, other: &Pixel) {
        self.a = other.a;
        self.r = other.r;
        self.g = other.g;
        self.b = other.b;
        self.filled = true;
    }

    /// Appends the channels relevant to `space` to `out`
    pub(crate) fn extend_channels(&self, space: ColorSpace, out: &mut Vec<f32>) {
        match space {
            ColorSpace::Greyscale => out.push(self.greyscale()),
            ColorSpace::Rgb => out.extend_from_slice(&self.rgb()),
            ColorSpace::Rgba => out.extend_from_slice(&self.rgba()),
        }
    }

    /// Squared color distance between this pixel and a raw sample pixel.
    /// Alpha only takes part for RGBA data.
    #[inline]
    pub(crate) fn squared_distance(&self, channels: &[f32], space: ColorSpace) -> f32 {
        #[inline]
        fn sq(x: f32) -> f32 {
            x * x
        }

        match space {
            ColorSpace::Greyscale => sq(self.a - channels[0]),
            ColorSpace::Rgb => {
                sq(self.r - channels[0]) + sq(self.g - channels[1]) + sq(self.b - channels[2])
            }
            ColorSpace::Rgba => {
                sq(self.r - channels[0])
                    + sq(self.g - channels[1])
                    + sq(self.b - channels[2])
                    + sq(self.a - channels[3])
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_unfilled_and_zeroed() {
        let px = Pixel::default();
        assert!(!px.is_filled());
        assert_eq!(px.rgba(), [0.0; 4]);
    }

    #[test]
    fn rgb_is_opaque() {
        let px = Pixel::from_channels(&[10.0, 20.0, 30.0], ColorSpace::Rgb);
        assert!(px.is_filled());
        assert_eq!(px.rgba(), [10.0, 20.0, 30.0, OPAQUE]);
    }

    #[test]
    fn greyscale_lives_in_alpha() {
        let px = Pixel::from_channels(&[42.0], ColorSpace::Greyscale);
        assert_eq!(px.greyscale(), 42.0);
        assert_eq!(px.a, 42.0);

        let mut out = Vec::new();
        px.extend_channels(ColorSpace::Greyscale, &mut out);
        assert_eq!(out, vec![42.0]);
    }

    #[test]
    fn assign_marks_filled() {
        let src = Pixel::from_channels(&[1.0, 2.0, 3.0, 4.0], ColorSpace::Rgba);
        let mut dst = Pixel::default();
        dst.assign(&src);
        assert_eq!(dst, src);
    }

    #[test]
    fn alpha_only_counts_for_rgba() {
        let px = Pixel::from_channels(&[0.0, 0.0, 0.0, 0.0], ColorSpace::Rgba);
        assert_eq!(px.squared_distance(&[1.0, 2.0, 0.0, 3.0], ColorSpace::Rgba), 14.0);

        let px = Pixel::from_channels(&[0.0, 0.0, 0.0], ColorSpace::Rgb);
        assert_eq!(px.squared_distance(&[1.0, 2.0, 0.0, 3.0], ColorSpace::Rgb), 5.0);
    }

    #[test]
    fn rejects_two_channels() {
        assert!(matches!(
            ColorSpace::from_channel_count(2),
            Err(Error::UnsupportedFormat(2))
        ));
        assert_eq!(ColorSpace::from_channel_count(4).unwrap().channel_count(), 4);
    }
}
