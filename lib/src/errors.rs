use std::fmt;

#[derive(Debug)]
pub struct InvalidArgument {
    pub(crate) name: &'static str,
    pub(crate) reason: String,
}

impl InvalidArgument {
    pub(crate) fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }

    /// The name of the offending parameter
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter '{}' - {}", self.name, self.reason)
    }
}

#[derive(Debug)]
pub enum Error {
    /// An error in the image library occurred, eg failed to load/save
    Image(image::ImageError),
    /// A construction or call parameter was out of its valid domain, eg an
    /// even texton diameter or an output smaller than 3x3
    InvalidArgument(InvalidArgument),
    /// The sample has a channel count other than 1 (greyscale), 3 (RGB) or
    /// 4 (RGBA)
    UnsupportedFormat(u8),
    /// The fill loop ran out of sweeps, or the error tolerance grew past its
    /// ceiling, before every pixel was filled
    SynthesisTimeout { sweeps: u32, error_tolerance: f32 },
    /// The caller cancelled the synthesis through a `CancelToken`
    Cancelled,
    /// Io is notoriously error free with no problems, but we cover it just in case!
    Io(std::io::Error),
    /// The user specified an image format we don't support as the output
    UnsupportedOutputFormat(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(ie) => write!(f, "{}", ie),
            Self::InvalidArgument(ia) => write!(f, "{}", ia),
            Self::UnsupportedFormat(channels) => write!(
                f,
                "images with {} channel(s) are not supported, expected 1, 3 or 4",
                channels
            ),
            Self::SynthesisTimeout {
                sweeps,
                error_tolerance,
            } => write!(
                f,
                "synthesis did not complete after {} sweeps (error tolerance reached {})",
                sweeps, error_tolerance
            ),
            Self::Cancelled => write!(f, "synthesis was cancelled"),
            Self::Io(io) => write!(f, "{}", io),
            Self::UnsupportedOutputFormat(fmt) => {
                write!(f, "the output format '{}' is not supported", fmt)
            }
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(ie: image::ImageError) -> Self {
        Self::Image(ie)
    }
}

impl From<std::io::Error> for Error {
    fn from(io: std::io::Error) -> Self {
        Self::Io(io)
    }
}

impl From<InvalidArgument> for Error {
    fn from(ia: InvalidArgument) -> Self {
        Self::InvalidArgument(ia)
    }
}
