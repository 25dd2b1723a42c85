mod progress;

use structopt::StructOpt;

use std::path::{Path, PathBuf};
use texture_growth::{
    image::ImageOutputFormat as ImgFmt, Dims, EfrosLeung, EfrosLeungBuilder, Error,
    GeneratorProgress, Sample, TextureSynthesizer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_size(input: &str) -> Result<Dims, std::num::ParseIntError> {
    let mut i = input.splitn(2, |c| c == 'x' || c == 'X');

    let x: u32 = i.next().unwrap_or("").parse()?;
    let y: u32 = match i.next() {
        Some(num) => num.parse()?,
        None => x,
    };
    Ok(Dims::new(x, y))
}

fn parse_img_fmt(input: &str) -> Result<ImgFmt, String> {
    let fmt = match input {
        "png" => ImgFmt::Png,
        "jpg" => ImgFmt::Jpeg(75),
        "bmp" => ImgFmt::Bmp,
        other => {
            return Err(format!(
                "image format `{}` not one of: 'png', 'jpg', 'bmp'",
                other
            ))
        }
    };

    Ok(fmt)
}

/// The algorithms that can be selected with `--method` and how to start
/// building each, the first one is the default
const METHODS: &[(&str, fn() -> EfrosLeungBuilder)] = &[("efros-leung", EfrosLeung::builder)];

/// Finds the algorithm registered under `name`, falling back to the default
/// for unknown names
fn lookup_method(name: &str) -> (&'static str, fn() -> EfrosLeungBuilder) {
    METHODS
        .iter()
        .copied()
        .find(|(registered, _)| *registered == name)
        .unwrap_or_else(|| {
            tracing::warn!(
                method = name,
                fallback = METHODS[0].0,
                "unknown synthesis method, using the default"
            );
            METHODS[0]
        })
}

#[derive(StructOpt)]
#[structopt(
    name = "texture-growth",
    about = "Grows new textures from a sample image",
    rename_all = "kebab-case"
)]
struct Opt {
    /// Path to the sample image the texture is grown from
    #[structopt(parse(from_os_str), required_unless = "list-methods")]
    input: Option<PathBuf>,
    /// The width and height of the neighborhood compared against the sample,
    /// larger numbers capture larger structures. Must be odd.
    #[structopt(default_value = "3")]
    diameter: u32,
    /// Size of the generated image, in `width x height`, or a single number for both dimensions
    #[structopt(default_value = "64", parse(try_from_str = parse_size))]
    out_size: Dims,
    /// The synthesis algorithm to use, see `--list-methods`
    #[structopt(long, default_value = "efros-leung")]
    method: String,
    /// Prints the available synthesis algorithms and exits
    #[structopt(long)]
    list_methods: bool,
    /// The path to save the generated image to, the file extension of the path determines
    /// the image format used. You may use `-` for stdout. Defaults to `output` with the
    /// extension of the input image.
    #[structopt(long = "out", short, parse(from_os_str))]
    output_path: Option<PathBuf>,
    /// The format to save the generated image as.
    ///
    /// NOTE: this will only apply when stdout is specified via `-o -`, otherwise the image
    /// format is determined by the file extension of the path provided to `-o`
    #[structopt(
        long,
        default_value = "png",
        parse(try_from_str = parse_img_fmt)
    )]
    out_fmt: ImgFmt,
    /// A seed value for the random generator, the same seed with the same
    /// inputs always grows the same texture
    #[structopt(long)]
    seed: Option<u64>,
    /// The maximum number of worker threads that can be active at any one time
    /// while scoring the sample. Defaults to the logical core count.
    #[structopt(short = "t", long = "threads")]
    max_threads: Option<usize>,
    /// The fraction above the best match score that still counts as a match
    #[structopt(long, default_value = "0.2")]
    tolerance: f32,
    /// Gives up after this many sweeps over the unfilled border. Defaults to
    /// the number of output pixels.
    #[structopt(long)]
    max_sweeps: Option<u32>,
    /// Don't show progress bars
    #[structopt(long)]
    no_progress: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "texture_growth=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = real_main() {
        if atty::is(atty::Stream::Stderr) {
            eprintln!("\x1b[31merror\x1b[0m: {}", e);
        } else {
            eprintln!("error: {}", e);
        }

        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Error> {
    let args = Opt::from_args();

    if args.list_methods {
        for (name, new_builder) in METHODS {
            let synth = new_builder().diameter(args.diameter).build()?;
            println!("{}\n    {}", name, synth.description());
        }
        return Ok(());
    }

    let input = match args.input {
        Some(ref input) => input,
        None => return Ok(()),
    };

    let output_path = match args.output_path {
        Some(ref path) => path.clone(),
        None => default_output_path(input),
    };

    // Check that the extension for the path supplied by the user is one of the ones we support
    if output_path.to_str() != Some("-") {
        match output_path.extension().and_then(|ext| ext.to_str()) {
            Some("png") | Some("jpg") | Some("bmp") => {}
            None => {}
            Some(other) => return Err(Error::UnsupportedOutputFormat(other.to_owned())),
        }
    }

    let sample = Sample::load(input)?;

    let (method, new_builder) = lookup_method(&args.method);
    tracing::debug!(method, "selected synthesis method");

    let mut sb = new_builder()
        .diameter(args.diameter)
        .error_tolerance(args.tolerance)
        .seed(args.seed.unwrap_or_default());

    if let Some(mt) = args.max_threads {
        sb = sb.max_thread_count(mt);
    }

    if let Some(sweeps) = args.max_sweeps {
        sb = sb.max_sweeps(sweeps);
    }

    let mut synth = sb.build()?;

    let progress: Option<Box<dyn GeneratorProgress>> = if !args.no_progress {
        Some(Box::new(progress::ProgressReport::new()))
    } else {
        None
    };

    let generated = synth.run(&sample, args.out_size, progress, None)?;

    if output_path.to_str() == Some("-") {
        let out = std::io::stdout();
        let mut out = out.lock();
        generated.write(&mut out, args.out_fmt)?;
    } else {
        generated.save(&output_path)?;
    }

    Ok(())
}

/// `output` with the same extension as the input image
fn default_output_path(input: &Path) -> PathBuf {
    let mut path = PathBuf::from("output");
    if let Some(ext) = input.extension() {
        path.set_extension(ext);
    }
    path
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("32").unwrap(), Dims::square(32));
        assert_eq!(parse_size("40x20").unwrap(), Dims::new(40, 20));
        assert_eq!(parse_size("40X20").unwrap(), Dims::new(40, 20));
        assert!(parse_size("x20").is_err());
        assert!(parse_size("big").is_err());
    }

    #[test]
    fn output_follows_input_extension() {
        assert_eq!(
            default_output_path(Path::new("imgs/bricks.jpg")),
            PathBuf::from("output.jpg")
        );
        assert_eq!(default_output_path(Path::new("sample")), PathBuf::from("output"));
    }

    #[test]
    fn methods_resolve_by_name() {
        let (name, new_builder) = lookup_method("efros-leung");
        assert_eq!(name, "efros-leung");
        assert_eq!(new_builder().diameter(5).build().unwrap().diameter(), 5);

        assert_eq!(lookup_method("wave-function-collapse").0, METHODS[0].0);
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(parse_img_fmt("png").is_ok());
        assert!(parse_img_fmt("gif").is_err());
    }
}
