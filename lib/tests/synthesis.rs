use texture_growth as tg;
use tg::{ColorSpace, Dims, EfrosLeung, Sample, TextureSynthesizer};

/// Alternating 0/255 greyscale sample
fn checkerboard(width: u32, height: u32) -> Sample {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| if (x + y) % 2 == 0 { 0.0 } else { 255.0 }))
        .collect();
    Sample::from_raw(width, height, 1, data).unwrap()
}

/// Channel `c` of pixel `i` is `(i * 7 + c * 50) % 256`, so no two of the
/// first 256 pixels share a color
fn distinct(width: u32, height: u32, channels: u8) -> Sample {
    let data = (0..width * height)
        .flat_map(|i| (0..u32::from(channels)).map(move |c| ((i * 7 + c * 50) % 256) as f32))
        .collect();
    Sample::from_raw(width, height, channels, data).unwrap()
}

fn sample_pixels(sample: &Sample) -> Vec<Vec<f32>> {
    let dims = sample.dims();
    (0..dims.height)
        .flat_map(|y| (0..dims.width).map(move |x| (x, y)))
        .map(|(x, y)| sample.pixel(x, y).to_vec())
        .collect()
}

#[test]
fn checkerboard_only_yields_its_two_values() {
    let sample = checkerboard(4, 4);
    let mut synth = EfrosLeung::builder().diameter(3).seed(1).build().unwrap();

    let tex = synth.generate_texture(&sample, Dims::square(5)).unwrap();

    assert_eq!(tex.dims(), Dims::square(5));
    assert_eq!(tex.color_space(), ColorSpace::Greyscale);
    assert_eq!(tex.as_raw().len(), 25);
    assert!(tex.as_raw().iter().all(|&v| v == 0.0 || v == 255.0));
}

#[test]
fn fills_every_requested_size() {
    let sample = distinct(6, 5, 1);

    for &(w, h) in &[(3, 3), (3, 8), (7, 4), (10, 10), (13, 6)] {
        let mut synth = EfrosLeung::builder().seed(u64::from(w * h)).build().unwrap();
        let tex = synth.generate_texture(&sample, Dims::new(w, h)).unwrap();

        assert_eq!(tex.dims(), Dims::new(w, h));
        assert_eq!(tex.as_raw().len(), (w * h) as usize);
    }
}

#[test]
fn every_output_pixel_comes_from_the_sample() {
    for &channels in &[1u8, 3, 4] {
        let sample = distinct(7, 6, channels);
        let palette = sample_pixels(&sample);

        let mut synth = EfrosLeung::builder().diameter(5).seed(9).build().unwrap();
        let tex = synth.generate_texture(&sample, Dims::new(11, 9)).unwrap();

        assert_eq!(tex.color_space().channel_count(), channels as usize);
        for y in 0..9 {
            for x in 0..11 {
                let px = tex.pixel(x, y).to_vec();
                assert!(
                    palette.contains(&px),
                    "{} channel(s): ({}, {}) = {:?} is not a sample pixel",
                    channels,
                    x,
                    y,
                    px
                );
            }
        }
    }
}

fn block<F: Fn(u32, u32) -> Vec<f32>>(get: F, ox: u32, oy: u32) -> Vec<Vec<f32>> {
    (0..3)
        .flat_map(|dy| (0..3).map(move |dx| (dx, dy)))
        .map(|(dx, dy)| get(ox + dx, oy + dy))
        .collect()
}

#[test]
fn seed_block_is_copied_from_the_sample() {
    let sample = distinct(8, 7, 3);
    let mut synth = EfrosLeung::builder().seed(77).build().unwrap();
    let tex = synth.generate_texture(&sample, Dims::new(9, 12)).unwrap();

    // 9 / 2 - 1, 12 / 2 - 1
    let seeded = block(|x, y| tex.pixel(x, y).to_vec(), 3, 5);

    let found = (0..=4).any(|sy| {
        (0..=5).any(|sx| block(|x, y| sample.pixel(x, y).to_vec(), sx, sy) == seeded)
    });
    assert!(found, "seed block {:?} is not a 3x3 block of the sample", seeded);
}

#[test]
fn same_seed_is_reproducible_across_thread_counts() {
    let sample = distinct(40, 40, 3);

    let run = |threads: usize| {
        EfrosLeung::builder()
            .diameter(5)
            .seed(120)
            .max_thread_count(threads)
            .build()
            .unwrap()
            .generate_texture(&sample, Dims::square(12))
            .unwrap()
    };

    let single = run(1);
    assert_eq!(single.as_raw(), run(1).as_raw());
    assert_eq!(single.as_raw(), run(4).as_raw());
}

#[test]
fn tolerance_is_kept_while_every_pixel_matches() {
    let sample = checkerboard(5, 5);
    let mut synth = EfrosLeung::builder()
        .seed(3)
        .error_tolerance(0.35)
        .build()
        .unwrap();

    for size in 3..8 {
        synth.generate_texture(&sample, Dims::square(size)).unwrap();
        assert_eq!(synth.error_tolerance(), 0.35);
    }
}

#[test]
fn extreme_sample_values_are_rejected_up_front() {
    let huge = (0..16).map(|i| i as f32 * 1e19).collect();
    assert!(matches!(
        Sample::from_raw(4, 4, 1, huge),
        Err(tg::Error::InvalidArgument(ref ia)) if ia.name() == "sample"
    ));

    let negative = (0..16).map(|i| -(i as f32)).collect();
    assert!(matches!(
        Sample::from_raw(4, 4, 1, negative),
        Err(tg::Error::InvalidArgument(_))
    ));
}

#[test]
fn oversized_diameter_is_rejected_before_allocating() {
    assert!(matches!(
        EfrosLeung::new(65_537),
        Err(tg::Error::InvalidArgument(ref ia)) if ia.name() == "diameter"
    ));
}

#[test]
fn diameter_must_be_odd() {
    assert!(matches!(
        EfrosLeung::new(4),
        Err(tg::Error::InvalidArgument(_))
    ));
    assert!(EfrosLeung::new(3).is_ok());
}

#[test]
fn algorithms_are_usable_as_trait_objects() {
    let sample = checkerboard(4, 4);
    let mut algorithms: Vec<Box<dyn TextureSynthesizer>> = vec![
        Box::new(EfrosLeung::new(1).unwrap()),
        Box::new(EfrosLeung::new(3).unwrap()),
    ];

    for algo in &mut algorithms {
        assert!(!algo.description().is_empty());
        let tex = algo.generate_texture(&sample, Dims::square(4)).unwrap();
        assert_eq!(tex.dims(), Dims::square(4));
    }
}

#[test]
fn loads_samples_from_encoded_images() {
    let img = tg::image::RgbaImage::from_fn(5, 4, |x, y| {
        tg::image::Rgba([(x * 40) as u8, (y * 60) as u8, 10, 200])
    });
    let mut png = Vec::new();
    tg::image::DynamicImage::ImageRgba8(img)
        .write_to(&mut png, tg::image::ImageOutputFormat::Png)
        .unwrap();

    let sample = Sample::load(tg::ImageSource::Memory(&png)).unwrap();
    assert_eq!(sample.dims(), Dims::new(5, 4));
    assert_eq!(sample.color_space(), ColorSpace::Rgba);
    assert_eq!(sample.pixel(2, 3), &[80.0, 180.0, 10.0, 200.0]);

    let tex = EfrosLeung::new(3)
        .unwrap()
        .generate_texture(&sample, Dims::square(6))
        .unwrap();
    let out = tex.into_image();
    assert_eq!(out.color(), tg::image::ColorType::Rgba8);
}

#[test]
fn rejects_unsupported_channel_counts() {
    assert!(matches!(
        Sample::from_raw(3, 3, 2, vec![0.0; 18]),
        Err(tg::Error::UnsupportedFormat(2))
    ));
}
