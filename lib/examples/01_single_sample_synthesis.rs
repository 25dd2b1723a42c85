use texture_growth::{Dims, EfrosLeung, Sample, TextureSynthesizer};

fn main() -> Result<(), texture_growth::Error> {
    // load the sample given on the command line, or fall back to a woven
    // pattern built in memory
    let sample = match std::env::args().nth(1) {
        Some(path) => Sample::load(&path)?,
        None => {
            let data = (0..16u32)
                .flat_map(|y| {
                    (0..16u32).flat_map(move |x| {
                        let warp = (x / 2 + y / 4) % 2 == 0;
                        if warp {
                            vec![180.0, 140.0, 90.0]
                        } else {
                            vec![90.0, 60.0, 40.0]
                        }
                    })
                })
                .collect();
            Sample::from_raw(16, 16, 3, data)?
        }
    };

    //create a new synthesizer comparing 5x5 neighborhoods
    let mut synth = EfrosLeung::builder().diameter(5).seed(7).build()?;

    //grow a texture
    let texture = synth.generate_texture(&sample, Dims::new(48, 32))?;

    //save the texture to the disk
    texture.save("out/01.png")
}
