use indicatif::{ProgressBar, ProgressStyle};
use texture_growth::{GeneratorProgress, ProgressUpdate};

/// Renders synthesis progress as a bar of filled pixels, with the current
/// sweep and error tolerance as the message
pub struct ProgressReport {
    pixels_pb: ProgressBar,
    total_len: usize,
}

impl ProgressReport {
    pub fn new() -> Self {
        let sty = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {percent}% {msg}")
            .progress_chars("##-");

        let pixels_pb = ProgressBar::new(100);
        pixels_pb.set_style(sty);

        Self {
            pixels_pb,
            total_len: 100,
        }
    }
}

impl Drop for ProgressReport {
    fn drop(&mut self) {
        self.pixels_pb.finish();
    }
}

impl GeneratorProgress for ProgressReport {
    fn update(&mut self, update: ProgressUpdate) {
        if update.pixels.total != self.total_len {
            self.total_len = update.pixels.total;
            self.pixels_pb.set_length(self.total_len as u64);
        }

        self.pixels_pb.set_position(update.pixels.current as u64);
        self.pixels_pb.set_message(&format!(
            "sweep {} tolerance {:.3}",
            update.sweep, update.error_tolerance
        ));
    }
}
