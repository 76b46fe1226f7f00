/// Walks interleaved decoded chunks frame by frame at the output device's rate.
///
/// Resampling is nearest-neighbour: each output frame picks the closest source
/// frame, so a 44.1 kHz source on a 48 kHz device repeats roughly one frame in eleven.
#[cfg_attr(not(feature = "cpal-backend"), allow(dead_code))]
pub(crate) struct FrameCursor {
    channels: usize,
    step: f64,
    pos: f64,
    chunk: Vec<f32>,
}

#[cfg_attr(not(feature = "cpal-backend"), allow(dead_code))]
impl FrameCursor {
    pub(crate) fn new(channels: usize, source_rate: u32, output_rate: u32) -> Self {
        Self {
            channels: channels.max(1),
            step: f64::from(source_rate.max(1)) / f64::from(output_rate.max(1)),
            pos: 0.0,
            chunk: Vec::new(),
        }
    }

    /// Next source frame, pulling chunks from `refill` as the current one runs out.
    /// Returns `None` when `refill` has nothing; a later call retries.
    pub(crate) fn next_frame(
        &mut self,
        mut refill: impl FnMut() -> Option<Vec<f32>>,
    ) -> Option<&[f32]> {
        let start = loop {
            let frames = self.chunk.len() / self.channels;
            let idx = self.pos as usize;
            if idx < frames {
                self.pos += self.step;
                break idx * self.channels;
            }
            let next = refill()?;
            self.pos -= frames as f64;
            self.chunk = next;
        };
        Some(&self.chunk[start..start + self.channels])
    }

    /// Copies one source frame into an output frame with `out.len()` channels.
    pub(crate) fn spread(source: &[f32], out: &mut [f32]) {
        for (ch, sample) in out.iter_mut().enumerate() {
            *sample = source[ch % source.len()];
        }
    }
}
