// Converts decoded samples to the output device's format
// Channel remapping, then rubato resampling when the rates differ

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use super::error::{PlayerError, Result};

const RESAMPLER_CHUNK_FRAMES: usize = 1024;

pub struct SampleConverter {
    in_channels: usize,
    out_channels: usize,
    ratio: f64,
    resampler: Option<FastFixedIn<f32>>,
    // Planar input waiting for a full resampler chunk
    pending: Vec<Vec<f32>>,
    frames_in: usize,
    frames_out: usize,
    skip_frames: usize,
}

impl SampleConverter {
    pub fn new(in_rate: u32, in_channels: usize, out_rate: u32, out_channels: usize) -> Result<Self> {
        if in_rate == 0 || out_rate == 0 {
            return Err(PlayerError::Resample(format!(
                "cannot convert {} Hz to {} Hz",
                in_rate, out_rate
            )));
        }

        let in_channels = in_channels.max(1);
        let out_channels = out_channels.max(1);
        let ratio = out_rate as f64 / in_rate as f64;

        let resampler = if in_rate == out_rate {
            None
        } else {
            let resampler = FastFixedIn::<f32>::new(
                ratio,
                1.0,
                PolynomialDegree::Cubic,
                RESAMPLER_CHUNK_FRAMES,
                out_channels,
            )
            .map_err(|e| PlayerError::Resample(e.to_string()))?;
            tracing::debug!("Resampling {} Hz -> {} Hz", in_rate, out_rate);
            Some(resampler)
        };

        let skip_frames = resampler.as_ref().map(|r| r.output_delay()).unwrap_or(0);

        Ok(Self {
            in_channels,
            out_channels,
            ratio,
            resampler,
            pending: vec![Vec::new(); out_channels],
            frames_in: 0,
            frames_out: 0,
            skip_frames,
        })
    }

    /// Convert a block of interleaved input samples
    ///
    /// The resampler works in fixed chunks, so the returned block may be
    /// shorter than the input. Call `flush` after the last block.
    pub fn process(&mut self, interleaved: &[f32]) -> Result<Vec<f32>> {
        let remapped = remap_channels(interleaved, self.in_channels, self.out_channels);

        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(remapped);
        };

        for frame in remapped.chunks_exact(self.out_channels) {
            for (ch, sample) in frame.iter().enumerate() {
                self.pending[ch].push(*sample);
            }
        }
        self.frames_in += remapped.len() / self.out_channels;

        let mut blocks = Vec::new();
        loop {
            let needed = resampler.input_frames_next();
            if self.pending[0].len() < needed {
                break;
            }

            let chunk: Vec<&[f32]> = self.pending.iter().map(|c| &c[..needed]).collect();
            blocks.push(
                resampler
                    .process(&chunk, None)
                    .map_err(|e| PlayerError::Resample(e.to_string()))?,
            );
            for channel in self.pending.iter_mut() {
                channel.drain(..needed);
            }
        }

        let mut out = Vec::new();
        for planar in &blocks {
            self.emit(planar, &mut out);
        }
        Ok(out)
    }

    /// Push any buffered input through the resampler
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let mut out = Vec::new();
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(out);
        };

        let mut tails = Vec::with_capacity(2);
        if !self.pending[0].is_empty() {
            tails.push(
                resampler
                    .process_partial(Some(self.pending.as_slice()), None)
                    .map_err(|e| PlayerError::Resample(e.to_string()))?,
            );
            for channel in self.pending.iter_mut() {
                channel.clear();
            }
        }
        tails.push(
            resampler
                .process_partial::<Vec<f32>>(None, None)
                .map_err(|e| PlayerError::Resample(e.to_string()))?,
        );

        for planar in &tails {
            self.emit(planar, &mut out);
        }
        Ok(out)
    }

    /// Interleave resampler output, dropping its start-up delay and any
    /// padding beyond the expected length
    fn emit(&mut self, planar: &[Vec<f32>], out: &mut Vec<f32>) {
        let expected = (self.frames_in as f64 * self.ratio).round() as usize;
        let frames = planar.first().map(|c| c.len()).unwrap_or(0);

        for frame in 0..frames {
            if self.skip_frames > 0 {
                self.skip_frames -= 1;
                continue;
            }
            if self.frames_out >= expected {
                break;
            }
            for channel in planar {
                out.push(channel[frame]);
            }
            self.frames_out += 1;
        }
    }
}

/// Map interleaved samples from one channel count to another
///
/// Down to mono averages every channel; otherwise output channel `i`
/// takes input channel `i % in_channels`.
pub fn remap_channels(samples: &[f32], in_channels: usize, out_channels: usize) -> Vec<f32> {
    if in_channels == out_channels {
        return samples.to_vec();
    }

    let frames = samples.len() / in_channels;
    let mut out = Vec::with_capacity(frames * out_channels);

    for frame in samples.chunks_exact(in_channels) {
        if out_channels == 1 {
            out.push(frame.iter().sum::<f32>() / in_channels as f32);
        } else {
            for ch in 0..out_channels {
                out.push(frame[ch % in_channels]);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo_duplicates() {
        assert_eq!(
            remap_channels(&[0.1, 0.2], 1, 2),
            vec![0.1, 0.1, 0.2, 0.2]
        );
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let out = remap_channels(&[0.2, 0.4, -1.0, 1.0], 2, 1);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
    }

    #[test]
    fn test_same_format_passes_through() {
        let mut converter = SampleConverter::new(48000, 2, 48000, 2).unwrap();
        let input = vec![0.5, -0.5, 0.25, -0.25];
        assert_eq!(converter.process(&input).unwrap(), input);
        assert!(converter.flush().unwrap().is_empty());
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(SampleConverter::new(8000, 1, 0, 1).is_err());
        assert!(SampleConverter::new(0, 1, 48000, 2).is_err());
    }

    #[test]
    fn test_resampling_preserves_duration() {
        let mut converter = SampleConverter::new(44100, 1, 48000, 2).unwrap();
        let input: Vec<f32> = (0..44100)
            .map(|i| (i as f32 / 44100.0 * 440.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();

        let mut out = Vec::new();
        for block in input.chunks(1152) {
            out.extend(converter.process(block).unwrap());
        }
        out.extend(converter.flush().unwrap());

        assert_eq!(out.len() % 2, 0);
        let frames = out.len() / 2;
        assert!((frames as i64 - 48000).abs() <= 2, "got {} frames", frames);
    }
}
