// Helpers shared by the audio tests
use parking_lot::Mutex;

use super::asset::AlertAsset;
use super::output::AudioSink;

/// Build a 16-bit PCM WAV asset holding a quiet sine tone
pub fn wav_asset(sample_rate: u32, channels: u16, frames: usize) -> AlertAsset {
    let data_len = (frames * channels as usize * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
    bytes.extend_from_slice(&(channels * 2).to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());

    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let value = ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16;
        for _ in 0..channels {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    AlertAsset::from_bytes("alert.wav", bytes)
}

/// An output that keeps samples in memory until the test drains them
pub struct MemorySink {
    sample_rate: u32,
    channels: u16,
    capacity: usize,
    buffer: Mutex<Vec<f32>>,
    written: Mutex<usize>,
    clears: Mutex<usize>,
}

impl MemorySink {
    pub fn new(sample_rate: u32, channels: u16, capacity: usize) -> Self {
        Self {
            sample_rate,
            channels,
            capacity,
            buffer: Mutex::new(Vec::new()),
            written: Mutex::new(0),
            clears: Mutex::new(0),
        }
    }

    /// Play back everything currently buffered
    pub fn drain(&self) -> usize {
        let mut buffer = self.buffer.lock();
        let n = buffer.len();
        buffer.clear();
        n
    }

    /// Samples currently buffered, oldest first
    pub fn snapshot(&self) -> Vec<f32> {
        self.buffer.lock().clone()
    }

    /// Total samples ever accepted
    pub fn written(&self) -> usize {
        *self.written.lock()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock()
    }
}

impl AudioSink for MemorySink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn write(&self, samples: &[f32]) -> usize {
        let mut buffer = self.buffer.lock();
        let n = samples.len().min(self.capacity - buffer.len());
        buffer.extend_from_slice(&samples[..n]);
        *self.written.lock() += n;
        n
    }

    fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }

    fn clear(&self) {
        self.buffer.lock().clear();
        *self.clears.lock() += 1;
    }

    fn set_volume(&self, _volume: f32) {}
}

/// Poll `cond` until it holds or a second passes
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(1);
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    cond()
}
