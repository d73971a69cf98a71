// Audio output using cpal
// Handles cross-platform audio output with a ring buffer

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use super::error::{PlayerError, Result};

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

/// Somewhere sessions can write interleaved samples in the sink's own format
pub trait AudioSink: Send + Sync {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;

    /// Write as many samples as fit, returning how many were taken
    fn write(&self, samples: &[f32]) -> usize;

    /// Samples written but not yet played
    fn buffered(&self) -> usize;

    /// Drop everything not yet played
    fn clear(&self);

    fn set_volume(&self, volume: f32);
}

// Running totals, counted in samples since the ring was created
#[derive(Default)]
struct RingCounters {
    written: AtomicU64,
    consumed: AtomicU64,
    // Everything written before this mark is stale
    discard_until: AtomicU64,
}

/// Producer half of the output ring
pub(crate) struct RingWriter {
    producer: RingProducer,
    counters: Arc<RingCounters>,
}

/// Consumer half of the output ring, owned by the audio callback
pub(crate) struct RingReader {
    consumer: RingConsumer,
    counters: Arc<RingCounters>,
}

pub(crate) fn sample_ring(capacity: usize) -> (RingWriter, RingReader) {
    let (producer, consumer) = HeapRb::<f32>::new(capacity.max(1)).split();
    let counters = Arc::new(RingCounters::default());

    (
        RingWriter {
            producer,
            counters: counters.clone(),
        },
        RingReader { consumer, counters },
    )
}

impl RingWriter {
    pub fn write(&mut self, samples: &[f32]) -> usize {
        let n = self.producer.push_slice(samples);
        self.counters.written.fetch_add(n as u64, Ordering::SeqCst);
        n
    }

    pub fn buffered(&self) -> usize {
        let written = self.counters.written.load(Ordering::SeqCst);
        let consumed = self.counters.consumed.load(Ordering::SeqCst);
        written.saturating_sub(consumed) as usize
    }

    /// Mark everything written so far as stale
    ///
    /// The reader drops exactly those samples on its next read; anything
    /// written after this call is kept.
    pub fn clear(&self) {
        let written = self.counters.written.load(Ordering::SeqCst);
        self.counters.discard_until.store(written, Ordering::SeqCst);
    }
}

impl RingReader {
    /// Skip samples written before the last clear
    pub fn discard_stale(&mut self) {
        let discard_until = self.counters.discard_until.load(Ordering::SeqCst);
        let mut consumed = self.counters.consumed.load(Ordering::SeqCst);

        while consumed < discard_until && self.consumer.try_pop().is_some() {
            consumed += 1;
        }
        self.counters.consumed.store(consumed, Ordering::SeqCst);
    }

    /// Next sample, or silence when the ring is empty
    pub fn pop(&mut self) -> f32 {
        match self.consumer.try_pop() {
            Some(sample) => {
                self.counters.consumed.fetch_add(1, Ordering::SeqCst);
                sample
            }
            None => 0.0,
        }
    }
}

pub struct AudioOutput {
    writer: Mutex<RingWriter>,
    sample_rate: u32,
    channels: u16,
    volume: Arc<Mutex<f32>>,
    // Dropping this ends the thread that owns the cpal stream
    _shutdown: mpsc::Sender<()>,
}

struct OpenedStream {
    writer: RingWriter,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default output device with a ring buffer of `buffer_ms`
    ///
    /// cpal streams are not `Send`, so the stream lives on its own thread
    /// and only the writer half of the ring buffer is handed back.
    pub fn new(buffer_ms: u32) -> Result<Self> {
        let volume = Arc::new(Mutex::new(1.0f32));

        let (ready_tx, ready_rx) = mpsc::channel::<Result<OpenedStream>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_volume = volume.clone();
        thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || match Self::open_stream(buffer_ms, thread_volume) {
                Ok((stream, opened)) => {
                    if ready_tx.send(Ok(opened)).is_err() {
                        return;
                    }
                    // Blocks until the AudioOutput is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let opened = ready_rx
            .recv()
            .map_err(|_| PlayerError::Output("audio output thread exited".into()))??;

        Ok(Self {
            writer: Mutex::new(opened.writer),
            sample_rate: opened.sample_rate,
            channels: opened.channels,
            volume,
            _shutdown: shutdown_tx,
        })
    }

    fn open_stream(buffer_ms: u32, volume: Arc<Mutex<f32>>) -> Result<(Stream, OpenedStream)> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| PlayerError::Output("no output device available".into()))?;

        let config = device.default_output_config().map_err(|e| {
            PlayerError::Output(format!("failed to get default output config: {}", e))
        })?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let capacity =
            sample_rate as usize * channels as usize * buffer_ms.max(10) as usize / 1000;
        let (writer, reader) = sample_ring(capacity);

        let stream_config: StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &stream_config, reader, volume)?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &stream_config, reader, volume)?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &stream_config, reader, volume)?
            }
            format => {
                return Err(PlayerError::Output(format!(
                    "unsupported sample format: {:?}",
                    format
                )))
            }
        };

        stream
            .play()
            .map_err(|e| PlayerError::Output(format!("failed to start stream: {}", e)))?;

        tracing::info!(
            "Audio output opened: {} Hz, {} channels, {} sample buffer",
            sample_rate,
            channels,
            capacity
        );

        Ok((
            stream,
            OpenedStream {
                writer,
                sample_rate,
                channels,
            },
        ))
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut reader: RingReader,
        volume: Arc<Mutex<f32>>,
    ) -> Result<Stream> {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let vol = *volume.lock();

                    reader.discard_stale();
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(reader.pop() * vol);
                    }
                },
                move |err| {
                    tracing::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| PlayerError::Output(format!("failed to build output stream: {}", e)))
    }
}

impl AudioSink for AudioOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn write(&self, samples: &[f32]) -> usize {
        self.writer.lock().write(samples)
    }

    fn buffered(&self) -> usize {
        self.writer.lock().buffered()
    }

    fn clear(&self) {
        self.writer.lock().clear();
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume.clamp(0.0, 1.0);
    }
}
