// A single play-through of the alert asset
//
// Each session decodes on its own thread and feeds the shared sink. Only
// the session named by the gate may write; the player swaps the gate to a
// new id when it replaces a session.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::convert::SampleConverter;
use super::decoder::AudioDecoder;
use super::error::{PlayerError, Result};
use super::output::AudioSink;

pub type SessionId = u64;

/// Called with the session id when a session plays to its end
pub type CompletionHandler = Arc<dyn Fn(SessionId) + Send + Sync>;

/// Names the one session allowed to write to the sink
pub type SessionGate = Arc<Mutex<Option<SessionId>>>;

const IDLE_POLL: Duration = Duration::from_millis(5);

#[derive(Default)]
struct SessionFlags {
    stopped: AtomicBool,
    paused: AtomicBool,
    finished: AtomicBool,
}

pub struct PlaybackSession {
    id: SessionId,
    flags: Arc<SessionFlags>,
}

struct SessionWorker {
    id: SessionId,
    flags: Arc<SessionFlags>,
    decoder: AudioDecoder,
    converter: SampleConverter,
    sink: Arc<dyn AudioSink>,
    gate: SessionGate,
    on_complete: Option<CompletionHandler>,
}

impl PlaybackSession {
    /// Spawn the decode thread; output starts immediately
    pub fn start(
        id: SessionId,
        decoder: AudioDecoder,
        sink: Arc<dyn AudioSink>,
        gate: SessionGate,
        on_complete: Option<CompletionHandler>,
    ) -> Result<Self> {
        let converter = SampleConverter::new(
            decoder.sample_rate(),
            decoder.channels(),
            sink.sample_rate(),
            sink.channels() as usize,
        )?;

        let flags = Arc::new(SessionFlags::default());
        let worker = SessionWorker {
            id,
            flags: flags.clone(),
            decoder,
            converter,
            sink,
            gate,
            on_complete,
        };

        thread::Builder::new()
            .name(format!("playback-session-{}", id))
            .spawn(move || worker.run())
            .map_err(PlayerError::Io)?;

        tracing::debug!("Session {} started", id);
        Ok(Self { id, flags })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_playing(&self) -> bool {
        !self.flags.stopped.load(Ordering::SeqCst)
            && !self.flags.paused.load(Ordering::SeqCst)
            && !self.flags.finished.load(Ordering::SeqCst)
    }

    /// Halt output for good; the worker exits. The caller holds the gate
    /// and clears the sink.
    pub(crate) fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop(&self) {
        self.flags.stopped.store(true, Ordering::SeqCst);
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        // The worker sees this on its next write or drain check and exits;
        // never joined
        self.stop();
    }
}

impl SessionWorker {
    fn run(mut self) {
        if !self.feed() || !self.wait_for_drain() {
            tracing::debug!("Session {} worker exiting", self.id);
            return;
        }

        {
            let gate = self.gate.lock();
            if *gate != Some(self.id) || self.is_stopped() || self.is_paused() {
                return;
            }
            if self.flags.finished.swap(true, Ordering::SeqCst) {
                return;
            }
        }

        tracing::debug!("Session {} finished", self.id);
        if let Some(handler) = &self.on_complete {
            handler(self.id);
        }
    }

    /// Decode the asset into the sink
    ///
    /// A decode or conversion failure partway through ends the run early,
    /// and what was already written still plays out and completes. Returns
    /// false once the session is stopped, paused or replaced.
    fn feed(&mut self) -> bool {
        loop {
            let samples = match self.decoder.decode_next() {
                Ok(Some(samples)) => samples,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Session {}: stopping decode early: {}", self.id, e);
                    break;
                }
            };

            match self.converter.process(&samples) {
                Ok(converted) => {
                    if !self.write_all(&converted) {
                        return false;
                    }
                }
                Err(e) => {
                    tracing::error!("Session {}: ending early: {}", self.id, e);
                    return true;
                }
            }
        }

        match self.converter.flush() {
            Ok(tail) => self.write_all(&tail),
            Err(e) => {
                tracing::warn!("Session {}: dropping resampler tail: {}", self.id, e);
                true
            }
        }
    }

    /// Returns false once the session has been stopped, paused or replaced
    fn write_all(&self, samples: &[f32]) -> bool {
        let mut remaining = samples;

        while !remaining.is_empty() {
            if self.is_stopped() || self.is_paused() {
                return false;
            }

            let written = {
                let gate = self.gate.lock();
                if *gate != Some(self.id) || self.is_paused() {
                    return false;
                }
                self.sink.write(remaining)
            };

            if written == 0 {
                // Sink full; wait for the output to catch up
                thread::sleep(IDLE_POLL);
            } else {
                remaining = &remaining[written..];
            }
        }

        true
    }

    /// Wait for the sink to play everything out
    fn wait_for_drain(&self) -> bool {
        loop {
            if self.is_stopped() || self.is_paused() {
                return false;
            }
            if self.sink.buffered() == 0 {
                return true;
            }
            thread::sleep(IDLE_POLL);
        }
    }

    fn is_stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }
}
