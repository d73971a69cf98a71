// Alert player: owns the asset and the output, one session at a time
use parking_lot::Mutex;
use std::sync::Arc;

use super::asset::AlertAsset;
use super::decoder::AudioDecoder;
use super::error::Result;
use super::output::AudioSink;
use super::session::{CompletionHandler, PlaybackSession, SessionGate, SessionId};

pub struct AlertPlayer {
    asset: AlertAsset,
    sink: Arc<dyn AudioSink>,
    gate: SessionGate,
    session: Option<PlaybackSession>,
    next_id: SessionId,
    completion_handler: Option<CompletionHandler>,
}

impl AlertPlayer {
    /// Probes the asset once so a missing or corrupt file fails here
    /// rather than on the first press
    pub fn new(asset: AlertAsset, sink: Arc<dyn AudioSink>) -> Result<Self> {
        let decoder = AudioDecoder::open(&asset)?;
        tracing::info!(
            "Alert asset {:?}: {} Hz, {} channels, {:?} ms",
            asset.name(),
            decoder.sample_rate(),
            decoder.channels(),
            decoder.duration_ms()
        );

        Ok(Self {
            asset,
            sink,
            gate: Arc::new(Mutex::new(None)),
            session: None,
            next_id: 0,
            completion_handler: None,
        })
    }

    /// Set the closure run when a session plays to its end
    ///
    /// Applies to sessions started after this call. The closure runs on
    /// the session's thread.
    pub fn set_completion_handler<F>(&mut self, handler: F)
    where
        F: Fn(SessionId) + Send + Sync + 'static,
    {
        self.completion_handler = Some(Arc::new(handler));
    }

    /// Replace any current session with a fresh one from the start
    pub fn play_alert(&mut self) -> Result<SessionId> {
        if let Some(old) = self.session.take() {
            tracing::debug!("Replacing session {}", old.id());
            old.stop();
        }

        let decoder = match AudioDecoder::open(&self.asset) {
            Ok(decoder) => decoder,
            Err(e) => {
                *self.gate.lock() = None;
                self.sink.clear();
                return Err(e);
            }
        };

        self.next_id += 1;
        let id = self.next_id;
        {
            let mut gate = self.gate.lock();
            *gate = Some(id);
            self.sink.clear();
        }

        match PlaybackSession::start(
            id,
            decoder,
            self.sink.clone(),
            self.gate.clone(),
            self.completion_handler.clone(),
        ) {
            Ok(session) => {
                self.session = Some(session);
                tracing::info!("Playing alert (session {})", id);
                Ok(id)
            }
            Err(e) => {
                *self.gate.lock() = None;
                Err(e)
            }
        }
    }

    /// Pause output; does nothing unless a session is playing
    pub fn pause_alert(&mut self) {
        let Some(session) = self.session.as_ref().filter(|s| s.is_playing()) else {
            return;
        };

        let _gate = self.gate.lock();
        session.pause();
        self.sink.clear();
        tracing::info!("Paused alert (session {})", session.id());
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing())
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }
}

impl Drop for AlertPlayer {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let mut gate = self.gate.lock();
            *gate = None;
            session.stop();
            self.sink.clear();
        }
    }
}
