// The play/pause button: a two-state toggle over the alert player
use serde::Serialize;

use crate::audio::{AlertPlayer, PlayerError, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonIcon {
    #[serde(rename = "play.circle")]
    Play,
    #[serde(rename = "pause.circle")]
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub is_playing: bool,
    pub icon: ButtonIcon,
}

pub struct PlayButton {
    player: AlertPlayer,
    is_playing: bool,
}

impl PlayButton {
    pub fn new(player: AlertPlayer) -> Self {
        Self {
            player,
            is_playing: false,
        }
    }

    /// Register the action to run once playback has completed
    ///
    /// The action gets the finished session's id and should hand it to
    /// `playback_did_finish`.
    pub fn on_playback_finished<F>(&mut self, action: F)
    where
        F: Fn(SessionId) + Send + Sync + 'static,
    {
        self.player.set_completion_handler(action);
    }

    /// Pause when playing, play when idle
    pub fn press(&mut self) -> Result<ButtonState, PlayerError> {
        tracing::debug!(
            "Button pressed (showing {:?}, session {:?}, output playing: {})",
            self.icon(),
            self.player.current_session(),
            self.player.is_playing()
        );
        if self.is_playing {
            self.pause();
        } else {
            self.play()?;
        }
        Ok(self.state())
    }

    /// Start the alert from the beginning, restarting it if already playing
    pub fn play(&mut self) -> Result<(), PlayerError> {
        match self.player.play_alert() {
            Ok(_) => {
                self.is_playing = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Unable to play alert: {}", e);
                self.is_playing = false;
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        self.player.pause_alert();
    }

    /// Returns true when the button flipped back to idle
    pub fn playback_did_finish(&mut self, session: SessionId) -> bool {
        if !self.is_playing || self.player.current_session() != Some(session) {
            tracing::debug!("Ignoring completion of session {}", session);
            return false;
        }
        self.is_playing = false;
        true
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn icon(&self) -> ButtonIcon {
        if self.is_playing() {
            ButtonIcon::Pause
        } else {
            ButtonIcon::Play
        }
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            is_playing: self.is_playing(),
            icon: self.icon(),
        }
    }

    #[cfg(test)]
    pub fn player(&self) -> &AlertPlayer {
        &self.player
    }
}
