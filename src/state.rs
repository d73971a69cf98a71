// Application state management
use parking_lot::Mutex;
use std::sync::Arc;

use crate::control::PlayButton;

pub struct AppState {
    pub button: Arc<Mutex<PlayButton>>,
}

impl AppState {
    pub fn new(button: PlayButton) -> Self {
        Self {
            button: Arc::new(Mutex::new(button)),
        }
    }
}
