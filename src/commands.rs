// Tauri command handlers
use tauri::{AppHandle, Emitter, State};

use crate::control::ButtonState;
use crate::state::AppState;

/// Emitted whenever the button changes state, including on completion
pub const PLAYBACK_STATE_EVENT: &str = "playback-state";

pub fn emit_state(app: &AppHandle, state: ButtonState) {
    if let Err(e) = app.emit(PLAYBACK_STATE_EVENT, state) {
        tracing::warn!("Failed to emit {}: {}", PLAYBACK_STATE_EVENT, e);
    }
}

#[tauri::command]
pub fn press_play_button(
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<ButtonState, String> {
    let mut button = state.button.lock();
    let result = button.press();
    let current = button.state();
    drop(button);
    emit_state(&app, current);

    result.map_err(|e| format!("Failed to play alert: {}", e))
}

#[tauri::command]
pub fn play_alert(state: State<'_, AppState>, app: AppHandle) -> Result<ButtonState, String> {
    let mut button = state.button.lock();
    let result = button.play();
    let current = button.state();
    drop(button);
    emit_state(&app, current);

    result
        .map(|_| current)
        .map_err(|e| format!("Failed to play alert: {}", e))
}

#[tauri::command]
pub fn pause_alert(state: State<'_, AppState>, app: AppHandle) -> Result<ButtonState, String> {
    let mut button = state.button.lock();
    button.pause();
    let current = button.state();
    drop(button);
    emit_state(&app, current);

    Ok(current)
}

#[tauri::command]
pub fn get_button_state(state: State<'_, AppState>) -> Result<ButtonState, String> {
    Ok(state.button.lock().state())
}
