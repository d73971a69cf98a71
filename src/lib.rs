// AlertPlayer - one-button alert sound player
// Module declarations
mod audio;
mod commands;
mod control;
mod settings;
mod state;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tauri::path::BaseDirectory;
use tauri::Manager;

use audio::{AlertAsset, AlertPlayer, AudioOutput};
use control::PlayButton;
use settings::AppSettings;
use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let config_dir = app.path().app_config_dir()?;
            let settings = AppSettings::load_or_init(&config_dir)?;

            let _ = tracing_subscriber::fmt()
                .with_max_level(settings.logging.max_level())
                .try_init();
            tracing::info!("Settings loaded from {:?}", config_dir);

            let asset_path = app.path().resolve(
                format!("assets/{}", settings.playback.asset),
                BaseDirectory::Resource,
            )?;

            // A missing or corrupt asset is a packaging error; setup
            // fails and the app exits with the diagnostic
            let player = open_player(&asset_path, &settings)
                .context("Unable to initialize the audio player")?;

            let mut button = PlayButton::new(player);
            let handle = app.handle().clone();
            button.on_playback_finished(move |session| {
                let state = handle.state::<AppState>();
                let mut button = state.button.lock();
                if button.playback_did_finish(session) {
                    let current = button.state();
                    drop(button);
                    commands::emit_state(&handle, current);
                }
            });

            app.manage(AppState::new(button));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::press_play_button,
            commands::play_alert,
            commands::pause_alert,
            commands::get_button_state,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn open_player(asset_path: &Path, settings: &AppSettings) -> anyhow::Result<AlertPlayer> {
    let asset = AlertAsset::load(asset_path)
        .with_context(|| format!("Failed to load alert asset {:?}", asset_path))?;
    let output = AudioOutput::new(settings.playback.buffer_ms)?;

    let player = AlertPlayer::new(asset, Arc::new(output))?;
    player.set_volume(settings.playback.volume);
    Ok(player)
}
