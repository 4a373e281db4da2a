//! Headless mirroring demo.
//!
//! Feeds synthetic frames to a screen, then stops the feed to simulate the
//! device going away. The screen shows the disconnected icon and closes
//! once the disconnect timeout expires. With `"disconnect_timeout_ms": null`
//! the demo stands in for the user and closes the screen itself shortly
//! after the icon is shown.
//!
//! Usage: `mirror [config.json]`

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirror_disconnect::FileIconLoader;
use mirror_ipc::{ScreenCommand, ScreenConfig, ScreenEvent};
use mirror_render::{HeadlessRenderer, VideoFrame};
use mirror_session::Screen;

const DEMO_FRAME_COUNT: u64 = 120;
const DEMO_FRAME_INTERVAL: Duration = Duration::from_millis(16);
const DEMO_CLOSE_DELAY: Duration = Duration::from_secs(2);

/// Initialize logging.
fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "mirror=debug,mirror_session=debug,mirror_disconnect=debug,mirror_render=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScreenConfig> {
    let Some(path) = path else {
        return Ok(ScreenConfig::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    ScreenConfig::from_json(&json)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Whether the demo has to close the screen on the user's behalf.
fn needs_demo_close(config: &ScreenConfig, event: &ScreenEvent) -> bool {
    config.disconnect_timeout_ms.is_none() && *event == ScreenEvent::DisconnectedIconShown
}

/// Send a device-like frame stream, rotating halfway through.
fn produce_frames(frame_tx: Sender<VideoFrame>) {
    for sequence in 0..DEMO_FRAME_COUNT {
        let frame = if sequence < DEMO_FRAME_COUNT / 2 {
            VideoFrame::blank(720, 1280, sequence)
        } else {
            VideoFrame::blank(1280, 720, sequence)
        };

        if frame_tx.send(frame).is_err() {
            debug!("Screen closed, stopping frame producer");
            return;
        }
        thread::sleep(DEMO_FRAME_INTERVAL);
    }

    info!("Frame producer done, device disconnected");
}

fn main() -> Result<()> {
    init_logging();

    let config_path = std::env::args_os().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;
    info!(?config, "Mirror starting");

    let icon_loader = Arc::new(FileIconLoader::from_config(config.icon_dir.as_deref()));
    let screen_config = config.clone();

    // Create channels
    let (frame_tx, frame_rx) = mirror_render::frame_channel();
    let (command_tx, command_rx) = mirror_ipc::command_channel();
    let (event_tx, event_rx) = mirror_ipc::event_channel();

    let screen_handle = thread::Builder::new()
        .name("mirror-screen".into())
        .spawn(move || {
            let mut screen = Screen::new(
                screen_config,
                HeadlessRenderer::new(),
                icon_loader,
                frame_rx,
                command_rx,
                event_tx,
            );
            screen.run()
        })
        .context("Failed to spawn screen thread")?;

    let producer_handle = thread::Builder::new()
        .name("mirror-frames".into())
        .spawn(move || produce_frames(frame_tx))
        .context("Failed to spawn frame producer")?;

    // Ends once the screen drops its event sender.
    for event in event_rx.iter() {
        info!(?event, "Screen event");
        if needs_demo_close(&config, &event) {
            info!("No disconnect timeout, closing in {:?}", DEMO_CLOSE_DELAY);
            thread::sleep(DEMO_CLOSE_DELAY);
            if command_tx.send(ScreenCommand::Close).is_err() {
                debug!("Screen already closed");
            }
        }
        if let ScreenEvent::Closed(reason) = event {
            info!("Closed: {}", reason.message());
        }
    }

    let reason = screen_handle
        .join()
        .map_err(|_| anyhow!("Screen thread panicked"))?
        .context("Screen session failed")?;
    producer_handle
        .join()
        .map_err(|_| anyhow!("Frame producer panicked"))?;

    info!(?reason, "Mirror stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), ScreenConfig::default());
    }

    #[test]
    fn test_config_file_without_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.json");
        std::fs::write(&path, r#"{ "disconnect_timeout_ms": null }"#).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.disconnect_timeout_ms, None);
        assert!(needs_demo_close(&config, &ScreenEvent::DisconnectedIconShown));
        assert!(!needs_demo_close(&config, &ScreenEvent::DeviceDisconnected));
    }

    #[test]
    fn test_timeout_config_closes_on_its_own() {
        let config = ScreenConfig::default();
        assert!(!needs_demo_close(&config, &ScreenEvent::DisconnectedIconShown));
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("missing.json").as_path())).is_err());
    }
}
