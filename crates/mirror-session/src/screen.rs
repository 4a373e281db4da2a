//! Screen session loop.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{select, Receiver, Sender};
use tracing::{debug, error, info, instrument, warn};

use mirror_disconnect::{DisconnectMonitor, IconLoader};
use mirror_ipc::{CloseReason, Icon, ScreenCommand, ScreenConfig, ScreenEvent, ScreenState};
use mirror_render::{FrameUpload, Renderer, TextureManager, VideoFrame};

use crate::listener::{ChannelListener, DisconnectNotice};
use crate::error::SessionError;
use crate::{SessionResult, NOTICE_CHANNEL_CAPACITY};

enum Step {
    Continue,
    DeviceLost,
    Close(CloseReason),
}

/// A mirroring window: renders frames, then handles device loss.
pub struct Screen<R: Renderer> {
    config: ScreenConfig,
    textures: TextureManager<R>,
    icon_loader: Arc<dyn IconLoader>,
    frame_rx: Receiver<VideoFrame>,
    command_rx: Receiver<ScreenCommand>,
    event_tx: Sender<ScreenEvent>,
    notice_tx: Sender<DisconnectNotice>,
    notice_rx: Receiver<DisconnectNotice>,
    monitor: Option<DisconnectMonitor>,
    state: ScreenState,
    frames_rendered: u64,
}

impl<R: Renderer> Screen<R> {
    /// Create a screen.
    ///
    /// The frame channel disconnecting without a prior close command is
    /// treated as device loss.
    pub fn new(
        config: ScreenConfig,
        renderer: R,
        icon_loader: Arc<dyn IconLoader>,
        frame_rx: Receiver<VideoFrame>,
        command_rx: Receiver<ScreenCommand>,
        event_tx: Sender<ScreenEvent>,
    ) -> Self {
        let (notice_tx, notice_rx) = crossbeam_channel::bounded(NOTICE_CHANNEL_CAPACITY);

        Self {
            config,
            textures: TextureManager::new(renderer),
            icon_loader,
            frame_rx,
            command_rx,
            event_tx,
            notice_tx,
            notice_rx,
            monitor: None,
            state: ScreenState::default(),
            frames_rendered: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// The texture manager, for inspection.
    pub fn textures(&self) -> &TextureManager<R> {
        &self.textures
    }

    /// Number of frames drawn so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Run the screen until it closes (blocking).
    ///
    /// On error the screen is closed with [`CloseReason::Failed`] before
    /// the error is returned.
    #[instrument(name = "screen_run", skip(self), fields(title = %self.config.window_title))]
    pub fn run(&mut self) -> SessionResult<CloseReason> {
        info!("Screen starting");

        // Clear the window before the first frame arrives.
        if let Err(e) = self.textures.present() {
            return Err(self.fail(e.into()));
        }

        let command_rx = self.command_rx.clone();
        let notice_rx = self.notice_rx.clone();
        let mut frame_rx = self.frame_rx.clone();

        loop {
            let step = select! {
                recv(frame_rx) -> msg => match msg {
                    Ok(frame) => {
                        self.render_frame(&frame);
                        Step::Continue
                    }
                    Err(_) => Step::DeviceLost,
                },
                recv(command_rx) -> msg => match msg {
                    Ok(ScreenCommand::Close) => Step::Close(CloseReason::UserRequested),
                    Err(_) => {
                        info!("Command channel disconnected, closing");
                        Step::Close(CloseReason::UserRequested)
                    }
                },
                recv(notice_rx) -> msg => match msg {
                    Ok(DisconnectNotice::IconLoaded(icon)) => {
                        self.show_icon(&icon);
                        Step::Continue
                    }
                    Ok(DisconnectNotice::TimedOut) => Step::Close(CloseReason::DisconnectTimeout),
                    // The screen holds a sender, so this channel never disconnects.
                    Err(_) => Step::Continue,
                },
            };

            match step {
                Step::Continue => {}
                Step::DeviceLost => {
                    frame_rx = crossbeam_channel::never();
                    if let Err(e) = self.on_device_lost() {
                        return Err(self.fail(e));
                    }
                }
                Step::Close(reason) => {
                    self.close(reason);
                    return Ok(reason);
                }
            }
        }
    }

    fn render_frame(&mut self, frame: &VideoFrame) {
        match self.textures.set_from_frame(frame) {
            Ok(FrameUpload::Recreated(size)) => {
                self.send_event(ScreenEvent::FrameSizeChanged(size));
            }
            Ok(FrameUpload::Reused) => {}
            Err(e) => {
                warn!("Dropping frame #{}: {}", frame.sequence, e);
                return;
            }
        }

        if let Err(e) = self.textures.present() {
            warn!("Could not present frame #{}: {}", frame.sequence, e);
            return;
        }

        self.frames_rendered += 1;
        if self.frames_rendered <= 5 || self.frames_rendered % 100 == 0 {
            debug!(
                "Frame rendered: #{}, size={}x{}",
                frame.sequence, frame.width, frame.height
            );
        }
    }

    fn show_icon(&mut self, icon: &Icon) {
        if let Err(e) = self.textures.set_from_icon(icon) {
            warn!("Could not show disconnected icon: {}", e);
            return;
        }
        if let Err(e) = self.textures.present() {
            warn!("Could not present disconnected icon: {}", e);
            return;
        }
        self.send_event(ScreenEvent::DisconnectedIconShown);
    }

    #[instrument(name = "device_lost", skip(self))]
    fn on_device_lost(&mut self) -> SessionResult<()> {
        let timeout_ms = self.config.disconnect_timeout_ms;
        warn!(?timeout_ms, "Device disconnected");

        self.transition_to(ScreenState::Disconnected { timeout_ms });
        self.send_event(ScreenEvent::DeviceDisconnected);

        let deadline = self.config.disconnect_deadline(Instant::now());
        let listener = ChannelListener::new(self.notice_tx.clone());
        let monitor = DisconnectMonitor::start(deadline, listener, Arc::clone(&self.icon_loader))?;
        self.monitor = Some(monitor);

        Ok(())
    }

    #[instrument(name = "screen_close", skip(self))]
    fn close(&mut self, reason: CloseReason) {
        if let Some(monitor) = self.monitor.take() {
            // No-op if the timeout already fired.
            monitor.interrupt();
            let outcome = monitor.join().destroy();
            debug!(?outcome, "Disconnect monitor released");
        }

        self.transition_to(ScreenState::Closed { reason });
        self.send_event(ScreenEvent::Closed(reason));

        info!(
            frames = self.frames_rendered,
            "Screen closed: {}",
            reason.message()
        );
    }

    /// Close after an error that ends the session, handing the error back.
    fn fail(&mut self, err: SessionError) -> SessionError {
        error!("Screen failed: {}", err);
        self.close(CloseReason::Failed);
        err
    }

    fn transition_to(&mut self, new_state: ScreenState) {
        let previous = std::mem::replace(&mut self.state, new_state);

        debug!(
            previous = %previous.name(),
            current = %new_state.name(),
            "State transition"
        );

        self.send_event(ScreenEvent::StateChanged {
            previous,
            current: new_state,
        });
    }

    fn send_event(&self, event: ScreenEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}
