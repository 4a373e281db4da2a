//! Hands disconnect monitor callbacks back to the screen thread.

use crossbeam_channel::Sender;
use tracing::debug;

use mirror_disconnect::DisconnectListener;
use mirror_ipc::Icon;

/// A monitor callback, as seen by the screen loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectNotice {
    /// The disconnected icon is ready to be shown.
    IconLoaded(Icon),

    /// The disconnect timeout expired.
    TimedOut,
}

/// Listener forwarding every callback over a channel.
///
/// Texture work must happen on the thread owning the renderer, so the
/// worker only posts notices and the screen loop acts on them.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: Sender<DisconnectNotice>,
}

impl ChannelListener {
    pub fn new(tx: Sender<DisconnectNotice>) -> Self {
        Self { tx }
    }

    fn post(&self, notice: DisconnectNotice) {
        if self.tx.send(notice).is_err() {
            debug!("Screen is gone, dropping disconnect notice");
        }
    }
}

impl DisconnectListener for ChannelListener {
    fn on_icon_loaded(&self, icon: Icon) {
        self.post(DisconnectNotice::IconLoaded(icon));
    }

    fn on_timeout(&self) {
        self.post(DisconnectNotice::TimedOut);
    }
}
