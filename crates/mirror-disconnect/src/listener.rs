//! Callbacks invoked by the disconnect monitor.

use mirror_ipc::Icon;

/// Receives the two notifications of a [`DisconnectMonitor`].
///
/// Both methods run on the monitor's worker thread, never on the thread
/// that started it. Implementations that touch UI or rendering state must
/// hand the work back to the owning thread themselves. Neither method
/// should block for long: a slow callback delays `join()`.
///
/// For a given monitor, `on_icon_loaded` is always called before
/// `on_timeout`, and each is called at most once.
///
/// [`DisconnectMonitor`]: crate::DisconnectMonitor
pub trait DisconnectListener: Send + 'static {
    /// The disconnected icon has been loaded.
    fn on_icon_loaded(&self, icon: Icon);

    /// The deadline passed without an interrupt; the window should close.
    fn on_timeout(&self);
}
