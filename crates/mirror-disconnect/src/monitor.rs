//! Interruptible deadline monitor.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, error, info, instrument};

use crate::error::DisconnectError;
use crate::icon::{IconLoader, ICON_FILENAME_DISCONNECTED};
use crate::latch::{TimedLatch, WaitOutcome};
use crate::listener::DisconnectListener;
use crate::{DisconnectResult, WORKER_THREAD_NAME};

/// Observable state of a monitor.
///
/// Not having a monitor yet and having destroyed it are expressed by
/// types (no value, consumed value) rather than by variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// The worker is loading the icon or waiting for the deadline.
    Running,

    /// The deadline passed; `on_timeout` has been or is being called.
    TimedOut,

    /// The interrupt won the race.
    Interrupted,

    /// The worker has been joined.
    Joined,
}

/// How the worker finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The deadline passed and `on_timeout` was called.
    TimedOut,

    /// The monitor was interrupted before the deadline.
    Interrupted,

    /// No deadline was set; the worker only loaded the icon.
    NoDeadline,

    /// A listener callback panicked.
    Panicked,
}

struct Shared {
    latch: TimedLatch,
    state: Mutex<MonitorState>,
    outcome: Mutex<Option<MonitorOutcome>>,
}

impl Shared {
    fn set_state(&self, state: MonitorState) {
        *self.state.lock() = state;
    }

    /// The worker's result. A worker that panicked never recorded one.
    fn outcome(&self) -> MonitorOutcome {
        self.outcome.lock().unwrap_or(MonitorOutcome::Panicked)
    }
}

/// A running disconnect watchdog.
///
/// Created by [`DisconnectMonitor::start`]; [`join`](Self::join) turns it
/// into a [`JoinedMonitor`], which [`destroy`](JoinedMonitor::destroy)
/// consumes. Dropping a monitor that was never joined interrupts it and
/// waits for the worker.
pub struct DisconnectMonitor {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
}

impl DisconnectMonitor {
    /// Spawn the worker.
    ///
    /// The worker loads the disconnected icon and hands it to
    /// `listener.on_icon_loaded`, then, if `deadline` is set, waits until
    /// either the deadline passes (calling `listener.on_timeout`) or
    /// [`interrupt`](Self::interrupt) is called.
    #[instrument(name = "disconnect_start", skip(listener, icon_loader))]
    pub fn start<L>(
        deadline: Option<Instant>,
        listener: L,
        icon_loader: Arc<dyn IconLoader>,
    ) -> DisconnectResult<Self>
    where
        L: DisconnectListener,
    {
        let shared = Arc::new(Shared {
            latch: TimedLatch::new(),
            state: Mutex::new(MonitorState::Running),
            outcome: Mutex::new(None),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let outcome = run(&worker_shared, deadline, &listener, &*icon_loader);
                *worker_shared.outcome.lock() = Some(outcome);
            })
            .map_err(DisconnectError::Spawn)?;

        debug!("Disconnect monitor started");

        Ok(Self {
            shared,
            worker: Some(worker),
            deadline,
        })
    }

    /// Cancel the pending timeout. Idempotent and non-blocking.
    pub fn interrupt(&self) {
        debug!("Interrupting disconnect monitor");
        self.shared.latch.set();
    }

    /// A handle that can interrupt this monitor from another thread.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current state.
    pub fn state(&self) -> MonitorState {
        *self.shared.state.lock()
    }

    /// The deadline the monitor was started with.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker to terminate.
    #[instrument(name = "disconnect_join", skip(self))]
    pub fn join(mut self) -> JoinedMonitor {
        if let Some(handle) = self.worker.take() {
            join_worker(&self.shared, handle);
        }
        let outcome = self.shared.outcome();

        debug!(?outcome, "Disconnect monitor joined");

        JoinedMonitor {
            shared: Arc::clone(&self.shared),
            outcome,
        }
    }
}

impl fmt::Debug for DisconnectMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisconnectMonitor")
            .field("state", &self.state())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Drop for DisconnectMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            debug!("Dropping running disconnect monitor");
            self.shared.latch.set();
            join_worker(&self.shared, handle);
        }
    }
}

/// Cloneable handle to interrupt a monitor.
///
/// Interrupting after the monitor finished, or after it was destroyed, is
/// a no-op.
#[derive(Clone)]
pub struct Interrupter {
    shared: Arc<Shared>,
}

impl Interrupter {
    /// Cancel the pending timeout.
    pub fn interrupt(&self) {
        self.shared.latch.set();
    }
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupter")
            .field("interrupted", &self.shared.latch.is_set())
            .finish()
    }
}

/// A monitor whose worker has terminated.
#[derive(Debug)]
#[must_use = "a joined monitor should be destroyed"]
pub struct JoinedMonitor {
    shared: Arc<Shared>,
    outcome: MonitorOutcome,
}

impl JoinedMonitor {
    /// How the worker finished.
    pub fn outcome(&self) -> MonitorOutcome {
        self.outcome
    }

    /// Always [`MonitorState::Joined`].
    pub fn state(&self) -> MonitorState {
        *self.shared.state.lock()
    }

    /// Release the synchronization state.
    pub fn destroy(self) -> MonitorOutcome {
        debug!("Disconnect monitor destroyed");
        self.outcome
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("interrupted", &self.latch.is_set())
            .field("state", &*self.state.lock())
            .finish()
    }
}

fn join_worker(shared: &Shared, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("Disconnect worker panicked");
    }
    shared.set_state(MonitorState::Joined);
}

/// Worker body.
fn run(
    shared: &Shared,
    deadline: Option<Instant>,
    listener: &dyn DisconnectListener,
    icon_loader: &dyn IconLoader,
) -> MonitorOutcome {
    match icon_loader.load(ICON_FILENAME_DISCONNECTED) {
        Ok(icon) => listener.on_icon_loaded(icon),
        Err(e) => error!("Could not load disconnected icon: {}", e),
    }

    let Some(deadline) = deadline else {
        debug!("No disconnect deadline, worker exiting");
        return MonitorOutcome::NoDeadline;
    };

    match shared.latch.wait_until(Some(deadline)) {
        WaitOutcome::Signaled => {
            shared.set_state(MonitorState::Interrupted);
            debug!("Disconnect monitor interrupted");
            MonitorOutcome::Interrupted
        }
        WaitOutcome::TimedOut => {
            shared.set_state(MonitorState::TimedOut);
            info!("Disconnect timeout expired");
            listener.on_timeout();
            MonitorOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;
    use mirror_ipc::Icon;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use crate::error::IconError;
    use crate::IconResult;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Notice {
        IconLoaded(u32, u32),
        TimedOut,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        notices: Arc<Mutex<Vec<(Notice, Instant)>>>,
    }

    impl Recorder {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().iter().map(|(n, _)| n.clone()).collect()
        }

        fn time_of(&self, notice: &Notice) -> Option<Instant> {
            self.notices
                .lock()
                .iter()
                .find(|(n, _)| n == notice)
                .map(|(_, at)| *at)
        }
    }

    impl DisconnectListener for Recorder {
        fn on_icon_loaded(&self, icon: Icon) {
            self.notices
                .lock()
                .push((Notice::IconLoaded(icon.width, icon.height), Instant::now()));
        }

        fn on_timeout(&self) {
            self.notices.lock().push((Notice::TimedOut, Instant::now()));
        }
    }

    struct StaticIcon;

    impl IconLoader for StaticIcon {
        fn load(&self, _name: &str) -> IconResult<Icon> {
            Ok(Icon::new(Bytes::from(vec![0u8; 2 * 2 * 4]), 2, 2))
        }
    }

    struct MissingIcon {
        attempts: AtomicUsize,
    }

    impl IconLoader for MissingIcon {
        fn load(&self, _name: &str) -> IconResult<Icon> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(IconError::NoExecutableDir("test".to_string()))
        }
    }

    fn in_ms(ms: u64) -> Option<Instant> {
        Some(Instant::now() + Duration::from_millis(ms))
    }

    #[test]
    fn test_timeout_after_icon() {
        let recorder = Recorder::default();
        let deadline = in_ms(100);

        let monitor = DisconnectMonitor::start(deadline, recorder.clone(), Arc::new(StaticIcon))
            .unwrap();
        let joined = monitor.join();

        assert_eq!(joined.outcome(), MonitorOutcome::TimedOut);
        assert_eq!(joined.state(), MonitorState::Joined);
        assert_eq!(
            recorder.notices(),
            vec![Notice::IconLoaded(2, 2), Notice::TimedOut]
        );

        let icon_at = recorder.time_of(&Notice::IconLoaded(2, 2)).unwrap();
        let timeout_at = recorder.time_of(&Notice::TimedOut).unwrap();
        assert!(icon_at <= timeout_at);
        assert!(timeout_at >= deadline.unwrap());

        joined.destroy();
    }

    #[test]
    fn test_interrupt_cancels_timeout_promptly() {
        let recorder = Recorder::default();
        let start = Instant::now();

        let monitor = DisconnectMonitor::start(
            Some(start + Duration::from_millis(5000)),
            recorder.clone(),
            Arc::new(StaticIcon),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(10));
        monitor.interrupt();
        let joined = monitor.join();

        assert!(start.elapsed() < Duration::from_millis(1000));
        assert_eq!(joined.outcome(), MonitorOutcome::Interrupted);
        assert_eq!(recorder.notices(), vec![Notice::IconLoaded(2, 2)]);
        joined.destroy();
    }

    #[test]
    fn test_icon_failure_is_not_fatal() {
        let recorder = Recorder::default();
        let loader = Arc::new(MissingIcon {
            attempts: AtomicUsize::new(0),
        });

        let monitor =
            DisconnectMonitor::start(in_ms(50), recorder.clone(), loader.clone()).unwrap();
        let outcome = monitor.join().destroy();

        assert_eq!(outcome, MonitorOutcome::TimedOut);
        assert_eq!(recorder.notices(), vec![Notice::TimedOut]);
        assert_eq!(loader.attempts.load(Ordering::SeqCst), 1);
    }

    /// Counts ERROR events seen on the current thread.
    struct ErrorCounter {
        errors: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_icon_failure_logs_one_error() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter {
            errors: Arc::clone(&errors),
        });

        let shared = Shared {
            latch: TimedLatch::new(),
            state: Mutex::new(MonitorState::Running),
            outcome: Mutex::new(None),
        };
        let recorder = Recorder::default();
        let loader = MissingIcon {
            attempts: AtomicUsize::new(0),
        };

        // Run the worker body here so the scoped subscriber sees its events.
        let outcome = tracing::subscriber::with_default(subscriber, || {
            run(&shared, in_ms(20), &recorder, &loader)
        });

        assert_eq!(outcome, MonitorOutcome::TimedOut);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.notices(), vec![Notice::TimedOut]);
    }

    #[test]
    fn test_no_deadline_never_times_out() {
        let recorder = Recorder::default();
        let monitor =
            DisconnectMonitor::start(None, recorder.clone(), Arc::new(StaticIcon)).unwrap();
        assert_eq!(monitor.join().destroy(), MonitorOutcome::NoDeadline);
        assert_eq!(recorder.notices(), vec![Notice::IconLoaded(2, 2)]);

        let recorder = Recorder::default();
        let monitor =
            DisconnectMonitor::start(None, recorder.clone(), Arc::new(StaticIcon)).unwrap();
        monitor.interrupt();
        assert_eq!(monitor.join().destroy(), MonitorOutcome::NoDeadline);
        assert!(!recorder.notices().contains(&Notice::TimedOut));
    }

    #[test]
    fn test_repeated_interrupts_behave_like_one() {
        let recorder = Recorder::default();
        let monitor =
            DisconnectMonitor::start(in_ms(5000), recorder.clone(), Arc::new(StaticIcon))
                .unwrap();

        let interrupter = monitor.interrupter();
        for _ in 0..5 {
            monitor.interrupt();
            interrupter.interrupt();
        }

        let joined = monitor.join();
        assert_eq!(joined.outcome(), MonitorOutcome::Interrupted);

        // After the worker is gone, and after destroy, interrupting is a no-op.
        interrupter.interrupt();
        joined.destroy();
        interrupter.interrupt();

        assert_eq!(recorder.notices(), vec![Notice::IconLoaded(2, 2)]);
    }

    #[test]
    fn test_interrupt_after_timeout_is_noop() {
        let recorder = Recorder::default();
        let monitor =
            DisconnectMonitor::start(in_ms(10), recorder.clone(), Arc::new(StaticIcon)).unwrap();

        while !monitor.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(monitor.state(), MonitorState::TimedOut);

        monitor.interrupt();
        assert_eq!(monitor.join().destroy(), MonitorOutcome::TimedOut);
        assert_eq!(
            recorder.notices(),
            vec![Notice::IconLoaded(2, 2), Notice::TimedOut]
        );
    }

    #[test]
    fn test_interrupt_from_other_thread() {
        let recorder = Recorder::default();
        let monitor =
            DisconnectMonitor::start(in_ms(5000), recorder.clone(), Arc::new(StaticIcon))
                .unwrap();

        let interrupter = monitor.interrupter();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            interrupter.interrupt();
        });

        assert_eq!(monitor.join().destroy(), MonitorOutcome::Interrupted);
        handle.join().unwrap();
    }

    #[test]
    fn test_slow_icon_listener_delays_but_keeps_deadline() {
        struct SlowIconListener {
            inner: Recorder,
        }

        impl DisconnectListener for SlowIconListener {
            fn on_icon_loaded(&self, icon: Icon) {
                thread::sleep(Duration::from_millis(100));
                self.inner.on_icon_loaded(icon);
            }

            fn on_timeout(&self) {
                self.inner.on_timeout();
            }
        }

        let recorder = Recorder::default();
        let start = Instant::now();
        let listener = SlowIconListener {
            inner: recorder.clone(),
        };

        let monitor = DisconnectMonitor::start(
            Some(start + Duration::from_millis(20)),
            listener,
            Arc::new(StaticIcon),
        )
        .unwrap();
        assert_eq!(monitor.join().destroy(), MonitorOutcome::TimedOut);

        assert_eq!(
            recorder.notices(),
            vec![Notice::IconLoaded(2, 2), Notice::TimedOut]
        );
        // The timeout is not re-armed after the slow callback.
        let timeout_at = recorder.time_of(&Notice::TimedOut).unwrap();
        assert!(timeout_at.duration_since(start) < Duration::from_millis(1000));
    }

    #[test]
    fn test_drop_interrupts_and_joins() {
        let recorder = Recorder::default();
        let start = Instant::now();

        let monitor =
            DisconnectMonitor::start(in_ms(5000), recorder.clone(), Arc::new(StaticIcon))
                .unwrap();
        drop(monitor);

        assert!(start.elapsed() < Duration::from_millis(1000));
        assert!(!recorder.notices().contains(&Notice::TimedOut));
    }

    #[test]
    fn test_panicking_listener_is_reported() {
        struct PanickingListener;

        impl DisconnectListener for PanickingListener {
            fn on_icon_loaded(&self, _icon: Icon) {
                panic!("listener failure");
            }

            fn on_timeout(&self) {}
        }

        let monitor =
            DisconnectMonitor::start(in_ms(5000), PanickingListener, Arc::new(StaticIcon))
                .unwrap();
        let joined = monitor.join();

        assert_eq!(joined.outcome(), MonitorOutcome::Panicked);
        assert_eq!(joined.state(), MonitorState::Joined);
        joined.destroy();
    }

    #[test]
    fn test_many_sequential_start_interrupt_cycles() {
        #[derive(Clone, Default)]
        struct Counter {
            icons: Arc<AtomicUsize>,
            timeouts: Arc<AtomicUsize>,
        }

        impl DisconnectListener for Counter {
            fn on_icon_loaded(&self, _icon: Icon) {
                self.icons.fetch_add(1, Ordering::SeqCst);
            }

            fn on_timeout(&self) {
                self.timeouts.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Counter::default();
        let loader: Arc<dyn IconLoader> = Arc::new(StaticIcon);

        for _ in 0..1000 {
            let monitor =
                DisconnectMonitor::start(in_ms(5000), counter.clone(), Arc::clone(&loader))
                    .unwrap();
            monitor.interrupt();
            assert_eq!(monitor.join().destroy(), MonitorOutcome::Interrupted);
        }

        assert_eq!(counter.icons.load(Ordering::SeqCst), 1000);
        assert_eq!(counter.timeouts.load(Ordering::SeqCst), 0);
        // Every worker dropped its loader handle on exit.
        assert_eq!(Arc::strong_count(&loader), 1);
    }
}
