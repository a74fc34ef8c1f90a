// Pending tasks - background jobs whose results belong to a single view
use crossbeam_channel::{Receiver, Sender};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Called from the worker once a result is ready (typically a repaint request)
pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// Handle to a background job whose result is polled from the UI thread.
///
/// Architecture:
/// - The job runs on the tokio runtime and sends its result over a channel
/// - The UI calls `poll()` each frame (non-blocking)
/// - Dropping the handle, or calling `discard()`, aborts the job and marks the
///   result discard-on-arrival, so a view that has gone away never receives it
pub struct PendingTask<T> {
    result_rx: Receiver<T>,
    discarded: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    completed: bool,
}

impl<T: Send + 'static> PendingTask<T> {
    /// Run an async job on the runtime
    pub fn spawn<F>(runtime: &Handle, job: F, notify: Notify) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let discarded = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&discarded);
        let handle = runtime.spawn(async move {
            let value = job.await;
            deliver(&flag, &result_tx, value, &notify);
        });

        Self {
            result_rx,
            discarded,
            handle: Some(handle),
            completed: false,
        }
    }

    /// Run a blocking job (file IO, decoding) on the runtime's blocking pool
    pub fn spawn_blocking<F>(runtime: &Handle, job: F, notify: Notify) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let discarded = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&discarded);
        let handle = runtime.spawn_blocking(move || {
            let value = job();
            deliver(&flag, &result_tx, value, &notify);
        });

        Self {
            result_rx,
            discarded,
            handle: Some(handle),
            completed: false,
        }
    }

    /// Take the result if it has arrived. Yields at most once.
    pub fn poll(&mut self) -> Option<T> {
        if self.completed || self.discarded.load(Ordering::Acquire) {
            return None;
        }

        let value = self.result_rx.try_recv().ok()?;
        self.completed = true;
        self.handle = None;
        Some(value)
    }
}

impl<T> PendingTask<T> {
    /// Still waiting for a result that will be delivered
    pub fn is_pending(&self) -> bool {
        !self.completed && !self.discarded.load(Ordering::Acquire)
    }

    /// Abandon the job. Any result it produces is dropped on arrival.
    pub fn discard(&mut self) {
        self.discarded.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        // Drain a result that raced the flag
        while self.result_rx.try_recv().is_ok() {}
    }
}

impl<T> Drop for PendingTask<T> {
    fn drop(&mut self) {
        if self.is_pending() {
            self.discard();
        }
    }
}

/// Runtime handle plus the wake-up callback every task should use
#[derive(Clone)]
pub struct Spawner {
    runtime: Handle,
    notify: Notify,
}

impl Spawner {
    pub fn new(runtime: Handle, notify: Notify) -> Self {
        Self { runtime, notify }
    }

    pub fn spawn<T, F>(&self, job: F) -> PendingTask<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        PendingTask::spawn(&self.runtime, job, Arc::clone(&self.notify))
    }

    pub fn spawn_blocking<T, F>(&self, job: F) -> PendingTask<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        PendingTask::spawn_blocking(&self.runtime, job, Arc::clone(&self.notify))
    }
}

fn deliver<T>(discarded: &AtomicBool, result_tx: &Sender<T>, value: T, notify: &Notify) {
    if discarded.load(Ordering::Acquire) {
        return;
    }
    // Ignore send errors - the handle may be gone already
    if result_tx.send(value).is_ok() {
        notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    fn counter() -> (Arc<AtomicUsize>, Notify) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        (count, Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn wait_for<T: Send + 'static>(task: &mut PendingTask<T>) -> Option<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(value) = task.poll() {
                return Some(value);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn delivers_async_result_once_and_notifies() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (notified, notify) = counter();

        let mut task = PendingTask::spawn(runtime.handle(), async { 42 }, notify);
        assert_eq!(wait_for(&mut task), Some(42));
        assert_eq!(task.poll(), None);
        assert!(!task.is_pending());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn spawner_shares_one_notify() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (notified, notify) = counter();
        let spawner = Spawner::new(runtime.handle().clone(), notify);

        let mut first = spawner.spawn(async { "first" });
        let mut second = spawner.spawn_blocking(|| "second");
        assert_eq!(wait_for(&mut first), Some("first"));
        assert_eq!(wait_for(&mut second), Some("second"));
        assert_eq!(notified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn delivers_blocking_result() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (_, notify) = counter();

        let mut task = PendingTask::spawn_blocking(runtime.handle(), || "encoded".to_string(), notify);
        assert_eq!(wait_for(&mut task).as_deref(), Some("encoded"));
    }

    #[test]
    fn discarded_result_is_never_seen() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (notified, notify) = counter();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let mut task = PendingTask::spawn_blocking(
            runtime.handle(),
            move || {
                let _ = release_rx.recv();
                "late"
            },
            notify,
        );
        assert!(task.is_pending());

        task.discard();
        release_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(task.poll(), None);
        assert!(!task.is_pending());
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_the_handle_discards_the_result() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (notified, notify) = counter();

        let task = PendingTask::spawn(
            runtime.handle(),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                7
            },
            notify,
        );
        drop(task);

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }
}
