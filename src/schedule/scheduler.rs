//! Debounced render scheduling on a tokio task
//!
//! Change events carry the full current text. The scheduler task keeps the
//! latest one in a [`Debouncer`] and calls the render callback once the
//! quiet interval passes with no newer event. A render that has started is
//! never interrupted; events arriving during it simply arm the next one.
//!
//! When every sender is gone, any pending text is rendered immediately and
//! the task ends.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{trace, warn};

use super::debounce::Debouncer;
use crate::render::{DisplaySurface, MarkdownRenderer, Preview};
use crate::utils::error::{PreviewError, PreviewResult};

/// Handle to a running render scheduler
#[derive(Debug)]
pub struct RenderScheduler {
    events: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl RenderScheduler {
    /// Spawn the scheduler on the current tokio runtime
    pub fn spawn<F>(quiet: Duration, on_fire: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let (events, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_debounced(receiver, quiet, on_fire));
        Self { events, task }
    }

    /// Report that the text changed
    pub fn notify(&self, text: impl Into<String>) -> PreviewResult<()> {
        self.events
            .send(text.into())
            .map_err(|_| PreviewError::scheduler("render task is no longer running"))
    }

    /// Stop accepting events, render anything pending and wait for the task
    pub async fn shutdown(self) -> PreviewResult<()> {
        drop(self.events);
        self.task
            .await
            .map_err(|err| PreviewError::scheduler(err.to_string()))
    }
}

/// Drive a debouncer from `events` until the channel closes
pub async fn run_debounced<F>(
    mut events: mpsc::UnboundedReceiver<String>,
    quiet: Duration,
    mut on_fire: F,
) where
    F: FnMut(String),
{
    let mut debouncer = Debouncer::new(quiet);

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(text) => {
                    if debouncer.notify(Instant::now(), text) {
                        trace!("pending render superseded");
                    }
                }
                None => {
                    if let Some(text) = debouncer.flush() {
                        on_fire(text);
                    }
                    break;
                }
            },
            _ = wait_until(deadline) => {
                if let Some(text) = debouncer.poll(Instant::now()) {
                    trace!(len = text.len(), "quiet interval elapsed");
                    on_fire(text);
                }
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// A preview wired to a display surface through the debounced scheduler
#[derive(Debug)]
pub struct LivePreview {
    scheduler: RenderScheduler,
}

impl LivePreview {
    /// Start rendering into `surface`, debounced by the preview's options
    pub fn spawn<R, S>(preview: Preview<R>, mut surface: S) -> Self
    where
        R: MarkdownRenderer + Send + 'static,
        S: DisplaySurface + Send + 'static,
    {
        let quiet = preview.options().debounce();
        let scheduler = RenderScheduler::spawn(quiet, move |text| {
            let document = preview.render_document(&text);
            if let Err(err) = surface.replace(document) {
                warn!(error = %err, "failed to update display surface");
            }
        });
        Self { scheduler }
    }

    /// Report that the editor text changed
    pub fn text_changed(&self, text: impl Into<String>) -> PreviewResult<()> {
        self.scheduler.notify(text)
    }

    pub async fn shutdown(self) -> PreviewResult<()> {
        self.scheduler.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::sleep;

    use crate::core::options::PreviewOptions;
    use crate::render::MemorySurface;

    const QUIET: Duration = Duration::from_millis(500);

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        (fired, move |text: String| sink.lock().unwrap().push(text))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_renders_once_with_latest_text() {
        let (fired, on_fire) = recorder();
        let scheduler = RenderScheduler::spawn(QUIET, on_fire);

        for i in 0..5 {
            scheduler.notify(format!("draft {}", i)).unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        assert!(fired.lock().unwrap().is_empty());

        sleep(QUIET).await;
        assert_eq!(*fired.lock().unwrap(), vec!["draft 4".to_string()]);
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_render_separately() {
        let (fired, on_fire) = recorder();
        let scheduler = RenderScheduler::spawn(QUIET, on_fire);

        scheduler.notify("first").unwrap();
        sleep(QUIET * 2).await;
        scheduler.notify("second").unwrap();
        sleep(QUIET * 2).await;

        assert_eq!(
            *fired.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending() {
        let (fired, on_fire) = recorder();
        let scheduler = RenderScheduler::spawn(QUIET, on_fire);

        scheduler.notify("unsaved").unwrap();
        scheduler.shutdown().await.unwrap();
        assert_eq!(*fired.lock().unwrap(), vec!["unsaved".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fires_without_events() {
        let (fired, on_fire) = recorder();
        let scheduler = RenderScheduler::spawn(QUIET, on_fire);
        sleep(QUIET * 4).await;
        scheduler.shutdown().await.unwrap();
        assert!(fired.lock().unwrap().is_empty());
    }

    #[derive(Clone, Default)]
    struct SharedSurface(Arc<Mutex<MemorySurface>>);

    impl DisplaySurface for SharedSurface {
        fn replace(&mut self, document: String) -> PreviewResult<()> {
            self.0.lock().unwrap().replace(document)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_preview_updates_surface() {
        let surface = SharedSurface::default();
        let live = LivePreview::spawn(Preview::new(PreviewOptions::default()), surface.clone());

        live.text_changed("$x").unwrap();
        sleep(Duration::from_millis(50)).await;
        live.text_changed("$x_1$").unwrap();
        sleep(QUIET * 2).await;

        {
            let shown = surface.0.lock().unwrap();
            assert_eq!(shown.replacements(), 1);
            assert!(shown.current().unwrap().contains("$x_1$"));
        }
        live.shutdown().await.unwrap();
    }
}
