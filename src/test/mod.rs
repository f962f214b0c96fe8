mod sync;

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use tracing_subscriber::fmt;

use crate::{Builder, Handle};
use doubles::{
    RecordingDataSource, RecordingForceSvg, RecordingReloader, RecordingWidget, TestDialogHost,
};

pub(crate) static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = fmt().with_test_writer().try_init();
});

pub(crate) fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Polls `condition` until it holds or two seconds elapse. The effect
/// actors run concurrently with the tests, so assertions on their side
/// effects have to wait for the event to be processed.
pub(crate) async fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);

    while Instant::now() < deadline {
        if condition() {
            return true;
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    false
}

/// A short grace period used to assert that nothing else happens.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub(crate) struct Fixture {
    pub(crate) handle: Handle,
    pub(crate) worker: tokio::task::JoinHandle<()>,
    pub(crate) source: RecordingDataSource,
    pub(crate) force_svg: RecordingForceSvg,
    pub(crate) widget: RecordingWidget,
    pub(crate) dialog: TestDialogHost,
    pub(crate) reloader: RecordingReloader,
}

impl Fixture {
    pub(crate) fn new(source: RecordingDataSource, force_svg: RecordingForceSvg) -> Self {
        init_tracing();

        let widget = RecordingWidget::default();
        let dialog = TestDialogHost::default();
        let reloader = RecordingReloader::default();

        let (handle, worker) = Builder::new().build_with(
            source.clone(),
            force_svg.clone(),
            widget.clone(),
            dialog.clone(),
            reloader.clone(),
        );

        Self {
            handle,
            worker: tokio::spawn(worker.wait()),
            source,
            force_svg,
            widget,
            dialog,
            reloader,
        }
    }

    pub(crate) async fn shutdown(self) {
        drop(self.handle);
        self.worker.await.unwrap();
    }
}
