/// The host able to present the settings dialog. `open` must present exactly
/// one dialog instance per call.
pub trait DialogHost: Send + Sync + 'static {
    type Handle: DialogHandle;

    fn open(&self) -> Self::Handle;
}

/// A handle to one presented dialog. `closed` resolves when the user
/// dismisses it.
pub trait DialogHandle: Send + 'static {
    fn closed(self) -> impl std::future::Future<Output = ()> + Send;
}

/// Triggers a full reload of the running application.
pub trait PageReloader: Send + Sync + 'static {
    fn reload(&self);
}
