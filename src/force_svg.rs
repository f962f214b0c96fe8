use std::sync::atomic::{AtomicBool, Ordering};

/// The dedicated data source for the force-SVG rendering flag. It lives in
/// its own persistence slot, separate from the main flag data source, so the
/// two have to be reconciled at startup.
pub trait ForceSvgSource: Send + Sync + 'static {
    fn get_flag(&self) -> bool;
    fn set_flag(&self, value: bool);
}

#[derive(Default)]
pub struct Generic {
    value: AtomicBool,
}

impl Generic {
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }
}

impl ForceSvgSource for Generic {
    fn get_flag(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    fn set_flag(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }
}
