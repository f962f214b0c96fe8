use crate::flags::{FlagName, FlagOverrides};

#[derive(Default)]
pub struct Generic {
    overrides: FlagOverrides,
}

impl Generic {
    pub fn new(overrides: FlagOverrides) -> Self {
        Self { overrides }
    }
}

impl super::FlagDataSource for Generic {
    type Error = std::convert::Infallible;

    async fn fetch_flags(&self) -> Result<FlagOverrides, Self::Error> {
        Ok(self.overrides.clone())
    }

    async fn persist_overrides(&mut self, overrides: FlagOverrides) -> Result<(), Self::Error> {
        self.overrides.merge_from(&overrides);
        Ok(())
    }

    async fn reset_override(&mut self, flag: FlagName) -> Result<(), Self::Error> {
        self.overrides.clear(flag);
        Ok(())
    }

    async fn reset_all_overrides(&mut self) -> Result<(), Self::Error> {
        self.overrides = FlagOverrides::default();
        Ok(())
    }
}
