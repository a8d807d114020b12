use std::time::Duration;

/// Process-wide configuration of the sync runner.
#[derive(Clone, Debug)]
pub struct Profile {
    /// When set, both sync tasks return success without side effects.
    pub readonly: bool,
    /// Hard deadline applied to every driver call.
    pub sync_timeout: Duration,
    /// Period of the instance tick.
    pub instance_sync_interval: Duration,
    /// Period of the database tick that drains the coalescing queue.
    pub database_sync_checker_interval: Duration,
    /// Cap on concurrently outstanding sync tasks per tick pool.
    pub maximum_outstanding: usize,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            readonly: false,
            sync_timeout: Duration::from_secs(15 * 60),
            instance_sync_interval: Duration::from_secs(15 * 60),
            database_sync_checker_interval: Duration::from_secs(5),
            maximum_outstanding: 100,
        }
    }
}

impl Profile {
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}
