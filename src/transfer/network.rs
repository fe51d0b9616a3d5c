use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Platform seam reporting the current connection type.
pub trait NetworkMonitor: Send + Sync {
    fn is_unmetered(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthPolicy {
    #[default]
    Any,
    UnmeteredOnly,
}

impl BandwidthPolicy {
    pub fn permits(self, network: &dyn NetworkMonitor) -> bool {
        match self {
            BandwidthPolicy::Any => true,
            BandwidthPolicy::UnmeteredOnly => network.is_unmetered(),
        }
    }
}

/// Connection state pushed in by the host platform.
#[derive(Debug)]
pub struct StaticNetwork {
    unmetered: AtomicBool,
}

impl StaticNetwork {
    pub fn new(unmetered: bool) -> Self {
        Self {
            unmetered: AtomicBool::new(unmetered),
        }
    }

    pub fn set_unmetered(&self, unmetered: bool) {
        self.unmetered.store(unmetered, Ordering::Relaxed);
    }
}

impl NetworkMonitor for StaticNetwork {
    fn is_unmetered(&self) -> bool {
        self.unmetered.load(Ordering::Relaxed)
    }
}
