use std::collections::HashSet;

use anyhow::Result;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::MonitorError;

use super::window_titles::{list_windows, WindowEntry};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Source of window titles for live processes.
pub trait ProcessTable: Send + 'static {
    /// Titled top-level windows of processes that are currently alive, in
    /// whatever order the platform reports them.
    fn windows(&mut self) -> Result<Vec<WindowEntry>>;
}

/// [`ProcessTable`] backed by the OS window list, cross-checked against the
/// `sysinfo` process table so windows of exited processes are dropped.
pub struct SystemProcessTable {
    system: System,
    own_pid: u32,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            own_pid: std::process::id(),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn windows(&mut self) -> Result<Vec<WindowEntry>> {
        let windows = list_windows()?;

        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, ProcessRefreshKind::new());
        let alive: HashSet<u32> = self
            .system
            .processes()
            .keys()
            .map(|pid| pid.as_u32())
            .collect();

        Ok(windows
            .into_iter()
            .filter(|w| w.pid != self.own_pid && alive.contains(&w.pid))
            .collect())
    }
}

/// Finds the player process by the prefix of its window title.
pub struct ProcessLocator<T: ProcessTable> {
    table: T,
}

impl<T: ProcessTable> ProcessLocator<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    fn windows(&mut self) -> Option<Vec<WindowEntry>> {
        match self.table.windows() {
            Ok(windows) => Some(windows),
            Err(err) => {
                log_warn!("window list unavailable: {err:#}");
                None
            }
        }
    }

    /// Pid of the first window whose title starts with `title_prefix`.
    /// `None` means the player is not running (or not playing).
    pub fn locate(&mut self, title_prefix: &str) -> Option<u32> {
        let found = self
            .windows()?
            .into_iter()
            .find(|w| w.title.starts_with(title_prefix))
            .map(|w| w.pid);

        match found {
            Some(pid) => log_debug!("located player at pid {pid}"),
            None => log_debug!("no window titled {title_prefix:?}*"),
        }
        found
    }

    /// Current title of `pid`: its window carrying `title_prefix` if there
    /// is one, else its first titled window (a paused player shows a title
    /// without the prefix).
    ///
    /// Fails with [`MonitorError::TargetVanished`] when the process is gone
    /// or has no titled window left.
    pub fn window_title(&mut self, pid: u32, title_prefix: &str) -> Result<String, MonitorError> {
        let owned: Vec<WindowEntry> = self
            .windows()
            .unwrap_or_default()
            .into_iter()
            .filter(|w| w.pid == pid)
            .collect();
        let first = owned.first().cloned();

        owned
            .into_iter()
            .find(|w| w.title.starts_with(title_prefix))
            .or(first)
            .map(|w| w.title)
            .ok_or(MonitorError::TargetVanished { pid })
    }
}
