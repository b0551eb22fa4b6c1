//! Graceful shutdown handling for the console host.
//!
//! Ctrl-C and `/quit` both land here; the driver loop polls the flag between
//! ticks and saves once before exiting.

use crate::app::session::Session;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Manages graceful shutdown of the application.
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
    save_path: Option<PathBuf>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            save_path: None,
        }
    }

    /// Snapshot file written on exit. `None` disables the save.
    pub fn set_save_path(&mut self, path: Option<PathBuf>) {
        self.save_path = path;
    }

    pub fn save_path(&self) -> Option<&PathBuf> {
        self.save_path.as_ref()
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Sets the flag when the process receives Ctrl-C.
    pub fn listen_for_ctrl_c(&self) {
        let flag = Arc::clone(&self.shutdown_requested);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
                tracing::info!("Ctrl-C received");
            }
        });
    }

    /// Saves the session if a save path is configured.
    pub fn cleanup(&self, session: &Session, now: u64) -> Result<()> {
        tracing::info!("Performing shutdown cleanup...");
        if let Some(path) = &self.save_path {
            tracing::info!(path = %path.display(), "Saving state before exit...");
            session.save(path, now)?;
        }
        tracing::info!("Cleanup complete");
        Ok(())
    }
}
