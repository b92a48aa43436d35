//! Background scan task
//!
//! The walk can take seconds on large disks, so it runs on a worker thread.
//! The control thread polls for the single completion message.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use crate::scan::pipelines::PrefixScanner;
use crate::scan::types::ScanReport;

pub struct ScanTask {
    rx: Receiver<ScanReport>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl ScanTask {
    pub fn spawn(scanner: PrefixScanner) -> Self {
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let report = scanner.scan_all();
            let _ = tx.send(report);
        });

        Self {
            rx,
            handle: Some(handle),
            finished: false,
        }
    }

    /// Non-blocking. Returns the report exactly once, when the scan is done.
    pub fn poll(&mut self) -> Option<ScanReport> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(report) => {
                self.finish();
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("scan: worker exited without a result");
                self.finish();
                Some(ScanReport::default())
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block until the scan completes.
    pub fn wait(mut self) -> ScanReport {
        let report = self.rx.recv().unwrap_or_else(|_| {
            tracing::warn!("scan: worker exited without a result");
            ScanReport::default()
        });
        self.finish();
        report
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
