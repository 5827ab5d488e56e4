//! Background analysis with explicit result handoff
//!
//! A detection pass runs on its own thread and delivers exactly one
//! `Result<ResultTable>` through a channel. The caller polls or blocks on
//! the [`PendingAnalysis`] handle; nothing is shared between the worker and
//! the caller besides the read-only source image.
//!
//! [`AnalysisSession`] keeps only the most recent submission. A newer
//! submission drops the older handle, so a stale completion is discarded
//! instead of overwriting a fresher table.

use image::RgbImage;
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::config::DetectionParameters;
use crate::error::{AnalysisError, Result};
use crate::pipeline::analyze;
use crate::table::ResultTable;

/// Handle to an analysis running on a background thread
#[derive(Debug)]
pub struct PendingAnalysis {
    receiver: Receiver<Result<ResultTable>>,
}

impl PendingAnalysis {
    /// Take the result if the worker has finished
    ///
    /// Returns `None` while the analysis is still running. The result is
    /// handed over once; polling again afterwards reports a `Worker` error.
    pub fn try_result(&self) -> Option<Result<ResultTable>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(disconnected())),
        }
    }

    /// Block until the worker delivers its result
    pub fn wait(self) -> Result<ResultTable> {
        self.receiver.recv().map_err(|_| disconnected())?
    }
}

fn disconnected() -> AnalysisError {
    AnalysisError::Worker {
        message: "analysis thread exited without a result".to_string(),
    }
}

/// Run [`analyze`] on a background thread
///
/// # Errors
///
/// Returns `Io` if the thread cannot be spawned.
pub fn spawn_analysis(
    image: Arc<RgbImage>,
    params: DetectionParameters,
) -> Result<PendingAnalysis> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("tlc-analysis".to_string())
        .spawn(move || {
            let result = analyze(&image, &params);
            // receiver is gone when the submission was superseded
            if sender.send(result).is_err() {
                debug!("Discarding result of a superseded analysis");
            }
        })?;
    Ok(PendingAnalysis { receiver })
}

/// Outcome of polling an [`AnalysisSession`]
#[derive(Debug)]
pub enum SessionStatus {
    /// Nothing has been submitted since the last completion
    Idle,
    /// The latest submission is still running
    Running,
    /// The latest submission finished and replaced the current table
    Updated { generation: u64 },
    /// The latest submission failed; the current table is unchanged
    Failed {
        generation: u64,
        error: AnalysisError,
    },
}

/// Last-writer-wins holder of the table a presentation layer displays
#[derive(Debug, Default)]
pub struct AnalysisSession {
    generation: u64,
    pending: Option<(u64, PendingAnalysis)>,
    current: Option<ResultTable>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start analyzing `image`, superseding any submission still running
    ///
    /// Returns the generation number of the new submission.
    pub fn submit(&mut self, image: Arc<RgbImage>, params: DetectionParameters) -> Result<u64> {
        let pending = spawn_analysis(image, params)?;
        self.generation += 1;
        if let Some((stale, _)) = self.pending.replace((self.generation, pending)) {
            debug!(
                "Submission {} superseded by {}",
                stale, self.generation
            );
        }
        Ok(self.generation)
    }

    /// Check the latest submission without blocking
    pub fn poll(&mut self) -> SessionStatus {
        let Some((generation, pending)) = &self.pending else {
            return SessionStatus::Idle;
        };
        let generation = *generation;
        match pending.try_result() {
            None => SessionStatus::Running,
            Some(result) => {
                self.pending = None;
                self.settle(generation, result)
            }
        }
    }

    /// Block until the latest submission completes
    pub fn wait(&mut self) -> SessionStatus {
        match self.pending.take() {
            None => SessionStatus::Idle,
            Some((generation, pending)) => self.settle(generation, pending.wait()),
        }
    }

    fn settle(&mut self, generation: u64, result: Result<ResultTable>) -> SessionStatus {
        match result {
            Ok(table) => {
                self.current = Some(table);
                SessionStatus::Updated { generation }
            }
            Err(error) => {
                warn!("Analysis {} failed: {}", generation, error);
                SessionStatus::Failed { generation, error }
            }
        }
    }

    /// Generation number of the most recent submission
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Table from the most recent successful submission
    pub fn current(&self) -> Option<&ResultTable> {
        self.current.as_ref()
    }
}
