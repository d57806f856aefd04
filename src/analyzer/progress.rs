// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fire-and-forget progress reporting for analysis runs

use serde::Serialize;
use tokio::sync::mpsc;

/// Steps reported by the pipeline: search, scrape, summarize, synthesize
pub const TOTAL_STEPS: u32 = 4;

/// One progress event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub message: String,
    pub step: u32,
    pub total_steps: u32,
    pub completed: bool,
}

/// Progress destination handed to the pipeline.
///
/// Emission never blocks and never fails; a closed or absent receiver is
/// silently ignored so reporting cannot affect the analysis itself.
#[derive(Clone, Default)]
pub struct ProgressSink {
    sender: Option<mpsc::UnboundedSender<ProgressUpdate>>,
}

impl ProgressSink {
    /// Sink that discards all updates.
    pub fn noop() -> Self {
        Self { sender: None }
    }

    /// Sink paired with a receiver for callers that want the events.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn emit(&self, message: impl Into<String>, step: u32, completed: bool) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressUpdate {
                message: message.into(),
                step,
                total_steps: TOTAL_STEPS,
                completed,
            });
        }
    }
}
