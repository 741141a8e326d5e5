use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

use crate::agent::Outcome;

/// Summary of one query handled by the agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RunReport {
    pub duration: Duration,
    pub used_memory_bytes: u64,
    pub llm_calls: usize,
    pub tool_calls: usize,
    pub corrections: usize,
    pub outcome: String,
    pub success: bool,
}

impl RunReport {
    pub fn success_rate(reports: &[Self]) -> f32 {
        if reports.is_empty() {
            return 0.0;
        }
        let successes = reports.iter().filter(|r| r.success).count();
        successes as f32 / reports.len() as f32
    }
}

#[derive(Default, Clone)]
pub struct MetricsTracker {
    reports: Arc<Mutex<Vec<RunReport>>>,
    capacity: Option<usize>,
}

impl MetricsTracker {
    /// Keeps only the most recent `capacity` reports.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reports: Arc::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn start_run(&self) -> RunGuard {
        RunGuard {
            start: Instant::now(),
            llm_calls: 0,
            tool_calls: 0,
            corrections: 0,
            metrics: self.clone(),
        }
    }

    pub fn reports(&self) -> Vec<RunReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

/// Per-query counters, folded into a [`RunReport`] by [`RunGuard::finish`].
pub struct RunGuard {
    start: Instant,
    llm_calls: usize,
    tool_calls: usize,
    corrections: usize,
    metrics: MetricsTracker,
}

impl RunGuard {
    pub fn record_llm_call(&mut self) {
        self.llm_calls += 1;
    }

    pub fn record_tool_call(&mut self) {
        self.tool_calls += 1;
    }

    pub fn record_correction(&mut self) {
        self.corrections += 1;
    }

    pub fn finish(self, outcome: &Outcome) -> RunReport {
        let duration = self.start.elapsed();
        let mut system = System::new();
        system.refresh_memory();
        let report = RunReport {
            duration,
            used_memory_bytes: system.used_memory(),
            llm_calls: self.llm_calls,
            tool_calls: self.tool_calls,
            corrections: self.corrections,
            outcome: outcome.kind().to_string(),
            success: outcome.is_success(),
        };
        info!(
            outcome = %report.outcome,
            duration_ms = report.duration.as_millis() as u64,
            llm_calls = report.llm_calls,
            tool_calls = report.tool_calls,
            corrections = report.corrections,
            "run report"
        );
        if let Ok(mut reports) = self.metrics.reports.lock() {
            reports.push(report.clone());
            if let Some(capacity) = self.metrics.capacity {
                let excess = reports.len().saturating_sub(capacity);
                reports.drain(..excess);
            }
        }
        report
    }
}
