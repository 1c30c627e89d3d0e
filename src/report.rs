//! Per-command outcomes, batch statistics and the overall verdict.

use crate::decoder::DecodedValues;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success rate at or above which a batch passes.
pub const DEFAULT_PASS_THRESHOLD_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    Pass,
    Fail,
    Timeout,
    Error,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Pass => "PASS",
            CommandStatus::Fail => "FAIL",
            CommandStatus::Timeout => "TIMEOUT",
            CommandStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Pass,
    Fail,
    Error,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Fail => "FAIL",
            OverallStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Mock,
    Live,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Mock => "mock",
            Mode::Live => "live",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Mode::Mock),
            "live" => Some(Mode::Live),
            _ => None,
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandTestResult {
    pub command: String,
    pub category: String,
    pub status: CommandStatus,
    pub message: String,
    pub raw_response_hex: Option<String>,
    pub decoded_values: DecodedValues,
    pub duration_millis: f64,
    pub error_detail: Option<String>,
}

impl CommandTestResult {
    pub fn new(command: &str, category: &str, status: CommandStatus, message: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            category: category.to_string(),
            status,
            message: message.into(),
            raw_response_hex: None,
            decoded_values: DecodedValues::new(),
            duration_millis: 0.0,
            error_detail: None,
        }
    }

    pub fn with_response(mut self, hex: String) -> Self {
        self.raw_response_hex = Some(hex);
        self
    }

    pub fn with_values(mut self, values: DecodedValues) -> Self {
        self.decoded_values = values;
        self
    }

    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn with_duration(mut self, millis: f64) -> Self {
        self.duration_millis = millis;
        self
    }

    pub fn passed(&self) -> bool {
        self.status == CommandStatus::Pass
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub errored: usize,
    pub success_rate_percent: f64,
    pub average_duration_millis: f64,
}

impl BatchStatistics {
    pub fn from_results(results: &[CommandTestResult]) -> Self {
        let mut stats = BatchStatistics {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match result.status {
                CommandStatus::Pass => stats.passed += 1,
                CommandStatus::Fail => stats.failed += 1,
                CommandStatus::Timeout => stats.timed_out += 1,
                CommandStatus::Error => stats.errored += 1,
            }
        }

        if stats.total > 0 {
            let total = stats.total as f64;
            stats.success_rate_percent = stats.passed as f64 / total * 100.0;
            stats.average_duration_millis =
                results.iter().map(|r| r.duration_millis).sum::<f64>() / total;
        }
        stats
    }

    pub fn verdict(&self, threshold_percent: f64) -> OverallStatus {
        if self.total == 0 {
            OverallStatus::Error
        } else if self.success_rate_percent >= threshold_percent {
            OverallStatus::Pass
        } else {
            OverallStatus::Fail
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub overall_status: OverallStatus,
    pub command_category: String,
    pub mode: Mode,
    pub target_address: String,
    pub total_commands: usize,
    pub commands_tested: Vec<String>,
    pub statistics: BatchStatistics,
    pub results: Vec<CommandTestResult>,
    pub duration_millis: f64,
    pub timestamp: DateTime<Utc>,
    /// Set when the batch could not start at all.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl BatchResult {
    pub fn from_results(
        category: &str,
        mode: Mode,
        target_address: &str,
        results: Vec<CommandTestResult>,
        duration_millis: f64,
        threshold_percent: f64,
    ) -> Self {
        let statistics = BatchStatistics::from_results(&results);
        Self {
            overall_status: statistics.verdict(threshold_percent),
            command_category: category.to_string(),
            mode,
            target_address: target_address.to_string(),
            total_commands: results.len(),
            commands_tested: results.iter().map(|r| r.command.clone()).collect(),
            statistics,
            results,
            duration_millis,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Batch that never ran a command.
    pub fn failed_to_start(category: &str, mode: Mode, target_address: &str, reason: impl Into<String>) -> Self {
        let mut result = Self::from_results(category, mode, target_address, Vec::new(), 0.0, DEFAULT_PASS_THRESHOLD_PERCENT);
        result.error = Some(reason.into());
        result
    }
}
