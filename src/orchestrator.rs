//! Batch orchestration.
//!
//! A batch resolves each selected command against the registry, runs it either
//! against the mock store or over the transport, and folds the outcomes into a
//! [`BatchResult`]. Commands run one after another in selection order. Every
//! failure is captured on the command's own result; a batch run never errors.

use crate::config::ValidatorConfig;
use crate::decoder::{decode_response, operation_label, DecodedValues};
use crate::frame::{decode_hex, encode_hex, validate_frame};
use crate::mock::{MockReply, MockResponseStore};
use crate::progress::{ProgressEvent, ProgressLevel, ProgressSink};
use crate::registry::{CommandDefinition, CommandRegistry, DeviceRole};
use crate::report::{BatchResult, CommandStatus, CommandTestResult, Mode};
use crate::transport::{TcpTransport, Transport, TransportError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("unknown mode '{0}', expected 'mock' or 'live'")]
    UnknownMode(String),
}

/// Invocation payload as posted by a front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub ip_address: String,
    /// `master` or `remote`.
    pub command_type: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub selected_commands: Option<Vec<String>>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_mode() -> String {
    Mode::Mock.as_str().to_string()
}

impl BatchRequest {
    pub fn mode(&self) -> Result<Mode, RequestError> {
        Mode::parse(&self.mode).ok_or_else(|| RequestError::UnknownMode(self.mode.clone()))
    }
}

pub struct BatchOrchestrator<T: Transport = TcpTransport> {
    transport: T,
    registry: &'static CommandRegistry,
    mock: Arc<MockResponseStore>,
    config: ValidatorConfig,
}

impl BatchOrchestrator<TcpTransport> {
    /// TCP transport on the configured port.
    pub fn from_config(config: ValidatorConfig) -> Self {
        let transport = TcpTransport::with_port(config.port).read_buffer_size(config.read_buffer_size);
        Self::new(transport, config)
    }
}

impl Default for BatchOrchestrator<TcpTransport> {
    fn default() -> Self {
        Self::from_config(ValidatorConfig::default())
    }
}

impl<T: Transport> BatchOrchestrator<T> {
    pub fn new(transport: T, config: ValidatorConfig) -> Self {
        Self {
            transport,
            registry: CommandRegistry::global(),
            mock: MockResponseStore::global(),
            config,
        }
    }

    pub fn with_mock_store(mut self, store: Arc<MockResponseStore>) -> Self {
        self.mock = store;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a batch.
    ///
    /// `category` names the device role (`master` / `remote`, any case). With no
    /// selection the role's full command set runs, queries first. An unknown
    /// category with no selection yields an `ERROR` result holding no commands.
    pub async fn run_batch(
        &self,
        target_address: &str,
        category: &str,
        mode: Mode,
        selected_commands: Option<&[String]>,
        timeout_seconds: Option<u64>,
        sink: Option<&dyn ProgressSink>,
    ) -> BatchResult {
        let started = Instant::now();
        let role = DeviceRole::parse(category);
        let timeout = self.config.effective_timeout(timeout_seconds);
        if let Some(requested) = timeout_seconds {
            if Duration::from_secs(requested) != timeout {
                warn!(requested, applied = timeout.as_secs(), "Timeout override clamped");
            }
        }

        let commands: Vec<String> = match selected_commands {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => role
                .map(|r| {
                    self.registry
                        .role_command_names(r)
                        .into_iter()
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        if commands.is_empty() {
            let reason = format!("No commands available for category '{}'", category);
            warn!(category, "{}", reason);
            emit(sink, ProgressLevel::Error, reason.clone()).await;
            finish(sink).await;
            return BatchResult::failed_to_start(category, mode, target_address, reason);
        }

        info!(
            address = target_address,
            category,
            mode = mode.as_str(),
            commands = commands.len(),
            "Starting batch"
        );
        emit(
            sink,
            ProgressLevel::Info,
            format!(
                "Starting {} validation of {} {} commands against {}",
                mode,
                commands.len(),
                category,
                target_address
            ),
        )
        .await;

        let total = commands.len();
        let mut results = Vec::with_capacity(total);
        for (index, command) in commands.iter().enumerate() {
            emit(
                sink,
                ProgressLevel::Info,
                format!("[{}/{}] Executing {}", index + 1, total, command),
            )
            .await;

            let result = self
                .execute_command(role, category, command, mode, target_address, timeout, sink)
                .await;

            let level = match result.status {
                CommandStatus::Pass => ProgressLevel::Success,
                CommandStatus::Fail | CommandStatus::Timeout => ProgressLevel::Warning,
                CommandStatus::Error => ProgressLevel::Error,
            };
            emit(
                sink,
                level,
                format!(
                    "{} {}: {} ({:.1} ms)",
                    command,
                    result.status.as_str(),
                    result.message,
                    result.duration_millis
                ),
            )
            .await;
            results.push(result);

            if mode == Mode::Live && index + 1 < total && self.config.pacing_millis > 0 {
                tokio::time::sleep(self.config.pacing()).await;
            }
        }

        let batch = BatchResult::from_results(
            category,
            mode,
            target_address,
            results,
            elapsed_millis(started),
            self.config.pass_threshold_percent,
        );

        let stats = &batch.statistics;
        info!(
            status = batch.overall_status.as_str(),
            passed = stats.passed,
            total = stats.total,
            "Batch finished"
        );
        emit(
            sink,
            ProgressLevel::Info,
            format!(
                "Summary: {} - {}/{} passed ({:.1}%), {} failed, {} timed out, {} errors",
                batch.overall_status.as_str(),
                stats.passed,
                stats.total,
                stats.success_rate_percent,
                stats.failed,
                stats.timed_out,
                stats.errored
            ),
        )
        .await;
        finish(sink).await;

        batch
    }

    /// Blocking wrapper around [`run_batch`](Self::run_batch).
    ///
    /// Spins up a current-thread runtime, so it must not be called from inside
    /// an async context.
    pub fn run_batch_blocking(
        &self,
        target_address: &str,
        category: &str,
        mode: Mode,
        selected_commands: Option<&[String]>,
        timeout_seconds: Option<u64>,
    ) -> BatchResult {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.run_batch(
                target_address,
                category,
                mode,
                selected_commands,
                timeout_seconds,
                None,
            )),
            Err(e) => BatchResult::failed_to_start(
                category,
                mode,
                target_address,
                format!("cannot start runtime: {}", e),
            ),
        }
    }

    pub async fn run_request(
        &self,
        request: &BatchRequest,
        sink: Option<&dyn ProgressSink>,
    ) -> Result<BatchResult, RequestError> {
        let mode = request.mode()?;
        Ok(self
            .run_batch(
                &request.ip_address,
                &request.command_type,
                mode,
                request.selected_commands.as_deref(),
                request.timeout_seconds,
                sink,
            )
            .await)
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_command(
        &self,
        role: Option<DeviceRole>,
        category: &str,
        command: &str,
        mode: Mode,
        target_address: &str,
        timeout: Duration,
        sink: Option<&dyn ProgressSink>,
    ) -> CommandTestResult {
        let started = Instant::now();

        let resolved = role.and_then(|r| self.registry.resolve(r, command).map(|d| (r, d)));
        let result = match resolved {
            None => CommandTestResult::new(
                command,
                category,
                CommandStatus::Error,
                format!("Frame not found for command '{}'", command),
            )
            .with_error("FrameNotFound"),
            Some((_, def)) if !validate_frame(&def.frame_hex) => CommandTestResult::new(
                command,
                def.category.as_str(),
                CommandStatus::Error,
                format!("Invalid frame format for '{}'", command),
            )
            .with_error(format!("InvalidFrameFormat: {}", def.frame_hex)),
            Some((role, def)) => match mode {
                Mode::Mock => self.execute_mock(role, def, sink).await,
                Mode::Live => self.execute_live(def, target_address, timeout, sink).await,
            },
        };

        result.with_duration(elapsed_millis(started))
    }

    async fn execute_mock(
        &self,
        role: DeviceRole,
        def: &CommandDefinition,
        sink: Option<&dyn ProgressSink>,
    ) -> CommandTestResult {
        emit(sink, ProgressLevel::Debug, format!("TX {}: {}", def.name, def.frame_hex)).await;

        let latency = {
            let (min, max) = (self.config.mock_latency_min_millis, self.config.mock_latency_max_millis);
            if max > min {
                rand::thread_rng().gen_range(min..=max)
            } else {
                min
            }
        };
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let category = def.category.as_str();
        match self.mock.reply(role, def.name, def.is_set_command) {
            MockReply::Recorded(bytes) | MockReply::GenericAck(bytes) => {
                let hex = encode_hex(&bytes);
                emit(sink, ProgressLevel::Debug, format!("RX {}: {}", def.name, hex)).await;

                let (message, values) = response_outcome(def, &bytes, "Mock");
                CommandTestResult::new(def.name, category, CommandStatus::Pass, message)
                    .with_response(hex)
                    .with_values(values)
            }
            MockReply::Missing => CommandTestResult::new(
                def.name,
                category,
                CommandStatus::Fail,
                format!("No mock response recorded for '{}'", def.name),
            )
            .with_error("MissingMockResponse"),
        }
    }

    async fn execute_live(
        &self,
        def: &CommandDefinition,
        target_address: &str,
        timeout: Duration,
        sink: Option<&dyn ProgressSink>,
    ) -> CommandTestResult {
        let category = def.category.as_str();
        let frame = match decode_hex(&def.frame_hex) {
            Ok(bytes) => bytes,
            Err(e) => {
                return CommandTestResult::new(
                    def.name,
                    category,
                    CommandStatus::Error,
                    format!("Invalid frame format for '{}'", def.name),
                )
                .with_error(e.to_string())
            }
        };

        debug!(command = def.name, frame = %def.frame_hex, "Sending frame");
        emit(sink, ProgressLevel::Debug, format!("TX {}: {}", def.name, def.frame_hex)).await;

        match self.transport.send(target_address, &frame, timeout).await {
            Ok(bytes) if bytes.is_empty() => CommandTestResult::new(
                def.name,
                category,
                CommandStatus::Fail,
                "No response received",
            ),
            Ok(bytes) => {
                let hex = encode_hex(&bytes);
                debug!(command = def.name, response = %hex, "Received response");
                emit(sink, ProgressLevel::Debug, format!("RX {}: {}", def.name, hex)).await;

                let (message, values) = response_outcome(def, &bytes, "Device");
                CommandTestResult::new(def.name, category, CommandStatus::Pass, message)
                    .with_response(hex)
                    .with_values(values)
            }
            Err(e @ TransportError::Timeout { .. }) => {
                warn!(command = def.name, error = %e, "Command timed out");
                CommandTestResult::new(
                    def.name,
                    category,
                    CommandStatus::Timeout,
                    format!("Timeout after {} s", timeout.as_secs_f64()),
                )
                .with_error(e.to_string())
            }
            Err(e) => {
                warn!(command = def.name, error = %e, "Transport failure");
                CommandTestResult::new(def.name, category, CommandStatus::Error, "Transport error")
                    .with_error(e.to_string())
            }
        }
    }
}

/// Message and decoded values for a received answer. SET commands only carry
/// the acknowledged operation.
fn response_outcome(def: &CommandDefinition, response: &[u8], source: &str) -> (String, DecodedValues) {
    if def.is_set_command {
        (
            format!("{} acknowledged SET: {}", source, operation_label(def.name)),
            DecodedValues::new(),
        )
    } else {
        (
            format!("{} response received ({} bytes)", source, response.len()),
            decode_response(def.name, response),
        )
    }
}

async fn emit(sink: Option<&dyn ProgressSink>, level: ProgressLevel, message: String) {
    if let Some(sink) = sink {
        let event = ProgressEvent::new(level, message);
        if let Err(e) = sink.notify(&event).await {
            warn!(error = %e, "Progress sink rejected event");
        }
    }
}

async fn finish(sink: Option<&dyn ProgressSink>) {
    if let Some(sink) = sink {
        if let Err(e) = sink.finish().await {
            warn!(error = %e, "Progress sink failed to close");
        }
    }
}

fn elapsed_millis(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
