//! # DRS Validator
//!
//! Batch command validation for DRS RF repeater units (Master and Remote roles)
//! speaking the Santone binary protocol over TCP.
//!
//! ## Features
//!
//! - **Frame codec**: frame construction, structural validation and CRC-16
//! - **Command registry**: named GET queries and generated SET frames per role
//! - **Response decoding**: typed engineering values from device payloads
//! - **Batch orchestration**: live or mock execution with statistics and a PASS/FAIL verdict
//! - **Progress streaming**: `[LEVEL] message` lines to a pluggable sink
//!
//! ## Quick Start
//!
//! ```no_run
//! use drs_validator::{BatchOrchestrator, Mode, OverallStatus};
//!
//! let orchestrator: BatchOrchestrator = BatchOrchestrator::default();
//! let result = orchestrator.run_batch_blocking("192.168.1.100", "master", Mode::Mock, None, None);
//! assert_eq!(result.overall_status, OverallStatus::Pass);
//! ```
//!
//! ## Architecture
//!
//! - [`frame`] - Frame layout, checksum and hex helpers
//! - [`set_commands`] - SET frame synthesis and frequency plans
//! - [`registry`] - Command definitions for each role
//! - [`decoder`] - Response payload decoding
//! - [`mock`] - Canned device answers
//! - [`transport`] - One-shot TCP exchange
//! - [`progress`] - Progress events and sinks
//! - [`report`] - Results, statistics and verdict
//! - [`config`] - Runtime configuration
//! - [`orchestrator`] - Batch execution

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod decoder;
pub mod frame;
pub mod mock;
pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod report;
pub mod set_commands;
pub mod transport;

// Re-export main public types for convenience
pub use config::{ConfigError, ValidatorConfig};
pub use decoder::{decode_response, DecodedValue, DecodedValues};
pub use frame::{build_frame, validate_frame, Frame, FrameError};
pub use mock::MockResponseStore;
pub use orchestrator::{BatchOrchestrator, BatchRequest, RequestError};
pub use progress::{ChannelSink, ConsoleSink, NoopSink, ProgressEvent, ProgressLevel, ProgressSink};
pub use registry::{Category, CommandDefinition, CommandRegistry, DeviceRole};
pub use report::{BatchResult, BatchStatistics, CommandStatus, CommandTestResult, Mode, OverallStatus};
pub use transport::{TcpTransport, Transport, TransportError};
