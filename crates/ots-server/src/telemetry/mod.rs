//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No secret material** may appear in any span attribute or log field:
//!   plaintext, passphrases, the master key and full opaque keys are never
//!   recorded. Keys are logged as an 8-character prefix.
//! - HTTP spans carry the matched route template (`/secrets/:key`), never the
//!   request URI.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by
//!   `RUST_LOG` when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
