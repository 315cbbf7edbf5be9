//! Centralized constants for the configuration subsystem.

/// Default prefix selecting environment variables as configuration input.
pub const XRPC_PREFIX: &str = "XRPC_";

/// Default encoding for byte-valued file locations.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// File suffixes recognized as config scripts when dispatching a location.
pub const CONFIG_FILE_SUFFIXES: &[&str] = &[".conf", ".cfg"];

/// Environment variable that disables `.env` bootstrap when set to `1`/`true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";
