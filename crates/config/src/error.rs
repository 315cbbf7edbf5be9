//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define one variant per failure class so callers can tell "your config
//!   file threw" from "the file is unreadable" from "the import path is
//!   unknown".
//! - Chain underlying causes (`ScriptError`, `std::io::Error`) via `source`.
//!
//! Invariants:
//! - Missing-variable errors enumerate every missing name, not just the first.
//! - Dotenv errors never include raw `.env` line contents.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use xrpc_plugin::RegistryError;

/// Errors raised while executing a config script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("name '{name}' is not defined at line {line}")]
    UndefinedName { name: String, line: usize },
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("the following environment variables are not set: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("could not execute config file {}", .path.display())]
    FileExec {
        path: PathBuf,
        #[source]
        source: ScriptError,
    },

    #[error("could not read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not import '{path}': {reason}")]
    Import { path: String, reason: String },

    #[error("config has no '{0}'")]
    MissingKey(String),

    #[error("unsupported encoding '{0}': byte locations must be utf-8")]
    UnsupportedEncoding(String),

    #[error("location bytes are not valid {encoding}")]
    Decode { encoding: String },

    /// The `.env` file has invalid syntax.
    ///
    /// Carries only the byte index of the failure, never the offending line,
    /// so secrets cannot leak into logs.
    #[error("failed to parse .env file at position {error_index}")]
    DotenvParse { error_index: usize },

    #[error("failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    #[error("failed to load .env file")]
    DotenvUnknown,
}
