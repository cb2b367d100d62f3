//! Error types for hidapi operations

use thiserror::Error;

/// Errors surfaced by this binding.
#[derive(Error, Debug)]
pub enum HidError {
    /// A native call returned the -1 failure sentinel.
    ///
    /// `message` carries hidapi's own error text for the device and is
    /// `None` on platforms where `hid_error` is not implemented. Absent
    /// means "no error information available", not "no error occurred".
    #[error("hidapi call failed: {}", .message.as_deref().unwrap_or("no error message available"))]
    NativeOperationFailed { message: Option<String> },

    #[error("failed to load hidapi library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    #[error("hid_init failed")]
    InitFailed,

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device path contains an interior NUL byte")]
    InvalidPath(#[from] std::ffi::NulError),
}

pub type Result<T> = std::result::Result<T, HidError>;
