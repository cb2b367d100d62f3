//! Runtime-loaded Rust bindings to the hidapi HID access library
//!
//! The native library is resolved with the platform's dynamic loader at
//! startup rather than linked at build time, so the crate compiles and
//! tests on hosts without a hidapi development install.
//!
//! The binding is a direct passthrough: buffers are sized and primed
//! exactly as hidapi expects, wide-character strings are decoded with the
//! platform's `wchar_t` width, and the library's -1 failure sentinel
//! becomes [`HidError::NativeOperationFailed`] carrying hidapi's own error
//! text.

mod buffer;
mod context;
mod device;
mod device_info;
mod error;
mod ffi;
mod wchar;

pub use context::HidApi;
pub use device::HidDevice;
pub use device_info::DeviceInfo;
pub use error::{HidError, Result};

// Re-export for benchmarks
pub use buffer::ReportBuffer;
pub use wchar::decode_wide;
