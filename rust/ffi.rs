//! Raw hidapi types and runtime symbol resolution
//!
//! Mirrors the function surface published in hidapi.h. Symbols are resolved
//! at runtime with `libloading`, and the bound functions are kept in a plain
//! table so device-level semantics can be exercised in tests against fake
//! `extern "C"` functions with no native library present.

use std::sync::Arc;

use libc::{c_char, c_int, c_uchar, c_ushort, c_void, size_t, wchar_t};
use libloading::Library;
use tracing::debug;

use crate::error::{HidError, Result};

/// Opaque native device session (`hid_device` in hidapi.h).
pub type RawDevice = c_void;

/// One node of the linked list returned by `hid_enumerate`.
///
/// Layout matches `struct hid_device_info` in hidapi.h.
#[repr(C)]
pub struct RawDeviceInfo {
    pub path: *mut c_char,
    pub vendor_id: c_ushort,
    pub product_id: c_ushort,
    pub serial_number: *mut wchar_t,
    pub release_number: c_ushort,
    pub manufacturer_string: *mut wchar_t,
    pub product_string: *mut wchar_t,
    pub usage_page: c_ushort,
    pub usage: c_ushort,
    pub interface_number: c_int,
    pub next: *mut RawDeviceInfo,
}

/// Function table bound against the loaded library.
#[derive(Clone, Copy)]
pub(crate) struct NativeApi {
    pub hid_init: unsafe extern "C" fn() -> c_int,
    pub hid_exit: unsafe extern "C" fn() -> c_int,
    pub hid_enumerate: unsafe extern "C" fn(c_ushort, c_ushort) -> *mut RawDeviceInfo,
    pub hid_free_enumeration: unsafe extern "C" fn(*mut RawDeviceInfo),
    pub hid_open_path: unsafe extern "C" fn(*const c_char) -> *mut RawDevice,
    pub hid_close: unsafe extern "C" fn(*mut RawDevice),
    pub hid_set_nonblocking: unsafe extern "C" fn(*mut RawDevice, c_int) -> c_int,
    pub hid_read: unsafe extern "C" fn(*mut RawDevice, *mut c_uchar, size_t) -> c_int,
    pub hid_read_timeout:
        unsafe extern "C" fn(*mut RawDevice, *mut c_uchar, size_t, c_int) -> c_int,
    pub hid_write: unsafe extern "C" fn(*mut RawDevice, *const c_uchar, size_t) -> c_int,
    pub hid_get_feature_report: unsafe extern "C" fn(*mut RawDevice, *mut c_uchar, size_t) -> c_int,
    pub hid_send_feature_report:
        unsafe extern "C" fn(*mut RawDevice, *const c_uchar, size_t) -> c_int,
    pub hid_get_manufacturer_string:
        unsafe extern "C" fn(*mut RawDevice, *mut wchar_t, size_t) -> c_int,
    pub hid_get_product_string: unsafe extern "C" fn(*mut RawDevice, *mut wchar_t, size_t) -> c_int,
    pub hid_get_serial_number_string:
        unsafe extern "C" fn(*mut RawDevice, *mut wchar_t, size_t) -> c_int,
    pub hid_error: unsafe extern "C" fn(*mut RawDevice) -> *const wchar_t,
}

/// Candidate sonames, tried in order. The hidraw flavor is preferred on
/// Linux because it does not detach kernel drivers.
#[cfg(target_os = "linux")]
const LIBRARY_NAMES: &[&str] = &[
    "libhidapi-hidraw.so.0",
    "libhidapi-hidraw.so",
    "libhidapi-libusb.so.0",
    "libhidapi-libusb.so",
];

#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&str] = &["libhidapi.dylib", "libhidapi.0.dylib"];

#[cfg(windows)]
const LIBRARY_NAMES: &[&str] = &["hidapi.dll"];

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const LIBRARY_NAMES: &[&str] = &["libhidapi.so"];

/// Loaded native library plus its bound function table.
///
/// Shared by the [`crate::HidApi`] context and every device opened through
/// it; `hid_exit` runs when the last reference is dropped.
pub(crate) struct NativeLib {
    pub api: NativeApi,
    lib: Option<Library>,
}

impl NativeLib {
    /// Resolve the native library, bind its symbols and call `hid_init`.
    pub fn load() -> Result<Arc<Self>> {
        let lib = open_library()?;
        let api = unsafe { bind(&lib) }?;
        if unsafe { (api.hid_init)() } != 0 {
            return Err(HidError::InitFailed);
        }
        Ok(Arc::new(Self {
            api,
            lib: Some(lib),
        }))
    }

    /// Table-only instance for exercising the wrapper without a library.
    #[cfg(test)]
    pub fn for_tests(api: NativeApi) -> Arc<Self> {
        Arc::new(Self { api, lib: None })
    }
}

impl Drop for NativeLib {
    fn drop(&mut self) {
        // Only balance hid_init when a real library was loaded.
        if self.lib.is_some() {
            unsafe { (self.api.hid_exit)() };
        }
    }
}

/// Locate libhidapi, honoring the `HIDAPI_LIBRARY_PATH` override.
fn open_library() -> Result<Library> {
    if let Some(path) = std::env::var_os("HIDAPI_LIBRARY_PATH") {
        debug!(?path, "loading hidapi from override path");
        return Ok(unsafe { Library::new(&path) }?);
    }

    let mut last_err = None;
    for name in LIBRARY_NAMES {
        match unsafe { Library::new(name) } {
            Ok(lib) => {
                debug!(library = name, "loaded hidapi");
                return Ok(lib);
            }
            Err(e) => last_err = Some(e),
        }
    }
    // LIBRARY_NAMES is a non-empty const, so the loop always sets last_err.
    Err(HidError::LibraryLoad(
        last_err.expect("at least one library candidate"),
    ))
}

unsafe fn bind(lib: &Library) -> Result<NativeApi> {
    macro_rules! sym {
        ($name:literal) => {
            *lib.get(concat!($name, "\0").as_bytes())?
        };
    }

    Ok(NativeApi {
        hid_init: sym!("hid_init"),
        hid_exit: sym!("hid_exit"),
        hid_enumerate: sym!("hid_enumerate"),
        hid_free_enumeration: sym!("hid_free_enumeration"),
        hid_open_path: sym!("hid_open_path"),
        hid_close: sym!("hid_close"),
        hid_set_nonblocking: sym!("hid_set_nonblocking"),
        hid_read: sym!("hid_read"),
        hid_read_timeout: sym!("hid_read_timeout"),
        hid_write: sym!("hid_write"),
        hid_get_feature_report: sym!("hid_get_feature_report"),
        hid_send_feature_report: sym!("hid_send_feature_report"),
        hid_get_manufacturer_string: sym!("hid_get_manufacturer_string"),
        hid_get_product_string: sym!("hid_get_product_string"),
        hid_get_serial_number_string: sym!("hid_get_serial_number_string"),
        hid_error: sym!("hid_error"),
    })
}
