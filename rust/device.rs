//! HID device handle for read/write/feature-report communication

use std::sync::Arc;

use libc::{c_int, size_t, wchar_t};
use tracing::trace;

use crate::buffer::ReportBuffer;
use crate::error::{HidError, Result};
use crate::ffi::{NativeLib, RawDevice};
use crate::wchar;

/// Wide-character capacity of the buffer used by the string accessors.
///
/// hidapi truncates longer strings to fit; this binding does not grow the
/// buffer or retry on overflow.
const STRING_BUFFER_LEN: usize = 255;

/// Open HID device session.
///
/// The handle is single-owner: it is `Send` but not `Sync`, performs no
/// internal locking, and callers sharing one device across threads must
/// serialize access themselves. Each operation allocates its own buffer;
/// nothing is aliased between calls.
///
/// Dropping the handle closes the native session.
pub struct HidDevice {
    handle: *mut RawDevice,
    lib: Arc<NativeLib>,
}

// The native handle is only touched through methods of the single owner.
unsafe impl Send for HidDevice {}

impl HidDevice {
    /// Wrap a non-null handle returned by `hid_open_path`.
    pub(crate) fn from_raw(handle: *mut RawDevice, lib: Arc<NativeLib>) -> Self {
        Self { handle, lib }
    }

    /// Close the device session.
    ///
    /// Consuming the handle makes use-after-close unrepresentable; the
    /// native `hid_close` runs in `Drop`.
    pub fn close(self) {}

    /// Configure whether subsequent reads block.
    ///
    /// The native return code is not checked: a failure to change the mode
    /// is silent at this layer.
    pub fn set_nonblocking(&self, nonblocking: bool) {
        unsafe { (self.lib.api.hid_set_nonblocking)(self.handle, nonblocking as c_int) };
    }

    /// Blocking read of up to `length` bytes.
    ///
    /// Returns the full `length`-byte buffer, not a slice trimmed to the
    /// bytes actually read; bytes the device did not fill stay zero.
    pub fn read(&self, length: usize) -> Result<Vec<u8>> {
        let mut buf = ReportBuffer::zeroed(length);
        let rc = unsafe { (self.lib.api.hid_read)(self.handle, buf.as_mut_ptr(), buf.len()) };
        trace!(length, rc, "hid_read");
        self.check(rc)?;
        Ok(buf.into_vec())
    }

    /// Read with a timeout in milliseconds.
    ///
    /// An elapsed timeout with no data is indistinguishable from a read of
    /// zero bytes; both return the zero-filled buffer.
    pub fn read_timeout(&self, length: usize, timeout_ms: i32) -> Result<Vec<u8>> {
        let mut buf = ReportBuffer::zeroed(length);
        let rc = unsafe {
            (self.lib.api.hid_read_timeout)(self.handle, buf.as_mut_ptr(), buf.len(), timeout_ms)
        };
        trace!(length, timeout_ms, rc, "hid_read_timeout");
        self.check(rc)?;
        Ok(buf.into_vec())
    }

    /// Write an output report, returning the native byte count.
    ///
    /// The buffer is sized exactly to `data`; if the device uses numbered
    /// reports the report ID goes in `data[0]`, nothing is inserted here.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<usize> {
        let buf = ReportBuffer::from_payload(data.as_ref());
        let rc = unsafe { (self.lib.api.hid_write)(self.handle, buf.as_ptr(), buf.len()) };
        trace!(length = buf.len(), rc, "hid_write");
        Ok(self.check(rc)? as usize)
    }

    /// Read a feature report of `length` bytes.
    ///
    /// Byte 0 of the buffer is primed with `report_id` before the call and
    /// comes back as whatever the device wrote there.
    pub fn get_feature_report(&self, report_id: u8, length: usize) -> Result<Vec<u8>> {
        let mut buf = ReportBuffer::for_feature_report(report_id, length);
        let rc = unsafe {
            (self.lib.api.hid_get_feature_report)(self.handle, buf.as_mut_ptr(), buf.len())
        };
        trace!(report_id, length, rc, "hid_get_feature_report");
        self.check(rc)?;
        Ok(buf.into_vec())
    }

    /// Send a feature report; same packing contract as [`HidDevice::write`].
    pub fn send_feature_report(&self, data: impl AsRef<[u8]>) -> Result<usize> {
        let buf = ReportBuffer::from_payload(data.as_ref());
        let rc =
            unsafe { (self.lib.api.hid_send_feature_report)(self.handle, buf.as_ptr(), buf.len()) };
        trace!(length = buf.len(), rc, "hid_send_feature_report");
        Ok(self.check(rc)? as usize)
    }

    /// Current hidapi error text for this device.
    ///
    /// `hid_error` is only implemented on Windows; elsewhere this returns
    /// `None`, meaning "no error information available", not "no error
    /// occurred".
    pub fn error(&self) -> Option<String> {
        let ptr = unsafe { (self.lib.api.hid_error)(self.handle) };
        unsafe { wchar::decode_wide_ptr(ptr) }
    }

    pub fn manufacturer_string(&self) -> String {
        self.buffered_string(self.lib.api.hid_get_manufacturer_string)
    }

    pub fn product_string(&self) -> String {
        self.buffered_string(self.lib.api.hid_get_product_string)
    }

    pub fn serial_number_string(&self) -> String {
        self.buffered_string(self.lib.api.hid_get_serial_number_string)
    }

    #[deprecated(note = "renamed to `manufacturer_string`")]
    pub fn get_manufacturer_string(&self) -> String {
        self.manufacturer_string()
    }

    #[deprecated(note = "renamed to `product_string`")]
    pub fn get_product_string(&self) -> String {
        self.product_string()
    }

    #[deprecated(note = "renamed to `serial_number_string`")]
    pub fn get_serial_number_string(&self) -> String {
        self.serial_number_string()
    }

    /// Query one of the `hid_get_*_string` accessors into a fixed 255-unit
    /// wide buffer and decode up to the first null.
    fn buffered_string(
        &self,
        getter: unsafe extern "C" fn(*mut RawDevice, *mut wchar_t, size_t) -> c_int,
    ) -> String {
        let mut buf = [0 as wchar_t; STRING_BUFFER_LEN];
        // Status code unchecked: an unreadable string decodes as empty.
        unsafe { getter(self.handle, buf.as_mut_ptr(), buf.len()) };
        wchar::decode_wide(&buf)
    }

    /// The single failure rule: exactly -1 fails, every other return value
    /// (including 0) is success.
    fn check(&self, rc: c_int) -> Result<c_int> {
        if rc == -1 {
            Err(HidError::NativeOperationFailed {
                message: self.error(),
            })
        } else {
            Ok(rc)
        }
    }
}

impl Drop for HidDevice {
    fn drop(&mut self) {
        unsafe { (self.lib.api.hid_close)(self.handle) };
    }
}
