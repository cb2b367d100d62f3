//! HID device information from enumeration

use std::ffi::CStr;
use std::fmt;

use crate::ffi::RawDeviceInfo;
use crate::wchar;

/// Owned snapshot of one entry in the native enumeration list.
///
/// Wide string fields are `None` when the native library reported no
/// string for the device (common for devices the process may not open).
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    path: String,
    vendor_id: u16,
    product_id: u16,
    serial_number: Option<String>,
    release_number: u16,
    manufacturer_string: Option<String>,
    product_string: Option<String>,
    usage_page: u16,
    usage: u16,
    interface_number: i32,
}

impl DeviceInfo {
    /// Copy a native list node into owned memory.
    ///
    /// # Safety
    ///
    /// `raw`'s string pointers must each be null or point to a valid
    /// null-terminated string, as hidapi guarantees for list nodes.
    pub(crate) unsafe fn from_raw(raw: &RawDeviceInfo) -> Self {
        let path = if raw.path.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw.path).to_string_lossy().into_owned()
        };
        Self {
            path,
            vendor_id: raw.vendor_id,
            product_id: raw.product_id,
            serial_number: wchar::decode_wide_ptr(raw.serial_number),
            release_number: raw.release_number,
            manufacturer_string: wchar::decode_wide_ptr(raw.manufacturer_string),
            product_string: wchar::decode_wide_ptr(raw.product_string),
            usage_page: raw.usage_page,
            usage: raw.usage,
            interface_number: raw.interface_number,
        }
    }

    /// Platform path usable with [`crate::HidApi::open_path`].
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    /// Device release number in binary-coded decimal.
    pub fn release_number(&self) -> u16 {
        self.release_number
    }

    pub fn manufacturer_string(&self) -> Option<&str> {
        self.manufacturer_string.as_deref()
    }

    pub fn product_string(&self) -> Option<&str> {
        self.product_string.as_deref()
    }

    pub fn usage_page(&self) -> u16 {
        self.usage_page
    }

    pub fn usage(&self) -> u16 {
        self.usage
    }

    pub fn interface_number(&self) -> i32 {
        self.interface_number
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceInfo(vendor_id=0x{:04x}, product_id=0x{:04x}, interface={})",
            self.vendor_id, self.product_id, self.interface_number
        )
    }
}
