//! Library context: loading, device enumeration and opening

use std::ffi::CString;
use std::sync::Arc;

use tracing::debug;

use crate::device::HidDevice;
use crate::device_info::DeviceInfo;
use crate::error::{HidError, Result};
use crate::ffi::NativeLib;

/// Entry point to the binding.
///
/// Owns the loaded native library; `hid_exit` runs once the context and
/// every device opened through it have been dropped.
pub struct HidApi {
    lib: Arc<NativeLib>,
}

impl HidApi {
    /// Resolve the native hidapi library and initialize it.
    pub fn new() -> Result<Self> {
        let lib = NativeLib::load()?;
        Ok(Self { lib })
    }

    /// List attached HID devices, filtered by vendor/product ID.
    ///
    /// Pass 0 for either ID to match all devices. A device the process is
    /// not permitted to open still shows up here, usually with absent
    /// string fields.
    pub fn enumerate(&self, vendor_id: u16, product_id: u16) -> Vec<DeviceInfo> {
        let head = unsafe { (self.lib.api.hid_enumerate)(vendor_id, product_id) };

        let mut results = Vec::new();
        let mut cur = head;
        while !cur.is_null() {
            unsafe {
                results.push(DeviceInfo::from_raw(&*cur));
                cur = (*cur).next;
            }
        }
        if !head.is_null() {
            unsafe { (self.lib.api.hid_free_enumeration)(head) };
        }

        debug!(
            vendor_id,
            product_id,
            count = results.len(),
            "enumerated HID devices"
        );
        results
    }

    /// Open the first device matching the IDs and, when given, the serial
    /// number.
    pub fn open(
        &self,
        vendor_id: u16,
        product_id: u16,
        serial_number: Option<&str>,
    ) -> Result<HidDevice> {
        for info in self.enumerate(vendor_id, product_id) {
            let serial_matches = match serial_number {
                Some(expected) => info.serial_number() == Some(expected),
                None => true,
            };
            if serial_matches {
                return self.open_path(info.path());
            }
        }
        Err(HidError::DeviceNotFound(format!(
            "{vendor_id:04x}:{product_id:04x}"
        )))
    }

    /// Open a device by the platform path reported during enumeration.
    pub fn open_path(&self, path: &str) -> Result<HidDevice> {
        let c_path = CString::new(path)?;
        let handle = unsafe { (self.lib.api.hid_open_path)(c_path.as_ptr()) };
        if handle.is_null() {
            // hid_open_path reports failure as a null handle, with no
            // device to query for error text.
            return Err(HidError::NativeOperationFailed { message: None });
        }
        debug!(path, "opened HID device");
        Ok(HidDevice::from_raw(handle, self.lib.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    use libc::{c_char, c_int, c_uchar, c_ushort, size_t, wchar_t};

    use super::*;
    use crate::ffi::{NativeApi, RawDevice, RawDeviceInfo};

    fn stub_api() -> NativeApi {
        NativeApi {
            hid_init: ok0,
            hid_exit: ok0,
            hid_enumerate: enumerate_none,
            hid_free_enumeration: free_noop,
            hid_open_path: open_null,
            hid_close: close_noop,
            hid_set_nonblocking: status0,
            hid_read: io0,
            hid_read_timeout: io0_timeout,
            hid_write: out0,
            hid_get_feature_report: io0,
            hid_send_feature_report: out0,
            hid_get_manufacturer_string: string0,
            hid_get_product_string: string0,
            hid_get_serial_number_string: string0,
            hid_error: error_none,
        }
    }

    fn api_with(api: NativeApi) -> HidApi {
        HidApi {
            lib: NativeLib::for_tests(api),
        }
    }

    unsafe extern "C" fn ok0() -> c_int {
        0
    }
    unsafe extern "C" fn enumerate_none(_: c_ushort, _: c_ushort) -> *mut RawDeviceInfo {
        std::ptr::null_mut()
    }
    unsafe extern "C" fn free_noop(_: *mut RawDeviceInfo) {}
    unsafe extern "C" fn open_null(_: *const c_char) -> *mut RawDevice {
        std::ptr::null_mut()
    }
    unsafe extern "C" fn close_noop(_: *mut RawDevice) {}
    unsafe extern "C" fn status0(_: *mut RawDevice, _: c_int) -> c_int {
        0
    }
    unsafe extern "C" fn io0(_: *mut RawDevice, _: *mut c_uchar, _: size_t) -> c_int {
        0
    }
    unsafe extern "C" fn io0_timeout(
        _: *mut RawDevice,
        _: *mut c_uchar,
        _: size_t,
        _: c_int,
    ) -> c_int {
        0
    }
    unsafe extern "C" fn out0(_: *mut RawDevice, _: *const c_uchar, _: size_t) -> c_int {
        0
    }
    unsafe extern "C" fn string0(_: *mut RawDevice, _: *mut wchar_t, _: size_t) -> c_int {
        0
    }
    unsafe extern "C" fn error_none(_: *mut RawDevice) -> *const wchar_t {
        std::ptr::null()
    }

    // Backing storage for a fake two-node enumeration list. The wrapper is
    // only handed out as raw pointers to single-threaded test code.
    struct NodeStorage {
        _paths: Vec<CString>,
        _serials: Vec<Vec<wchar_t>>,
        nodes: Box<[RawDeviceInfo; 2]>,
    }
    unsafe impl Send for NodeStorage {}
    unsafe impl Sync for NodeStorage {}

    static NODES: OnceLock<NodeStorage> = OnceLock::new();
    static FREED: AtomicUsize = AtomicUsize::new(0);

    fn blank_node() -> RawDeviceInfo {
        RawDeviceInfo {
            path: std::ptr::null_mut(),
            vendor_id: 0,
            product_id: 0,
            serial_number: std::ptr::null_mut(),
            release_number: 0,
            manufacturer_string: std::ptr::null_mut(),
            product_string: std::ptr::null_mut(),
            usage_page: 0,
            usage: 0,
            interface_number: 0,
            next: std::ptr::null_mut(),
        }
    }

    fn node_storage() -> &'static NodeStorage {
        NODES.get_or_init(|| {
            let paths = vec![
                CString::new("/dev/hidraw0").unwrap(),
                CString::new("/dev/hidraw1").unwrap(),
            ];
            let serials: Vec<Vec<wchar_t>> = vec![
                "SN-A".chars().map(|c| c as wchar_t).chain([0]).collect(),
                "SN-B".chars().map(|c| c as wchar_t).chain([0]).collect(),
            ];

            let mut nodes = Box::new([blank_node(), blank_node()]);
            nodes[0].path = paths[0].as_ptr() as *mut _;
            nodes[0].vendor_id = 0x1234;
            nodes[0].product_id = 0x0001;
            nodes[0].serial_number = serials[0].as_ptr() as *mut _;
            nodes[1].path = paths[1].as_ptr() as *mut _;
            nodes[1].vendor_id = 0x1234;
            nodes[1].product_id = 0x0002;
            nodes[1].serial_number = serials[1].as_ptr() as *mut _;

            let second: *mut RawDeviceInfo = &mut nodes[1];
            nodes[0].next = second;

            NodeStorage {
                _paths: paths,
                _serials: serials,
                nodes,
            }
        })
    }

    unsafe extern "C" fn enumerate_two(_: c_ushort, _: c_ushort) -> *mut RawDeviceInfo {
        node_storage().nodes.as_ptr() as *mut RawDeviceInfo
    }

    unsafe extern "C" fn free_counting(_: *mut RawDeviceInfo) {
        FREED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_enumerate_walks_and_frees_native_list() {
        let api = api_with(NativeApi {
            hid_enumerate: enumerate_two,
            hid_free_enumeration: free_counting,
            ..stub_api()
        });

        let devices = api.enumerate(0x1234, 0);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].path(), "/dev/hidraw0");
        assert_eq!(devices[0].serial_number(), Some("SN-A"));
        assert_eq!(devices[1].product_id(), 0x0002);
        assert_eq!(FREED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_enumerate_null_list_is_empty() {
        let api = api_with(stub_api());
        assert!(api.enumerate(0, 0).is_empty());
    }

    #[test]
    fn test_open_without_match_is_device_not_found() {
        let api = api_with(stub_api());
        match api.open(0xDEAD, 0xBEEF, None) {
            Err(HidError::DeviceNotFound(which)) => assert_eq!(which, "dead:beef"),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("open succeeded with no devices present"),
        }
    }

    #[test]
    fn test_open_serial_mismatch_is_device_not_found() {
        let api = api_with(NativeApi {
            hid_enumerate: enumerate_two,
            ..stub_api()
        });
        assert!(matches!(
            api.open(0x1234, 0, Some("SN-MISSING")),
            Err(HidError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_open_path_null_handle_is_failure() {
        let api = api_with(stub_api());
        assert!(matches!(
            api.open_path("/dev/hidraw9"),
            Err(HidError::NativeOperationFailed { message: None })
        ));
    }

    #[test]
    fn test_open_path_rejects_interior_nul() {
        let api = api_with(stub_api());
        assert!(matches!(
            api.open_path("bad\0path"),
            Err(HidError::InvalidPath(_))
        ));
    }
}
