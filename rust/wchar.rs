//! Platform-native wide-string decoding
//!
//! hidapi reports device strings as null-terminated `wchar_t` sequences:
//! 4-byte Unicode scalars on Unix, 2-byte UTF-16 units on Windows. Invalid
//! units decode to U+FFFD rather than failing.

use libc::wchar_t;

/// Decode a wide-character buffer up to the first null unit.
pub fn decode_wide(units: &[wchar_t]) -> String {
    let len = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    decode_units(&units[..len])
}

/// Decode a native null-terminated wide string; `None` for a null pointer.
///
/// # Safety
///
/// `ptr` must be null or point to a null-terminated `wchar_t` sequence
/// valid for reads up to its terminator.
pub(crate) unsafe fn decode_wide_ptr(ptr: *const wchar_t) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let mut len = 0usize;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    Some(decode_units(std::slice::from_raw_parts(ptr, len)))
}

#[cfg(windows)]
fn decode_units(units: &[wchar_t]) -> String {
    let utf16: Vec<u16> = units.iter().map(|&u| u as u16).collect();
    String::from_utf16_lossy(&utf16)
}

#[cfg(not(windows))]
fn decode_units(units: &[wchar_t]) -> String {
    units
        .iter()
        .map(|&u| char::from_u32(u as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
