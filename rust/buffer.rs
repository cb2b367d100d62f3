//! Per-call report buffers
//!
//! Every data-bearing native call gets its own fixed-length buffer, created
//! for that call and discarded with it. Nothing here is shared or reused
//! across calls.

/// Fixed-length byte region handed to a single native call.
///
/// hidapi requires a zero leading byte for correct report-ID handling on
/// some platforms, so buffers always start fully zeroed.
pub struct ReportBuffer {
    data: Vec<u8>,
}

impl ReportBuffer {
    /// Zero-filled buffer of exactly `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    /// Buffer primed for `hid_get_feature_report`: byte 0 carries the
    /// requested report ID when there is room for a payload after it.
    pub fn for_feature_report(report_id: u8, len: usize) -> Self {
        let mut buf = Self::zeroed(len);
        if len > 1 {
            buf.data[0] = report_id;
        }
        buf
    }

    /// Buffer holding a caller-supplied payload, sized exactly to it.
    ///
    /// No padding and no implicit report ID: callers whose device uses
    /// numbered reports put the ID in `data[0]` themselves.
    pub fn from_payload(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
