// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Append-only, bounded, tagged binary execution log (component C3).

use heapless::Vec;
use oat_api::{EventTag, MAX_LOG_SIZE};

/// Outcome of a `read_log` export.
pub enum ReadLogOutcome {
    /// The log was copied into the caller's buffer; `usize` is its length.
    Copied(usize),
    /// The caller's buffer was too small; `usize` is the size that would be
    /// needed. No bytes were written.
    ShortBuffer(usize),
}

/// Tagged append-only log of observed control-flow events. Writing an event
/// that would not fit is dropped silently and the digest is unaffected —
/// attestation must not fail-closed on log pressure, since that would let
/// an adversary force a denial of attestation by inflating traffic.
/// Verifiers therefore rely on the digest for integrity and the log only
/// for diagnostics.
pub struct EventLog {
    bytes: Vec<u8, MAX_LOG_SIZE>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { bytes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Appends `tag` followed by `payload`, or drops the whole record if it
    /// would not fit.
    fn append(&mut self, tag: EventTag, payload: &[u8]) {
        if self.bytes.len() + 1 + payload.len() > MAX_LOG_SIZE {
            log::warn!(
                "execution log full at {} bytes, dropping {:?} event",
                self.bytes.len(),
                tag
            );
            return;
        }
        // Capacity was just checked, so these pushes cannot fail.
        let _ = self.bytes.push(tag as u8);
        let _ = self.bytes.extend_from_slice(payload);
    }

    pub fn append_branch(&mut self, payload: &[u8]) {
        self.append(EventTag::Branch, payload);
    }

    pub fn append_indirect(&mut self, target: u64) {
        self.append(EventTag::Indirect, &target.to_le_bytes());
    }

    pub fn append_return(&mut self, func_id: u32) {
        self.append(EventTag::Return, &func_id.to_le_bytes());
    }

    /// Non-destructive export: the log is not cleared by reading it.
    pub fn read_log(&self, out: &mut [u8]) -> ReadLogOutcome {
        if out.len() < self.bytes.len() {
            return ReadLogOutcome::ShortBuffer(self.bytes.len());
        }
        out[..self.bytes.len()].copy_from_slice(&self.bytes);
        ReadLogOutcome::Copied(self.bytes.len())
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_record_format() {
        let mut log = EventLog::new();
        log.append_branch(b"1");
        let mut out = [0u8; 8];
        match log.read_log(&mut out) {
            ReadLogOutcome::Copied(n) => assert_eq!(&out[..n], &[0x01, b'1']),
            ReadLogOutcome::ShortBuffer(_) => panic!("unexpected short buffer"),
        }
    }

    #[test]
    fn indirect_record_format() {
        let mut log = EventLog::new();
        log.append_indirect(0x0000_0001_DEAD_BEEFu64);
        let mut out = [0u8; 16];
        match log.read_log(&mut out) {
            ReadLogOutcome::Copied(n) => {
                assert_eq!(&out[..n], &[0x02, 0xEF, 0xBE, 0xAD, 0xDE, 0x01, 0x00, 0x00, 0x00])
            }
            ReadLogOutcome::ShortBuffer(_) => panic!("unexpected short buffer"),
        }
    }

    #[test]
    fn return_record_format() {
        let mut log = EventLog::new();
        log.append_return(0x1B2);
        let mut out = [0u8; 8];
        match log.read_log(&mut out) {
            ReadLogOutcome::Copied(n) => assert_eq!(&out[..n], &[0x03, 0xB2, 0x01, 0x00, 0x00]),
            ReadLogOutcome::ShortBuffer(_) => panic!("unexpected short buffer"),
        }
    }

    #[test]
    fn short_buffer_reports_needed_size_and_writes_nothing() {
        let mut log = EventLog::new();
        for _ in 0..20 {
            log.append_branch(b"1");
        }
        assert_eq!(log.len(), 40);

        let mut out = [0xAAu8; 10];
        match log.read_log(&mut out) {
            ReadLogOutcome::ShortBuffer(needed) => assert_eq!(needed, 40),
            ReadLogOutcome::Copied(_) => panic!("expected short buffer"),
        }
        assert!(out.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn overflow_drops_events_but_keeps_earlier_ones() {
        let mut log = EventLog::new();
        // Fill to within one byte of capacity with single-byte branch
        // records (2 bytes each: tag + payload).
        while log.len() + 2 <= MAX_LOG_SIZE {
            log.append_branch(b"1");
        }
        let full_len = log.len();
        // A return record needs 5 bytes; it cannot fit and is dropped.
        log.append_return(0xFF);
        assert_eq!(log.len(), full_len);
    }

    #[test]
    fn read_is_non_destructive() {
        let mut log = EventLog::new();
        log.append_branch(b"1");
        let mut out = [0u8; 8];
        let _ = log.read_log(&mut out);
        assert_eq!(log.len(), 2);
        let _ = log.read_log(&mut out);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn reset_clears_cursor() {
        let mut log = EventLog::new();
        log.append_branch(b"1");
        log.reset();
        assert_eq!(log.len(), 0);
    }
}
