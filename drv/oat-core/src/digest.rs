// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Running digest over the ordered event byte stream (component C1).

use oat_api::{OatError, DIGEST_SIZE};
use sha2::{Digest, Sha256};

/// Digest lifecycle, mirroring the session state machine: `Fresh` before the
/// first `HASH_INIT`, `Running` while folding events, `Finalized` after
/// `HASH_FINAL` until a further `HASH_INIT` starts a new run.
enum State {
    Fresh,
    Running(Sha256),
    Finalized,
}

/// Incremental digest accumulator. Produces a 32-byte tag that is a function
/// of the exact byte sequence presented to `update`, in call order.
pub struct DigestAccumulator {
    state: State,
}

impl DigestAccumulator {
    pub fn new() -> Self {
        DigestAccumulator { state: State::Fresh }
    }

    /// True once `init` has run and before `finalize` has consumed the run.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// Begins a fresh digest; any previous run is dropped first.
    ///
    /// The software SHA-256 implementation backing this accumulator cannot
    /// fail to allocate, so this is infallible in practice; the `Result` is
    /// kept so a hardware-backed accumulator can surface `Resource` here
    /// without changing the call site.
    pub fn init(&mut self) -> Result<(), OatError> {
        self.state = State::Running(Sha256::new());
        Ok(())
    }

    /// Folds `bytes` into the running digest. A no-op if not `Running` —
    /// this lets callers that don't gate on session state (shadow-stack and
    /// indirect-call events) still call through unconditionally.
    pub fn update(&mut self, bytes: &[u8]) {
        if let State::Running(hasher) = &mut self.state {
            hasher.update(bytes);
        }
    }

    /// Writes the tag into `out` and closes the digest. After this call the
    /// accumulator requires another `init` before further `update`s take
    /// effect.
    pub fn finalize(&mut self, out: &mut [u8; DIGEST_SIZE]) -> Result<(), OatError> {
        match core::mem::replace(&mut self.state, State::Finalized) {
            State::Running(hasher) => {
                out.copy_from_slice(&hasher.finalize());
                Ok(())
            }
            other => {
                // Dispatcher gates HASH_FINAL on `initialized`; reaching
                // here means that guard was bypassed. Leave state as
                // Finalized and report the failure rather than panicking.
                self.state = other;
                Err(OatError::Resource)
            }
        }
    }
}

impl Default for DigestAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
