// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-client session state composing the digest, shadow stack, and log
//! (component C4).

use oat_api::OatError;

use crate::digest::DigestAccumulator;
use crate::log::EventLog;
use crate::stack::ShadowStack;

/// The unit of attestation: a shadow stack, a running digest, and an
/// execution log, all scoped to one open/close pair.
///
/// A freshly opened session has `depth = 0`, `log_len = 0`, and no digest
/// handle; digest commands are rejected with `BadState` until `HASH_INIT`
/// runs. Shadow-stack operations and `HASH_INIT` itself do not require the
/// digest to be initialized.
pub struct Session {
    pub(crate) stack: ShadowStack,
    pub(crate) digest: DigestAccumulator,
    pub(crate) log: EventLog,
}

impl Session {
    pub fn new() -> Self {
        Session {
            stack: ShadowStack::new(),
            digest: DigestAccumulator::new(),
            log: EventLog::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.digest.is_initialized()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// `HASH_INIT`: (re)initializes the digest, resets the shadow stack
    /// depth to 0, and resets the log cursor to 0. A post-reset session is
    /// indistinguishable, via any sequence of queries, from a freshly
    /// opened session that received one `HASH_INIT`.
    pub fn hash_init(&mut self) -> Result<(), OatError> {
        self.stack.reset();
        self.log.reset();
        self.digest.init()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oat_api::DIGEST_SIZE;

    #[test]
    fn fresh_session_rejects_digest_ops_until_hash_init() {
        let session = Session::new();
        assert!(!session.is_initialized());
        assert_eq!(session.stack_depth(), 0);
        assert_eq!(session.log_len(), 0);
    }

    #[test]
    fn hash_init_resets_stack_and_log() {
        let mut session = Session::new();
        session.hash_init().unwrap();
        session.stack.push(1).unwrap();
        session.log.append_branch(b"1");
        assert_eq!(session.stack_depth(), 1);
        assert_eq!(session.log_len(), 2);

        session.hash_init().unwrap();
        assert_eq!(session.stack_depth(), 0);
        assert_eq!(session.log_len(), 0);
        assert!(session.is_initialized());
    }

    #[test]
    fn reset_is_indistinguishable_from_fresh_open() {
        // S6: HASH_INIT; HASH_UPDATE "1"; HASH_INIT; HASH_UPDATE "0";
        // HASH_FINAL produces the same tag as HASH_INIT; HASH_UPDATE "0";
        // HASH_FINAL.
        let mut a = Session::new();
        a.hash_init().unwrap();
        a.digest.update(b"1");
        a.hash_init().unwrap();
        a.digest.update(b"0");
        let mut tag_a = [0u8; DIGEST_SIZE];
        a.digest.finalize(&mut tag_a).unwrap();

        let mut b = Session::new();
        b.hash_init().unwrap();
        b.digest.update(b"0");
        let mut tag_b = [0u8; DIGEST_SIZE];
        b.digest.finalize(&mut tag_b).unwrap();

        assert_eq!(tag_a, tag_b);
    }
}
