// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! API crate for the Trusted Attestation Core.
//!
//! This crate is the narrow input contract between an untrusted caller and
//! the core: command codes, parameter-slot kinds, and the error taxonomy
//! returned across the boundary. It carries no logic of its own — see
//! `oat-core` for the session state machine and dispatcher that interpret
//! these types.
//!
//! The instrumenter that assigns function identifiers is an external
//! collaborator; this crate treats identifiers as opaque `u32`s compared
//! only for equality. (For reference, the reached-from-source scheme sums
//! the bytes of the function's name, which is collision-prone and not
//! meant to be cryptographically meaningful — any scheme works here.)

#![cfg_attr(not(feature = "std"), no_std)]

use num_derive::FromPrimitive;

/// Maximum depth of the shadow stack (active call frames).
pub const MAX_STACK_DEPTH: usize = 128;

/// Capacity, in bytes, of the tagged execution log.
pub const MAX_LOG_SIZE: usize = 8192;

/// Width, in bytes, of a finalized digest tag.
pub const DIGEST_SIZE: usize = 32;

/// Width, in bytes, of a function identifier on the wire.
pub const FUNCTION_ID_BYTES: usize = 4;

/// Width, in bytes, of an indirect-call target address on the wire.
pub const INDIRECT_TARGET_BYTES: usize = 8;

/// Largest branch payload a single `HASH_UPDATE` will accept.
///
/// The contract only calls this "small"; 1024 bytes matches the bulk-input
/// buffer size used elsewhere in this tree's digest and crypto services.
pub const MAX_BRANCH_PAYLOAD: usize = 1024;

/// Upper bound on concurrently open sessions.
pub const MAX_SESSIONS: usize = 32;

/// 16-byte identity of the core, carried over unchanged from the source TA's
/// `TA_OAT_UUID` (`92b192d1-9686-424a-8d18-97c118129570`).
pub const OAT_CORE_UUID: [u8; 16] = [
    0x92, 0xb1, 0x92, 0xd1, 0x96, 0x86, 0x42, 0x4a, 0x8d, 0x18, 0x97, 0xc1,
    0x18, 0x12, 0x95, 0x70,
];

/// Command codes accepted by `invoke`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
#[repr(u32)]
pub enum Command {
    HashInit = 4,
    HashUpdate = 5,
    HashFinal = 6,
    StackPush = 0x10,
    StackPop = 0x11,
    IndirectCall = 0x12,
    GetLog = 0x13,
}

/// Tags used in the exported execution log.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum EventTag {
    Branch = 0x01,
    Indirect = 0x02,
    Return = 0x03,
}

/// Results the boundary can return in place of success.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
#[repr(u32)]
pub enum OatError {
    /// Parameter-type mismatch, or an unrecognized command code.
    BadParameters = 1,
    /// A digest command was issued before `HASH_INIT`.
    BadState = 2,
    /// The shadow stack is already at `MAX_STACK_DEPTH`.
    Overflow = 3,
    /// Shadow-stack underflow, or a popped id did not match the expected id.
    Security = 4,
    /// The caller's output buffer is smaller than the data being returned.
    ShortBuffer = 5,
    /// Session allocation failed (the session table is full).
    OutOfMemory = 6,
    /// The underlying cryptographic primitive failed to init or finalize.
    Resource = 7,
}

impl core::fmt::Display for OatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            OatError::BadParameters => "bad parameters",
            OatError::BadState => "bad state",
            OatError::Overflow => "shadow stack overflow",
            OatError::Security => "security violation",
            OatError::ShortBuffer => "output buffer too short",
            OatError::OutOfMemory => "out of memory",
            OatError::Resource => "cryptographic resource failure",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OatError {}

/// The kind of a parameter slot, independent of its payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamKind {
    None,
    MemRefIn,
    MemRefOut,
    ValueIn,
}

/// One of the four parameter slots carried by every `invoke` call.
///
/// Mirrors the GlobalPlatform `TEEC_Operation` parameter model the core's
/// source contract is built on: a slot is either empty, a packed pair of
/// 32-bit values, a caller-owned input buffer, or a caller-owned output
/// buffer paired with a size that is read on entry (capacity) and written
/// on return (actual or required length).
pub enum Param<'a> {
    None,
    ValueIn { a: u32, b: u32 },
    MemRefIn(&'a [u8]),
    MemRefOut { buffer: &'a mut [u8], size: &'a mut usize },
}

impl<'a> Param<'a> {
    pub fn kind(&self) -> ParamKind {
        match self {
            Param::None => ParamKind::None,
            Param::ValueIn { .. } => ParamKind::ValueIn,
            Param::MemRefIn(_) => ParamKind::MemRefIn,
            Param::MemRefOut { .. } => ParamKind::MemRefOut,
        }
    }
}

/// The four parameter slots of one `invoke` call. Every command in this
/// contract only ever reads slot 0; slots 1..3 must be `Param::None`.
pub type Params<'a> = [Param<'a>; 4];

/// An all-`None` parameter vector, for commands that take no input.
pub fn empty_params<'a>() -> Params<'a> {
    [Param::None, Param::None, Param::None, Param::None]
}
