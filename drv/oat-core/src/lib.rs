// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trusted Attestation Core: the digest, shadow stack, and execution log
//! that together produce a proof-of-execution-path for an untrusted
//! caller's instrumented control flow.
//!
//! The public surface is [`Core`], reached through the same five entry
//! points a trusted-application runtime would call: [`Core::create`],
//! [`Core::open_session`], [`Core::invoke`], [`Core::close_session`], and
//! [`Core::destroy`]. Everything else in this crate is an internal building
//! block composed by [`dispatch`].

#![cfg_attr(not(test), no_std)]

mod boundary;
mod digest;
mod dispatch;
mod log;
mod session;
mod stack;

pub use boundary::{Core, SessionHandle};
pub use oat_api::{
    empty_params, Command, EventTag, OatError, Param, ParamKind, Params, DIGEST_SIZE,
    FUNCTION_ID_BYTES, INDIRECT_TARGET_BYTES, MAX_BRANCH_PAYLOAD, MAX_LOG_SIZE, MAX_SESSIONS,
    MAX_STACK_DEPTH, OAT_CORE_UUID,
};
