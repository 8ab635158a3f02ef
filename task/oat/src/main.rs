// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Drone task
//!
//! Demonstrates the Trusted Attestation Core's lifecycle end to end: a
//! fresh core, a session opened against it, and a handful of invocations
//! that mirror the scenarios the core's session state machine is built to
//! handle. This stands in for an instrumented application driving the core
//! directly; there is no client-side marshalling here, only the function
//! calls a trusted-application runtime would make on an app's behalf.

use log::info;
use oat_core::{Command, Core, OatError, Param, DIGEST_SIZE};

fn main() {
    env_logger::init();

    let mut core = Core::create();
    let handle = core.open_session().expect("session table has room");

    run_happy_path(&mut core, handle);
    run_hijack_and_recover(&mut core, handle);
    run_log_export(&mut core, handle);

    core.close_session(handle).expect("session was open");
    core.destroy();
}

/// Mirrors a single well-behaved call: a shadow-stack frame opened, one
/// branch folded into the digest, and the frame closed again before the
/// digest is finalized.
fn run_happy_path(core: &mut Core, handle: oat_core::SessionHandle) {
    invoke(core, handle, Command::HashInit, [Param::None, Param::None, Param::None, Param::None]);

    invoke(
        core,
        handle,
        Command::StackPush,
        [Param::ValueIn { a: 0x1B2, b: 0 }, Param::None, Param::None, Param::None],
    );

    invoke(
        core,
        handle,
        Command::HashUpdate,
        [Param::MemRefIn(b"1"), Param::None, Param::None, Param::None],
    );

    invoke(
        core,
        handle,
        Command::StackPop,
        [Param::ValueIn { a: 0x1B2, b: 0 }, Param::None, Param::None, Param::None],
    );

    let mut tag = [0u8; DIGEST_SIZE];
    let mut tag_size = DIGEST_SIZE;
    invoke(
        core,
        handle,
        Command::HashFinal,
        [
            Param::MemRefOut { buffer: &mut tag, size: &mut tag_size },
            Param::None,
            Param::None,
            Param::None,
        ],
    );
    info!("happy path tag: {:02x?}", tag);
}

/// Mirrors a hijacked return: the frame pushed for one function id is
/// popped with a different one. The core reports `Security` and leaves the
/// frame in place so the run can still be told apart from a clean one, then
/// shows a correctly matched pop succeeding afterward.
fn run_hijack_and_recover(core: &mut Core, handle: oat_core::SessionHandle) {
    invoke(
        core,
        handle,
        Command::StackPush,
        [Param::ValueIn { a: 77, b: 0 }, Param::None, Param::None, Param::None],
    );

    let mut params = [Param::ValueIn { a: 9999, b: 0 }, Param::None, Param::None, Param::None];
    match core.invoke(handle, Command::StackPop as u32, &mut params) {
        Err(OatError::Security) => info!("return-address hijack detected, as expected"),
        other => panic!("expected Security, got {other:?}"),
    }

    invoke(
        core,
        handle,
        Command::StackPop,
        [Param::ValueIn { a: 77, b: 0 }, Param::None, Param::None, Param::None],
    );
}

/// Exports the execution log accumulated by the two runs above.
fn run_log_export(core: &mut Core, handle: oat_core::SessionHandle) {
    let mut buf = [0u8; 256];
    let mut size = buf.len();
    invoke(
        core,
        handle,
        Command::GetLog,
        [
            Param::MemRefOut { buffer: &mut buf, size: &mut size },
            Param::None,
            Param::None,
            Param::None,
        ],
    );
    info!("execution log: {} bytes", size);
}

fn invoke(
    core: &mut Core,
    handle: oat_core::SessionHandle,
    cmd: Command,
    mut params: [Param<'_>; 4],
) {
    core.invoke(handle, cmd as u32, &mut params)
        .unwrap_or_else(|e| panic!("{cmd:?} failed: {e}"));
}
