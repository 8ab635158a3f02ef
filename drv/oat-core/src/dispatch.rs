// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command dispatcher: state-machine routing of invocations into the
//! shadow stack, digest accumulator, and event log (component C5).

use oat_api::{Command, OatError, Param, Params, DIGEST_SIZE, MAX_BRANCH_PAYLOAD};
use num_traits::FromPrimitive;

use crate::log::ReadLogOutcome;
use crate::session::Session;

/// Dispatches one invocation against `session`. Per-slot parameter-type
/// mismatches are caught before any state is mutated; every other state
/// change made by a single `dispatch` call is atomic with respect to the
/// caller.
pub fn dispatch(session: &mut Session, cmd: u32, params: &mut Params<'_>) -> Result<(), OatError> {
    let command = Command::from_u32(cmd).ok_or(OatError::BadParameters)?;
    if !trailing_slots_empty(params) {
        return Err(OatError::BadParameters);
    }

    match command {
        Command::HashInit => {
            require_none(&params[0])?;
            session.hash_init()
        }
        Command::HashUpdate => hash_update(session, &params[0]),
        Command::HashFinal => hash_final(session, &mut params[0]),
        Command::StackPush => stack_push(session, &params[0]),
        Command::StackPop => stack_pop(session, &params[0]),
        Command::IndirectCall => indirect_call(session, &params[0]),
        Command::GetLog => get_log(session, &mut params[0]),
    }
}

fn trailing_slots_empty(params: &Params<'_>) -> bool {
    params[1..].iter().all(|p| matches!(p, Param::None))
}

fn require_none(param: &Param<'_>) -> Result<(), OatError> {
    match param {
        Param::None => Ok(()),
        _ => Err(OatError::BadParameters),
    }
}

fn hash_update(session: &mut Session, param: &Param<'_>) -> Result<(), OatError> {
    let Param::MemRefIn(payload) = param else {
        return Err(OatError::BadParameters);
    };
    if payload.len() > MAX_BRANCH_PAYLOAD {
        return Err(OatError::BadParameters);
    }
    if !session.is_initialized() {
        return Err(OatError::BadState);
    }
    session.digest.update(payload);
    session.log.append_branch(payload);
    Ok(())
}

fn hash_final(session: &mut Session, param: &mut Param<'_>) -> Result<(), OatError> {
    let Param::MemRefOut { buffer, size } = param else {
        return Err(OatError::BadParameters);
    };
    if buffer.len() < DIGEST_SIZE {
        return Err(OatError::BadParameters);
    }
    if !session.is_initialized() {
        return Err(OatError::BadState);
    }
    let mut tag = [0u8; DIGEST_SIZE];
    session.digest.finalize(&mut tag)?;
    buffer[..DIGEST_SIZE].copy_from_slice(&tag);
    **size = DIGEST_SIZE;
    Ok(())
}

fn stack_push(session: &mut Session, param: &Param<'_>) -> Result<(), OatError> {
    let Param::ValueIn { a: id, .. } = param else {
        return Err(OatError::BadParameters);
    };
    session.stack.push(*id)?;
    // Silently discarded while Fresh/Finalized — preserved asymmetry: the
    // digest is only mutated once an attestation run is in progress.
    session.digest.update(&id.to_le_bytes());
    Ok(())
}

fn stack_pop(session: &mut Session, param: &Param<'_>) -> Result<(), OatError> {
    let Param::ValueIn { a: expected, .. } = param else {
        return Err(OatError::BadParameters);
    };
    let popped = session.stack.pop(*expected)?;
    session.digest.update(&popped.to_le_bytes());
    // Logged unconditionally on success, regardless of digest state —
    // only the digest contribution is gated on `initialized`.
    session.log.append_return(popped);
    Ok(())
}

fn indirect_call(session: &mut Session, param: &Param<'_>) -> Result<(), OatError> {
    let Param::ValueIn { a: low, b: high } = param else {
        return Err(OatError::BadParameters);
    };
    let target = ((*high as u64) << 32) | (*low as u64);
    session.digest.update(&target.to_le_bytes());
    session.log.append_indirect(target);
    Ok(())
}

fn get_log(session: &mut Session, param: &mut Param<'_>) -> Result<(), OatError> {
    let Param::MemRefOut { buffer, size } = param else {
        return Err(OatError::BadParameters);
    };
    match session.log.read_log(buffer) {
        ReadLogOutcome::Copied(n) => {
            **size = n;
            Ok(())
        }
        ReadLogOutcome::ShortBuffer(needed) => {
            **size = needed;
            Err(OatError::ShortBuffer)
        }
    }
}
