// Copyright 2024 Advanced Micro Devices, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session-table boundary: `create`/`open_session`/`invoke`/`close_session`/
//! `destroy` (component C6).

use heapless::Vec;
use oat_api::{OatError, Params, MAX_SESSIONS};

use crate::dispatch::dispatch;
use crate::session::Session;

/// Opaque handle returned by `open_session`.
///
/// Carries a generation counter alongside the table slot so a handle from a
/// closed session is rejected rather than silently aliasing whatever session
/// is later opened into the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SessionHandle {
    slot: usize,
    generation: u32,
}

struct Slot {
    session: Option<Session>,
    generation: u32,
}

impl Slot {
    const fn empty() -> Self {
        Slot { session: None, generation: 0 }
    }
}

/// The core's entire reachable state: a fixed table of sessions, indexed by
/// handle. There is exactly one `Core` per running instance, constructed by
/// `create` and torn down by `destroy`.
pub struct Core {
    slots: Vec<Slot, MAX_SESSIONS>,
}

impl Core {
    /// `TA_CreateEntryPoint`: allocates the (empty) session table. Cannot
    /// fail — there is no backing store to provision beyond this struct.
    pub fn create() -> Self {
        let mut slots = Vec::new();
        for _ in 0..MAX_SESSIONS {
            // Capacity is fixed at MAX_SESSIONS; this cannot fail.
            let _ = slots.push(Slot::empty());
        }
        Core { slots }
    }

    /// `TA_OpenSessionEntryPoint`: allocates a fresh session in the first
    /// free table slot.
    pub fn open_session(&mut self) -> Result<SessionHandle, OatError> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.session.is_none())
            .ok_or(OatError::OutOfMemory)?;
        slot.session = Some(Session::new());
        Ok(SessionHandle { slot: index, generation: slot.generation })
    }

    /// `TA_InvokeCommandEntryPoint`: routes `cmd`/`params` to the session
    /// named by `handle`.
    pub fn invoke(
        &mut self,
        handle: SessionHandle,
        cmd: u32,
        params: &mut Params<'_>,
    ) -> Result<(), OatError> {
        let session = self.lookup_mut(handle)?;
        dispatch(session, cmd, params)
    }

    /// `TA_CloseSessionEntryPoint`: frees the slot and bumps its generation,
    /// so any handle still referencing it becomes stale. Closing a handle
    /// that is already stale (or was never valid) is a caller bug signaled
    /// by `BadParameters`, not treated as a no-op — unlike the untrusted
    /// side's own bookkeeping, the core's table is the single source of
    /// truth for which sessions are live.
    pub fn close_session(&mut self, handle: SessionHandle) -> Result<(), OatError> {
        let slot = self.slots.get_mut(handle.slot).ok_or(OatError::BadParameters)?;
        if slot.generation != handle.generation || slot.session.is_none() {
            return Err(OatError::BadParameters);
        }
        slot.session = None;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(())
    }

    /// `TA_DestroyEntryPoint`: drops every open session.
    pub fn destroy(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.session = None;
        }
    }

    fn lookup_mut(&mut self, handle: SessionHandle) -> Result<&mut Session, OatError> {
        let slot = self.slots.get_mut(handle.slot).ok_or(OatError::BadParameters)?;
        if slot.generation != handle.generation {
            return Err(OatError::BadParameters);
        }
        slot.session.as_mut().ok_or(OatError::BadParameters)
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::create()
    }
}
