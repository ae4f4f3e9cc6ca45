//! The Pending Request Table: one entry per in-flight `messageId`,
//! `spec.md` §3/§4.5.5/§4.5.6.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

use crate::error::LdapError;
use crate::message::{LdapMessage, ProtocolOp, SearchResultEntry, SearchResultReference};

static NEXT_SOCKET_ID: AtomicU64 = AtomicU64::new(1);

/// A stand-in for the "UUID source" external collaborator of `spec.md` §6:
/// an opaque, monotonically-allocated identifier distinguishing one
/// underlying transport from the next across a StartTLS splice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SocketId(u64);

impl SocketId {
    pub(crate) fn new() -> Self {
        SocketId(NEXT_SOCKET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a completed request hands back to the awaiting caller: the
/// terminal response message, plus any SearchEntry/SearchReference
/// records accumulated while the request was pending.
#[derive(Debug)]
pub(crate) struct PendingOutcome {
    pub(crate) message: LdapMessage,
    pub(crate) search_entries: Vec<SearchResultEntry>,
    pub(crate) search_references: Vec<SearchResultReference>,
}

impl PendingOutcome {
    pub(crate) fn empty(message_id: i32) -> Self {
        Self {
            message: LdapMessage::new(message_id, ProtocolOp::UnbindRequest),
            search_entries: Vec::new(),
            search_references: Vec::new(),
        }
    }
}

pub(crate) struct PendingEntry {
    pub(crate) completion: oneshot::Sender<Result<PendingOutcome, LdapError>>,
    pub(crate) search_entries: Vec<SearchResultEntry>,
    pub(crate) search_references: Vec<SearchResultReference>,
    pub(crate) owning_socket: SocketId,
    pub(crate) is_unbind: bool,
}

#[derive(Default)]
pub(crate) struct PendingRequestTable {
    entries: HashMap<i32, PendingEntry>,
}

impl PendingRequestTable {
    pub(crate) fn insert(&mut self, message_id: i32, entry: PendingEntry) {
        self.entries.insert(message_id, entry);
    }

    pub(crate) fn remove(&mut self, message_id: i32) -> Option<PendingEntry> {
        self.entries.remove(&message_id)
    }

    pub(crate) fn get_mut(&mut self, message_id: i32) -> Option<&mut PendingEntry> {
        self.entries.get_mut(&message_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drains every entry owned by `socket_id`. Unbind entries are resolved
    /// rather than rejected when `resolve_unbind` is set — the closing
    /// socket is their expected acknowledgement, per `spec.md` §4.5.4.
    /// Idempotent: calling this twice on an already-drained socket id is a
    /// no-op the second time.
    pub(crate) fn fail_all_for_socket(
        &mut self,
        socket_id: SocketId,
        err_factory: impl Fn() -> LdapError,
        resolve_unbind: bool,
    ) {
        let ids: Vec<i32> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.owning_socket == socket_id)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let Some(entry) = self.entries.remove(&id) else { continue };
            if resolve_unbind && entry.is_unbind {
                let _ = entry.completion.send(Ok(PendingOutcome::empty(id)));
            } else {
                let _ = entry.completion.send(Err(err_factory()));
            }
        }
    }
}
