use std::{fmt, sync::Mutex};

use crate::{timeline::TickEvent, MetronomeError, Result};

/// Identifier of one controller session. Allocated by [`SessionIds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide allocator of session ids. Construct once and share it by
/// reference; ids start at 1 and are never handed out twice.
#[derive(Debug, Default)]
pub struct SessionIds {
    last: Mutex<u64>,
}

impl SessionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> Result<SessionId> {
        let mut last = self
            .last
            .lock()
            .map_err(|_| MetronomeError::Poisoned("session id allocator"))?;
        *last += 1;
        tracing::debug!(id = *last, "allocated session id");
        Ok(SessionId(*last))
    }
}

/// Why a tick was not honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// The tick belongs to a session that has since been replaced.
    Session { live: SessionId, event: SessionId },
    /// The tick belongs to an earlier generation of this session's chain.
    Tag { current: u64, event: u64 },
}

/// The live session: its id and the generation tag of the armed tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    current_tag: u64,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self { id, current_tag: 0 }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn current_tag(&self) -> u64 {
        self.current_tag
    }

    /// Moves on to the next tag generation. Called once per accepted tick.
    pub fn bump_tag(&mut self) -> u64 {
        self.current_tag += 1;
        self.current_tag
    }

    /// Staleness filter. Fields left unset on the event are not compared.
    pub fn check(&self, event: &TickEvent) -> std::result::Result<(), Staleness> {
        if let Some(id) = event.session {
            if id != self.id {
                return Err(Staleness::Session {
                    live: self.id,
                    event: id,
                });
            }
        }
        if let Some(tag) = event.tag {
            if tag != self.current_tag {
                return Err(Staleness::Tag {
                    current: self.current_tag,
                    event: tag,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = SessionIds::new();
        let first = ids.next_id().unwrap();
        let second = ids.next_id().unwrap();

        assert_eq!(first.get(), 1);
        assert!(second > first);
    }

    #[test]
    fn concurrent_allocation_never_repeats() {
        let ids = Arc::new(SessionIds::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| ids.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {id} allocated twice");
            }
        }
        assert_eq!(seen.len(), 200);
    }

    #[test]
    fn filter_rejects_foreign_session_and_old_tag() {
        let ids = SessionIds::new();
        let old = ids.next_id().unwrap();
        let live = ids.next_id().unwrap();
        let mut session = Session::new(live);
        session.bump_tag();

        assert_eq!(
            session.check(&TickEvent::new(old, 1)),
            Err(Staleness::Session { live, event: old })
        );
        assert_eq!(
            session.check(&TickEvent::new(live, 0)),
            Err(Staleness::Tag {
                current: 1,
                event: 0
            })
        );
        assert_eq!(session.check(&TickEvent::new(live, 1)), Ok(()));
    }

    #[test]
    fn unset_fields_skip_the_filter() {
        let ids = SessionIds::new();
        let mut session = Session::new(ids.next_id().unwrap());
        session.bump_tag();
        session.bump_tag();

        assert_eq!(session.check(&TickEvent::untagged()), Ok(()));
    }
}
