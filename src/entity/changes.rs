use std::fmt;

/// The kind of mutation a change notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "emitter")]
pub(crate) use feed::ChangeFeed;

#[cfg(feature = "emitter")]
mod feed {
    use std::sync::Mutex;

    use event_emitter_rs::EventEmitter;
    use tracing::warn;

    use super::ChangeKind;
    use crate::entity::StoreError;

    /// Per-store change listeners. Payloads are record ids.
    pub(crate) struct ChangeFeed {
        emitter: Mutex<EventEmitter>,
    }

    impl ChangeFeed {
        pub(crate) fn new() -> Self {
            Self {
                emitter: Mutex::new(EventEmitter::new()),
            }
        }

        pub(crate) fn on<F>(&self, kind: ChangeKind, callback: F) -> Result<(), StoreError>
        where
            F: Fn(String) + Send + Sync + 'static,
        {
            let mut emitter = self
                .emitter
                .lock()
                .map_err(|_| StoreError::LockPoisoned("on_change"))?;
            emitter.on(kind.as_str(), callback);
            Ok(())
        }

        /// Notification is best effort; the mutation has already been persisted.
        pub(crate) fn emit(&self, kind: ChangeKind, id: &str) {
            match self.emitter.lock() {
                Ok(mut emitter) => {
                    emitter.emit(kind.as_str(), id.to_string());
                }
                Err(_) => warn!(kind = %kind, id, "change feed lock poisoned, notification dropped"),
            }
        }
    }
}
