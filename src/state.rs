use std::sync::{Mutex, MutexGuard};

use chat_domain::{Identity, Message};
use tokio::sync::watch;

/// Read-only view handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineView {
    pub processing: bool,
    pub records: Vec<Message>,
}

/// Generation and identity a handle (and everything issued through it) was
/// created under. Results carrying a tag that is no longer current are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandleTag {
    pub(crate) generation: u64,
    pub(crate) identity: Option<Identity>,
}

#[derive(Debug, Default)]
struct Current {
    generation: u64,
    identity: Option<Identity>,
}

/// Single-writer store for the cache and the processing flag.
///
/// Every mutation that depends on a [`HandleTag`] is checked and applied while
/// holding `current`, so a generation bump cannot interleave with it.
pub(crate) struct EngineState {
    current: Mutex<Current>,
    view: watch::Sender<EngineView>,
}

impl EngineState {
    pub(crate) fn new() -> Self {
        let (view, _) = watch::channel(EngineView::default());
        Self {
            current: Mutex::new(Current::default()),
            view,
        }
    }

    fn current(&self) -> MutexGuard<'_, Current> {
        // The guarded data is plain values; a panic elsewhere cannot leave it torn.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new handle generation. The cache is cleared when the identity
    /// changes.
    pub(crate) fn begin_generation(&self, identity: Option<Identity>) -> HandleTag {
        let mut current = self.current();
        current.generation += 1;

        if current.identity != identity {
            self.view.send_if_modified(|view| {
                let had_records = !view.records.is_empty();
                view.records.clear();
                had_records
            });
            chat_observability::record_cache_size(0);
        }
        current.identity = identity;

        HandleTag {
            generation: current.generation,
            identity: current.identity.clone(),
        }
    }

    pub(crate) fn is_current(&self, tag: &HandleTag) -> bool {
        self.current().generation == tag.generation
    }

    pub(crate) fn identity(&self) -> Option<Identity> {
        self.current().identity.clone()
    }

    /// Replace the cache with a backfilled sequence. Returns `false` when the
    /// tag is stale and nothing was written.
    pub(crate) fn replace_records(&self, tag: &HandleTag, records: Vec<Message>) -> bool {
        let current = self.current();
        if current.generation != tag.generation {
            return false;
        }

        let len = records.len();
        self.view.send_modify(|view| view.records = records);
        chat_observability::record_cache_size(len);
        true
    }

    /// Append one record. Returns `false` when the tag is stale.
    pub(crate) fn append_record(&self, tag: &HandleTag, record: Message) -> bool {
        let current = self.current();
        if current.generation != tag.generation {
            return false;
        }

        let mut len = 0;
        self.view.send_modify(|view| {
            view.records.push(record);
            len = view.records.len();
        });
        chat_observability::record_cache_size(len);
        true
    }

    pub(crate) fn clear_records(&self, tag: &HandleTag) {
        let current = self.current();
        if current.generation != tag.generation {
            return;
        }

        self.view.send_if_modified(|view| {
            let had_records = !view.records.is_empty();
            view.records.clear();
            had_records
        });
        chat_observability::record_cache_size(0);
    }

    pub(crate) fn set_processing(&self, processing: bool) {
        self.view.send_if_modified(|view| {
            let changed = view.processing != processing;
            view.processing = processing;
            changed
        });
    }

    pub(crate) fn snapshot(&self) -> EngineView {
        self.view.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<EngineView> {
        self.view.subscribe()
    }
}
