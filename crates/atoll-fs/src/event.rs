use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// An event mirroring a state transition, consumed by off-chain indexers.
///
/// Events are a side channel, not part of any return value. Ordering
/// guarantee per operation: at most one `*AlreadyExists` notification
/// before an abort, or exactly one `*Added`/`Deleted` after a successful
/// commit. Each carries the operation's path as supplied by the caller
/// and, where applicable, the object's metadata as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsEvent {
    FileAdded {
        path: String,
        create_ts: u64,
        tags: Vec<String>,
        size: u64,
        blob_id: String,
        end_epoch: u64,
    },
    FileAlreadyExists {
        path: String,
        create_ts: u64,
        tags: Vec<String>,
        size: u64,
        blob_id: String,
        end_epoch: u64,
    },
    DirAdded {
        path: String,
        create_ts: u64,
        tags: Vec<String>,
    },
    DirAlreadyExists {
        path: String,
        create_ts: u64,
        tags: Vec<String>,
    },
    Deleted {
        path: String,
    },
}

impl FsEvent {
    /// The event's kind as a stable name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileAdded { .. } => "FileAdded",
            Self::FileAlreadyExists { .. } => "FileAlreadyExists",
            Self::DirAdded { .. } => "DirAdded",
            Self::DirAlreadyExists { .. } => "DirAlreadyExists",
            Self::Deleted { .. } => "Deleted",
        }
    }

    /// The operation path the event was emitted for.
    pub fn path(&self) -> &str {
        match self {
            Self::FileAdded { path, .. }
            | Self::FileAlreadyExists { path, .. }
            | Self::DirAdded { path, .. }
            | Self::DirAlreadyExists { path, .. }
            | Self::Deleted { path } => path,
        }
    }
}

/// Capability for receiving events.
///
/// Hosts that just want a closure can wrap one with [`sink_fn`].
pub trait EventSink {
    fn emit(&self, event: FsEvent);
}

/// Adapter making any `Fn(FsEvent)` an [`EventSink`].
pub struct SinkFn<F>(F);

/// Wrap a closure as an event sink.
pub fn sink_fn<F: Fn(FsEvent)>(f: F) -> SinkFn<F> {
    SinkFn(f)
}

impl<F: Fn(FsEvent)> EventSink for SinkFn<F> {
    fn emit(&self, event: FsEvent) {
        (self.0)(event)
    }
}

/// A sink that discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: FsEvent) {}
}

/// A sink that records every event, for tests and replay.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FsEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in emission order.
    pub fn recorded(&self) -> Vec<FsEvent> {
        self.events.lock().expect("sink lock poisoned").clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<FsEvent> {
        std::mem::take(&mut *self.events.lock().expect("sink lock poisoned"))
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.lock().expect("sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: FsEvent) {
        self.events.lock().expect("sink lock poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted(path: &str) -> FsEvent {
        FsEvent::Deleted {
            path: path.to_string(),
        }
    }

    #[test]
    fn kind_and_path_accessors() {
        let event = FsEvent::DirAdded {
            path: "/d".into(),
            create_ts: 1,
            tags: vec![],
        };
        assert_eq!(event.kind(), "DirAdded");
        assert_eq!(event.path(), "/d");
    }

    #[test]
    fn recording_sink_preserves_order() {
        let sink = RecordingSink::new();
        sink.emit(deleted("/a"));
        sink.emit(deleted("/b"));
        let events = sink.recorded();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].path(), "/a");
        assert_eq!(events[1].path(), "/b");
    }

    #[test]
    fn take_drains() {
        let sink = RecordingSink::new();
        sink.emit(deleted("/a"));
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = sink_fn(|event: FsEvent| seen.lock().unwrap().push(event));
        sink.emit(deleted("/x"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let event = FsEvent::FileAdded {
            path: "/f".into(),
            create_ts: 1000,
            tags: vec!["t".into()],
            size: 10,
            blob_id: "b".into(),
            end_epoch: 5,
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: FsEvent = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
