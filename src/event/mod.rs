use {
    crate::cid::Cid,
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                   Event
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Add,
    Remove,
    Change,
    Reset,
    Sync,
    /// Readiness signal of a source or view.
    #[serde(alias = "start")]
    Publish,
    /// A mutator wrote into its owner's options.
    #[serde(alias = "apply")]
    Set,
    Destroy,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Add => "add",
            EventKind::Remove => "remove",
            EventKind::Change => "change",
            EventKind::Reset => "reset",
            EventKind::Sync => "sync",
            EventKind::Publish => "publish",
            EventKind::Set => "set",
            EventKind::Destroy => "destroy",
        }
    }

    /// Parses a space separated event list such as `"add change remove"`.
    /// Unknown names are skipped.
    pub fn parse_list(s: &str) -> Vec<EventKind> {
        s.split_whitespace()
            .filter_map(|name| match name.parse() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    tracing::warn!(event = name, "ignoring unknown event name");
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEvent(pub String);

impl fmt::Display for UnknownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event `{}`", self.0)
    }
}

impl std::error::Error for UnknownEvent {}

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(EventKind::Add),
            "remove" => Ok(EventKind::Remove),
            "change" => Ok(EventKind::Change),
            "reset" => Ok(EventKind::Reset),
            "sync" => Ok(EventKind::Sync),
            "publish" | "start" => Ok(EventKind::Publish),
            "set" | "apply" => Ok(EventKind::Set),
            "destroy" => Ok(EventKind::Destroy),
            other => Err(UnknownEvent(other.to_string())),
        }
    }
}

/// Notification message: what happened, and to whom.
/// For `add`, `remove` and `change` on a collection the target is the
/// affected record, otherwise it is the emitter itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Cid,
}

impl Event {
    pub fn new(kind: EventKind, target: Cid) -> Self {
        Event { kind, target }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub mod bus;
pub mod observer;

pub use {
    bus::{Events, ListenerId},
    observer::{NotifyFnObserver, Observer},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
