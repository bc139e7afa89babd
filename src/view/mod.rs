use crate::{
    cid::Cid,
    error::Result,
    event::{EventKind, Events},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Source
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Anything a view can be derived from: a state, a store, or another view.
pub trait Source: Send + Sync {
    fn cid(&self) -> &Cid;
    fn events(&self) -> &Events;

    /// Events a derived view re-syncs on unless told otherwise.
    fn default_listen_to(&self) -> Vec<EventKind>;
}

pub trait Syncable: Send + Sync {
    /// Recomputes derived state from the parent. No-op while inactive.
    fn sync(&self) -> Result<()>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub mod activation;
pub mod mutator;
pub mod options;
pub mod registry;

pub mod sequence;
pub mod singleton;

pub use {
    activation::{Activatable, Activation},
    mutator::{Configurable, Mutator, MutatorSet, Paginator},
    options::{Comparator, Filter, Filters, ViewOptions},
    registry::{ViewRegistry, Viewable},
    sequence::{CollectionQuery, CollectionSource},
    singleton::{RecordQuery, RecordSource},
};
