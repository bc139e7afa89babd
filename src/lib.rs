//! Reactive derived views over observable records and collections.
//!
//! A [`Store`] holds an ordered collection of records, a [`State`] a single
//! record. Both hand out *views*: read-only projections that re-compute
//! themselves whenever their source changes.
//! A [`StoreView`] filters, sorts and windows its source; a [`StateView`]
//! mirrors a record. Views are sources themselves, so they can be chained.
//!
//! The options of a view are written by *mutators* (configs, filters,
//! comparators and paginators). A mutator re-runs its callback whenever it
//! is applied and the view re-syncs right after.
//!
//! Views stay dormant until their source is published.
//!
//!# Examples
//!
//! ```
//! use prism::prelude::*;
//! use serde_json::json;
//!
//! let store = Store::with_data(vec![
//!     json!({"name": "Ralph", "age": 3}),
//!     json!({"name": "Gex", "age": 9}),
//!     json!({"name": "Go", "age": 2}),
//! ]).unwrap();
//!
//! let young = store.create_view(
//!     ViewOptions::new()
//!         .name("young")
//!         .comparator(Comparator::field("age"))
//! ).unwrap();
//!
//! let filter = young.create_filter(|| Ok(Filter::predicate(|pet| {
//!     pet.get("age").and_then(|age| age.as_i64()).unwrap_or(0) < 5
//! })));
//!
//! store.publish().unwrap();
//! assert_eq!(young.pluck("name"), vec![Some(json!("Go")), Some(json!("Ralph"))]);
//!
//! store.add(json!({"name": "Tom", "age": 1})).unwrap();
//! assert_eq!(young.first().unwrap().get("name"), Some(json!("Tom")));
//!
//! filter.destroy().unwrap();
//! assert_eq!(young.len(), 4);
//! ```

pub mod buffer;
pub mod cid;
pub mod error;
pub mod event;
pub mod projection;
pub mod state;
pub mod store;
pub mod view;

pub use {
    buffer::{Attributes, Collection, Model},
    cid::Cid,
    error::{PrismError, Result},
    event::{Event, EventKind, Events},
    projection::{StateView, StoreView},
    state::State,
    store::Store,
    view::{Comparator, Filter, Mutator, Paginator, ViewOptions},
};

pub mod prelude {
    pub use crate::{
        buffer::{Attributes, Model},
        error::{PrismError, Result},
        event::{EventKind, Events},
        projection::{StateView, StoreView},
        state::State,
        store::Store,
        view::{
            Activatable, CollectionQuery, CollectionSource, Comparator, Configurable, Filter,
            RecordQuery, RecordSource, Source, Syncable, ViewOptions, Viewable,
        },
    };
}
