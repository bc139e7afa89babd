pub mod collection;
pub mod model;

pub use {
    collection::{Collection, CollectionDiff},
    model::{Attributes, Model},
};
