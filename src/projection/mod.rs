pub mod pipeline;
pub mod state_view;
pub mod store_view;

pub use {
    pipeline::{project, Projection},
    state_view::StateView,
    store_view::StoreView,
};
