use crate::{buffer::Model, view::options::ViewOptions};

/// Outcome of one pass over a source sequence.
#[derive(Clone, Debug, Default)]
pub struct Projection {
    pub models: Vec<Model>,
    /// Count after filtering and sorting, before bounds.
    pub total: usize,
}

/// filter -> filters -> comparator -> bounds
pub fn project(mut models: Vec<Model>, options: &ViewOptions) -> Projection {
    if let Some(filter) = &options.filter {
        models.retain(|m| filter.accepts(m));
    }
    for filter in options.filters.iter() {
        models.retain(|m| filter.accepts(m));
    }
    if let Some(comparator) = &options.comparator {
        comparator.sort(&mut models);
    }

    let total = models.len();
    let models = apply_bounds(models, options.size, options.offset);
    Projection { models, total }
}

/// Windows `items` by `size` / `offset`.
///
/// A positive size keeps `size` items from `offset` on. A negative size
/// counts from the back: `index = |len + size - offset|` and the window is
/// `[index, len - offset)`, where an end below zero counts back from the
/// end of the sequence.
pub fn apply_bounds<T>(items: Vec<T>, size: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let size = size.unwrap_or(0);
    if size == 0 && offset.is_none() {
        return items;
    }

    // widened so that no combination of i64 inputs can overflow
    let len = items.len() as i128;
    let size = if size == 0 { len } else { i128::from(size) };
    let offset = i128::from(offset.unwrap_or(0).unsigned_abs());

    if size > 0 {
        slice(items, offset, offset + size)
    } else if size < 0 {
        let index = (len + size - offset).abs();
        slice(items, index, len - offset)
    } else {
        // only reachable on an empty sequence
        items
    }
}

/// `items[start..end]` where negative bounds count back from the end and
/// out-of-range bounds are clamped.
fn slice<T>(items: Vec<T>, start: i128, end: i128) -> Vec<T> {
    let len = items.len() as i128;
    let clamp = |i: i128| (if i < 0 { (len + i).max(0) } else { i.min(len) }) as usize;

    let (start, end) = (clamp(start), clamp(end));
    if start >= end {
        return Vec::new();
    }
    items.into_iter().skip(start).take(end - start).collect()
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
