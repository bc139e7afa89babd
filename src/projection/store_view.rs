use {
    crate::{
        buffer::Model,
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
        projection::pipeline,
        view::{
            mutator::MutatorKind, Activatable, Activation, Comparator, Configurable, Filter,
            Mutator, MutatorSet, Paginator, Source, Syncable, ViewOptions, ViewRegistry, Viewable,
            CollectionSource,
        },
    },
    serde_json::Value,
    std::{
        fmt,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, RwLock, Weak,
        },
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Store View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Filtered, sorted and windowed copy of a store or of another store view.
/// Recomputed wholesale on every sync.
pub struct StoreView {
    this: Weak<StoreView>,
    cid: Cid,
    name: String,
    parent: Weak<dyn CollectionSource>,
    events: Events,
    activation: Activation,
    options: RwLock<ViewOptions>,
    mutators: MutatorSet,
    views: ViewRegistry<StoreView>,

    models: RwLock<Vec<Model>>,
    total: AtomicUsize,
}

impl StoreView {
    pub(crate) fn new<P>(parent: Weak<P>, options: ViewOptions) -> Arc<Self>
    where
        P: CollectionSource + 'static,
    {
        let listen_to = match (&options.listen_to, parent.upgrade()) {
            (Some(kinds), _) => kinds.clone(),
            (None, Some(parent)) => parent.default_listen_to(),
            (None, None) => Vec::new(),
        };

        let view = Arc::new_cyclic(|this| StoreView {
            this: this.clone(),
            cid: Cid::generate("view"),
            name: options.name.clone().unwrap_or_default(),
            parent,
            events: Events::new(),
            activation: Activation::new(listen_to),
            options: RwLock::new(options.clone()),
            mutators: MutatorSet::new(options),
            views: ViewRegistry::new(),
            models: RwLock::new(Vec::new()),
            total: AtomicUsize::new(0),
        });
        view.await_parent();
        view
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> ViewOptions {
        self.options.read().unwrap().clone()
    }

    /// Number of records in the projection.
    pub fn len(&self) -> usize {
        self.models.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().unwrap().is_empty()
    }

    /// Number of records that passed the filters, before size and offset.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn at(&self, idx: usize) -> Option<Model> {
        self.models.read().unwrap().get(idx).cloned()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.models.read().unwrap().iter().map(Model::to_json).collect())
    }

    fn owner(&self) -> Weak<dyn Configurable> {
        self.this.clone()
    }

    /// Mutator merging the returned options into this view's options.
    pub fn create_config<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<ViewOptions> + Send + Sync + 'static,
    {
        self.mutators.attach(self.owner(), &self.cid, MutatorKind::Config(Box::new(f)))
    }

    pub fn create_mutator<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<ViewOptions> + Send + Sync + 'static,
    {
        self.create_config(f)
    }

    pub fn create_filter<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<Filter> + Send + Sync + 'static,
    {
        self.mutators.attach(self.owner(), &self.cid, MutatorKind::Filter(Box::new(f)))
    }

    pub fn create_comparator<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<Comparator> + Send + Sync + 'static,
    {
        self.mutators.attach(self.owner(), &self.cid, MutatorKind::Comparator(Box::new(f)))
    }

    /// `page` is 1-based.
    pub fn create_paginator(&self, page_size: usize, page: usize) -> Paginator {
        self.mutators.attach_paginator(self.owner(), &self.cid, page_size, page)
    }

    pub fn mutator(&self, cid: &Cid) -> Option<Arc<Mutator>> {
        self.mutators.get(cid)
    }

    pub fn mutator_count(&self) -> usize {
        self.mutators.len()
    }

    /// Leaves the parent's registry and drops every subscription this view
    /// holds. Views of this view stop receiving updates.
    pub fn destroy(&self) -> Result<()> {
        tracing::debug!(view = %self.cid, name = %self.name, "destroying view");
        let result = self.events.emit(&Event::new(EventKind::Destroy, self.cid.clone()));

        self.sleep();
        if let Some(parent) = self.parent_events() {
            parent.stop_listening(&self.cid);
        }
        self.mutators.release(&self.cid);
        self.events.clear();
        result
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl fmt::Debug for StoreView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreView")
            .field("cid", &self.cid)
            .field("name", &self.name)
            .field("len", &self.len())
            .field("total", &self.total.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Source for StoreView {
    fn cid(&self) -> &Cid {
        &self.cid
    }

    fn events(&self) -> &Events {
        &self.events
    }

    fn default_listen_to(&self) -> Vec<EventKind> {
        vec![EventKind::Sync]
    }
}

impl CollectionSource for StoreView {
    fn models(&self) -> Vec<Model> {
        self.models.read().unwrap().clone()
    }
}

impl Syncable for StoreView {
    fn sync(&self) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        let Some(parent) = self.parent.upgrade() else {
            return Ok(());
        };

        let options = self.options();
        let projection = pipeline::project(parent.models(), &options);
        tracing::trace!(
            view = %self.cid,
            total = projection.total,
            len = projection.models.len(),
            "sync"
        );

        *self.models.write().unwrap() = projection.models;
        self.total.store(projection.total, Ordering::SeqCst);

        self.events.emit(&Event::new(EventKind::Sync, self.cid.clone()))
    }
}

impl Configurable for StoreView {
    fn options_cell(&self) -> &RwLock<ViewOptions> {
        &self.options
    }

    fn mutators(&self) -> &MutatorSet {
        &self.mutators
    }
}

impl Activatable for StoreView {
    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn this(&self) -> Weak<Self> {
        self.this.clone()
    }

    fn parent_events(&self) -> Option<Events> {
        self.parent.upgrade().map(|p| p.events().clone())
    }
}

impl Viewable for StoreView {
    type View = StoreView;

    fn registry(&self) -> &ViewRegistry<StoreView> {
        &self.views
    }

    fn spawn_view(&self, options: ViewOptions) -> Arc<StoreView> {
        StoreView::new(self.this.clone(), options)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{projection::store_view::*, store::Store, view::CollectionQuery};
    use serde_json::json;

    fn numbers() -> Arc<Store> {
        Store::with_data((1..=6).map(|n| json!({ "n": n }))).unwrap()
    }

    fn ns(view: &StoreView) -> Vec<i64> {
        view.map(|m| m.get("n").unwrap().as_i64().unwrap())
    }

    #[test]
    fn store_view1() {
        let store = numbers();
        let view = store
            .create_view(ViewOptions::new().filter(Filter::predicate(|m| {
                m.get("n").unwrap().as_i64().unwrap() % 2 == 0
            })))
            .unwrap();

        // dormant until published
        assert!(view.is_empty());
        assert!(!view.is_active());

        store.publish().unwrap();
        assert!(view.is_initialized());
        assert_eq!(ns(&view), vec![2, 4, 6]);

        store.add(json!({"n": 8})).unwrap();
        assert_eq!(ns(&view), vec![2, 4, 6, 8]);
        assert_eq!(view.total(), 4);
    }

    #[test]
    fn store_view_of_view() {
        let store = numbers();
        let desc = store
            .create_view(
                ViewOptions::new()
                    .name("desc")
                    .filter(Filter::matches(Default::default()))
                    .comparator(Comparator::compare(|a, b| {
                        b.get("n").unwrap().as_i64().cmp(&a.get("n").unwrap().as_i64())
                    })),
            )
            .unwrap();
        let top = desc.create_view(ViewOptions::new().size(2)).unwrap();

        store.publish().unwrap();
        assert_eq!(ns(&top), vec![6, 5]);

        store.add(json!({"n": 10})).unwrap();
        assert_eq!(ns(&top), vec![10, 6]);
        assert_eq!(top.to_json()[0]["n"], json!(10));
    }

    #[test]
    fn late_view_starts_by_hand() {
        let store = numbers();
        store.publish().unwrap();

        let view = store.create_view(ViewOptions::new().size(1)).unwrap();
        assert!(view.is_empty());

        view.initialize().unwrap();
        assert_eq!(ns(&view), vec![1]);
    }

    #[test]
    fn destroyed_view_goes_quiet() {
        let store = numbers();
        let view = store.create_view(ViewOptions::new().name("all")).unwrap();
        store.publish().unwrap();
        let config = view.create_config(|| Ok(ViewOptions::new().size(2)));

        view.destroy().unwrap();
        assert!(store.get_view("all").is_none());
        assert_eq!(config.events().listener_count(), 0);
        assert_eq!(view.events().listener_count(), 0);

        store.add(json!({"n": 7})).unwrap();
        assert_eq!(view.len(), 6);
    }
}
