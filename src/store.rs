use {
    crate::{
        buffer::{Collection, Model},
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
        projection::StoreView,
        view::{CollectionSource, Source, ViewOptions, ViewRegistry, Viewable},
    },
    serde_json::Value,
    std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

/// Observable collection that hands out store views.
pub struct Store {
    this: Weak<Store>,
    collection: Collection,
    views: ViewRegistry<StoreView>,
    initialized: AtomicBool,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Store::with_collection(Collection::new())
    }

    pub fn with_models(models: Vec<Model>) -> Arc<Self> {
        Store::with_collection(Collection::with_models(models))
    }

    /// Fails on the first value that is not an object.
    pub fn with_data<I>(data: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = Value>,
    {
        let models = data.into_iter().map(Model::from_json).collect::<Result<Vec<_>>>()?;
        Ok(Store::with_models(models))
    }

    fn with_collection(collection: Collection) -> Arc<Self> {
        Arc::new_cyclic(|this| Store {
            this: this.clone(),
            collection,
            views: ViewRegistry::new(),
            initialized: AtomicBool::new(false),
        })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Appends a record built from a JSON object.
    pub fn add(&self, value: Value) -> Result<Model> {
        let model = Model::from_json(value)?;
        self.collection.push(model.clone())?;
        Ok(model)
    }

    pub fn add_model(&self, model: Model) -> Result<()> {
        self.collection.push(model)
    }

    pub fn insert(&self, idx: usize, model: Model) -> Result<()> {
        self.collection.insert(idx, model)
    }

    pub fn remove(&self, model: &Model) -> Result<Option<Model>> {
        self.collection.remove(model)
    }

    pub fn reset(&self, models: Vec<Model>) -> Result<()> {
        self.collection.reset(models)
    }

    pub fn at(&self, idx: usize) -> Option<Model> {
        self.collection.at(idx)
    }

    pub fn get(&self, cid: &Cid) -> Option<Model> {
        self.collection.get(cid)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.collection.models().iter().map(Model::to_json).collect())
    }

    /// Starts every view created so far, and their views in turn.
    pub fn publish(&self) -> Result<()> {
        tracing::debug!(store = %self.collection.cid(), views = self.views.len(), "publish");
        self.collection
            .events()
            .emit(&Event::new(EventKind::Publish, self.collection.cid().clone()))?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn start(&self) -> Result<()> {
        self.publish()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

impl Source for Store {
    fn cid(&self) -> &Cid {
        self.collection.cid()
    }

    fn events(&self) -> &Events {
        self.collection.events()
    }

    fn default_listen_to(&self) -> Vec<EventKind> {
        vec![EventKind::Add, EventKind::Change, EventKind::Remove, EventKind::Reset]
    }
}

impl CollectionSource for Store {
    fn models(&self) -> Vec<Model> {
        self.collection.models()
    }
}

impl Viewable for Store {
    type View = StoreView;

    fn registry(&self) -> &ViewRegistry<StoreView> {
        &self.views
    }

    fn spawn_view(&self, options: ViewOptions) -> Arc<StoreView> {
        StoreView::new(self.this.clone(), options)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
