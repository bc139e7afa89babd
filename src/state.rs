use {
    crate::{
        buffer::{Attributes, Model},
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
        projection::StateView,
        view::{RecordSource, Source, ViewOptions, ViewRegistry, Viewable},
    },
    serde_json::Value,
    std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

/// Observable record that hands out state views.
pub struct State {
    this: Weak<State>,
    model: Model,
    views: ViewRegistry<StateView>,
    initialized: AtomicBool,
}

impl State {
    pub fn new(attributes: Attributes) -> Arc<Self> {
        State::with_model(Model::new(attributes))
    }

    pub fn with_model(model: Model) -> Arc<Self> {
        Arc::new_cyclic(|this| State {
            this: this.clone(),
            model,
            views: ViewRegistry::new(),
            initialized: AtomicBool::new(false),
        })
    }

    pub fn from_json(value: Value) -> Result<Arc<Self>> {
        Ok(State::with_model(Model::from_json(value)?))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.model.get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.model.set(key, value)
    }

    pub fn set_all(&self, attributes: Attributes) -> Result<()> {
        self.model.set_all(attributes)
    }

    pub fn unset(&self, key: &str) -> Result<()> {
        self.model.unset(key)
    }

    pub fn to_json(&self) -> Value {
        self.model.to_json()
    }

    /// Starts every view created so far, and their views in turn.
    pub fn publish(&self) -> Result<()> {
        tracing::debug!(state = %self.model.cid(), views = self.views.len(), "publish");
        self.model
            .events()
            .emit(&Event::new(EventKind::Publish, self.model.cid().clone()))?;
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

impl Source for State {
    fn cid(&self) -> &Cid {
        self.model.cid()
    }

    fn events(&self) -> &Events {
        self.model.events()
    }

    fn default_listen_to(&self) -> Vec<EventKind> {
        vec![EventKind::Change]
    }
}

impl RecordSource for State {
    fn attributes(&self) -> Attributes {
        self.model.attributes()
    }
}

impl Viewable for State {
    type View = StateView;

    fn registry(&self) -> &ViewRegistry<StateView> {
        &self.views
    }

    fn spawn_view(&self, options: ViewOptions) -> Arc<StateView> {
        StateView::new(self.this.clone(), options)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
