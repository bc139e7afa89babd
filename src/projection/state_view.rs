use {
    crate::{
        buffer::Attributes,
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
        view::{
            mutator::MutatorKind, Activatable, Activation, Configurable, Mutator, MutatorSet,
            RecordSource, Source, Syncable, ViewOptions, ViewRegistry, Viewable,
        },
    },
    serde_json::Value,
    std::{
        fmt,
        sync::{Arc, RwLock, Weak},
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                State View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Read-only copy of a state's attributes, tagged with the state's `cid`.
pub struct StateView {
    this: Weak<StateView>,
    cid: Cid,
    name: String,
    parent: Weak<dyn RecordSource>,
    events: Events,
    activation: Activation,
    options: RwLock<ViewOptions>,
    mutators: MutatorSet,
    views: ViewRegistry<StateView>,

    attributes: RwLock<Attributes>,
}

impl StateView {
    pub(crate) fn new<P>(parent: Weak<P>, options: ViewOptions) -> Arc<Self>
    where
        P: RecordSource + 'static,
    {
        let listen_to = match (&options.listen_to, parent.upgrade()) {
            (Some(kinds), _) => kinds.clone(),
            (None, Some(parent)) => parent.default_listen_to(),
            (None, None) => Vec::new(),
        };

        let view = Arc::new_cyclic(|this| StateView {
            this: this.clone(),
            cid: Cid::generate("view"),
            name: options.name.clone().unwrap_or_default(),
            parent,
            events: Events::new(),
            activation: Activation::new(listen_to),
            options: RwLock::new(options.clone()),
            mutators: MutatorSet::new(options),
            views: ViewRegistry::new(),
            attributes: RwLock::new(Attributes::new()),
        });
        view.await_parent();
        view
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> ViewOptions {
        self.options.read().unwrap().clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.read().unwrap().get(key).cloned()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.read().unwrap().clone())
    }

    pub fn create_config<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<ViewOptions> + Send + Sync + 'static,
    {
        let owner: Weak<dyn Configurable> = self.this.clone();
        self.mutators.attach(owner, &self.cid, MutatorKind::Config(Box::new(f)))
    }

    pub fn create_mutator<F>(&self, f: F) -> Arc<Mutator>
    where
        F: Fn() -> Result<ViewOptions> + Send + Sync + 'static,
    {
        self.create_config(f)
    }

    pub fn mutator(&self, cid: &Cid) -> Option<Arc<Mutator>> {
        self.mutators.get(cid)
    }

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

impl fmt::Debug for StateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView")
            .field("cid", &self.cid)
            .field("name", &self.name)
            .field("attributes", &*self.attributes.read().unwrap())
            .finish_non_exhaustive()
    }
}

impl Source for StateView {
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

impl RecordSource for StateView {
    fn attributes(&self) -> Attributes {
        self.attributes.read().unwrap().clone()
    }
}

impl Syncable for StateView {
    fn sync(&self) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        let Some(parent) = self.parent.upgrade() else {
            return Ok(());
        };

        let mut attributes = Attributes::new();
        attributes.insert("cid".into(), parent.cid().clone().into());
        attributes.extend(parent.attributes());
        tracing::trace!(view = %self.cid, keys = attributes.len(), "sync");

        *self.attributes.write().unwrap() = attributes;
        self.events.emit(&Event::new(EventKind::Sync, self.cid.clone()))
    }
}

impl Configurable for StateView {
    fn options_cell(&self) -> &RwLock<ViewOptions> {
        &self.options
    }

    fn mutators(&self) -> &MutatorSet {
        &self.mutators
    }
}

impl Activatable for StateView {
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

impl Viewable for StateView {
    type View = StateView;

    fn registry(&self) -> &ViewRegistry<StateView> {
        &self.views
    }

    fn spawn_view(&self, options: ViewOptions) -> Arc<StateView> {
        StateView::new(self.this.clone(), options)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{projection::state_view::*, state::State, view::RecordQuery};
    use serde_json::json;

    #[test]
    fn state_view1() {
        let state = State::from_json(json!({"name": "Ralph", "age": 3})).unwrap();
        let view = state.create_view(ViewOptions::new().name("pet")).unwrap();
        let nested = view.create_view(ViewOptions::new()).unwrap();

        assert!(view.get("name").is_none());
        state.publish().unwrap();

        assert_eq!(view.get("name"), Some(json!("Ralph")));
        assert_eq!(view.get("cid"), Some(json!(state.cid().as_str())));
        // the root record's cid survives a second hop
        assert_eq!(nested.get("cid"), Some(json!(state.cid().as_str())));

        state.set("age", 4).unwrap();
        assert_eq!(nested.get("age"), Some(json!(4)));
        assert_eq!(nested.pick(&["age"]).len(), 1);
    }

    #[test]
    fn mutators_patch_display_options() {
        let state = State::from_json(json!({"title": "pets"})).unwrap();
        let view = state.create_view(ViewOptions::new().with("uppercase", false)).unwrap();
        let upper = view.create_config(|| Ok(ViewOptions::new().with("uppercase", true)));
        state.publish().unwrap();

        assert_eq!(view.options().get("uppercase"), Some(&json!(true)));

        upper.destroy().unwrap();
        assert_eq!(view.options().get("uppercase"), Some(&json!(false)));
        assert!(view.mutator(upper.cid()).is_none());
    }

    #[test]
    fn sleeping_view_keeps_its_snapshot() {
        let state = State::from_json(json!({"n": 1})).unwrap();
        let view = state.create_view(ViewOptions::new()).unwrap();
        state.publish().unwrap();

        view.sleep();
        state.set("n", 2).unwrap();
        assert_eq!(view.get("n"), Some(json!(1)));

        view.wakeup(true).unwrap();
        assert_eq!(view.get("n"), Some(json!(2)));
        assert!(view.to_json()["cid"].is_string());
    }
}
