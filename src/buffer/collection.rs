use {
    crate::{
        buffer::model::Model,
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
    },
    std::sync::{Arc, RwLock},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[derive(Clone, Debug)]
pub enum CollectionDiff {
    Add { idx: usize, model: Model },
    Remove(usize),
    Reset(Vec<Model>),
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Observable ordered sequence of records. A record's own `change`
/// is re-emitted here for as long as it belongs to the collection.
#[derive(Clone)]
pub struct Collection {
    cid: Cid,
    data: Arc<RwLock<Vec<Model>>>,
    events: Events,
}

impl Collection {
    pub fn new() -> Self {
        Collection {
            cid: Cid::generate("collection"),
            data: Arc::new(RwLock::new(Vec::new())),
            events: Events::new(),
        }
    }

    /// Repeated records are kept once, at their first position.
    pub fn with_models(models: Vec<Model>) -> Self {
        let models = unique(models);
        let collection = Collection::new();
        for model in models.iter() {
            collection.forward(model);
        }
        *collection.data.write().unwrap() = models;
        collection
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }

    pub fn at(&self, idx: usize) -> Option<Model> {
        self.data.read().unwrap().get(idx).cloned()
    }

    pub fn get(&self, cid: &Cid) -> Option<Model> {
        self.data.read().unwrap().iter().find(|m| m.cid() == cid).cloned()
    }

    pub fn index_of(&self, model: &Model) -> Option<usize> {
        self.data.read().unwrap().iter().position(|m| m == model)
    }

    pub fn models(&self) -> Vec<Model> {
        self.data.read().unwrap().clone()
    }

    pub fn apply_diff(&self, diff: CollectionDiff) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let event = match diff {
            CollectionDiff::Add { idx, model } => {
                if data.contains(&model) {
                    return Ok(());
                }
                let idx = idx.min(data.len());
                self.forward(&model);
                let target = model.cid().clone();
                data.insert(idx, model);
                Event::new(EventKind::Add, target)
            }
            CollectionDiff::Remove(idx) => {
                if idx >= data.len() {
                    return Ok(());
                }
                let model = data.remove(idx);
                model.events().stop_listening(&self.cid);
                Event::new(EventKind::Remove, model.cid().clone())
            }
            CollectionDiff::Reset(models) => {
                let models = unique(models);
                for old in data.iter() {
                    old.events().stop_listening(&self.cid);
                }
                for model in models.iter() {
                    self.forward(model);
                }
                *data = models;
                Event::new(EventKind::Reset, self.cid.clone())
            }
        };
        drop(data);

        self.events.emit(&event)
    }

    pub fn push(&self, model: Model) -> Result<()> {
        self.apply_diff(CollectionDiff::Add { idx: usize::MAX, model })
    }

    pub fn insert(&self, idx: usize, model: Model) -> Result<()> {
        self.apply_diff(CollectionDiff::Add { idx, model })
    }

    pub fn remove(&self, model: &Model) -> Result<Option<Model>> {
        match self.index_of(model) {
            Some(idx) => {
                self.apply_diff(CollectionDiff::Remove(idx))?;
                Ok(Some(model.clone()))
            }
            None => Ok(None),
        }
    }

    pub fn reset(&self, models: Vec<Model>) -> Result<()> {
        self.apply_diff(CollectionDiff::Reset(models))
    }

    fn forward(&self, model: &Model) {
        let events = self.events.clone();
        model.events().listen(&self.cid, &[EventKind::Change], move |event| {
            events.emit(&Event::new(EventKind::Change, event.target.clone()))
        });
    }
}

fn unique(models: Vec<Model>) -> Vec<Model> {
    let mut kept = Vec::with_capacity(models.len());
    for model in models {
        if !kept.contains(&model) {
            kept.push(model);
        }
    }
    kept
}

impl Default for Collection {
    fn default() -> Self {
        Collection::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
