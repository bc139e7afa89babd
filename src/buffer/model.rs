use {
    crate::{
        cid::Cid,
        error::{PrismError, Result},
        event::{Event, EventKind, Events},
    },
    serde_json::{Map, Value},
    std::{
        fmt,
        sync::{Arc, RwLock},
    },
};

pub type Attributes = Map<String, Value>;

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Observable record. Clones share the same attributes and bus;
/// equality is identity.
#[derive(Clone)]
pub struct Model {
    cid: Cid,
    attributes: Arc<RwLock<Attributes>>,
    events: Events,
}

impl Model {
    pub fn new(attributes: Attributes) -> Self {
        Model {
            cid: Cid::generate("c"),
            attributes: Arc::new(RwLock::new(attributes)),
            events: Events::new(),
        }
    }

    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Ok(Model::new(attributes)),
            other => Err(PrismError::NotAnObject(other)),
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.read().unwrap().get(key).cloned()
    }

    /// True if the attribute exists and is not null.
    pub fn has(&self, key: &str) -> bool {
        matches!(self.attributes.read().unwrap().get(key), Some(v) if !v.is_null())
    }

    pub fn attributes(&self) -> Attributes {
        self.attributes.read().unwrap().clone()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let mut attrs = Attributes::new();
        attrs.insert(key.into(), value.into());
        self.set_all(attrs)
    }

    /// Merges `attrs` into the record. Emits a single `change` if at least
    /// one value differs from what was stored.
    pub fn set_all(&self, attrs: Attributes) -> Result<()> {
        let mut data = self.attributes.write().unwrap();
        let mut changed = false;
        for (key, value) in attrs {
            if data.get(&key) != Some(&value) {
                data.insert(key, value);
                changed = true;
            }
        }
        drop(data);

        if changed {
            self.events.emit(&Event::new(EventKind::Change, self.cid.clone()))?;
        }
        Ok(())
    }

    pub fn unset(&self, key: &str) -> Result<()> {
        let removed = self.attributes.write().unwrap().remove(key);
        if removed.is_some() {
            self.events.emit(&Event::new(EventKind::Change, self.cid.clone()))?;
        }
        Ok(())
    }

    /// Subset equality: every key of `pattern` is present with an equal value.
    pub fn matches(&self, pattern: &Attributes) -> bool {
        let data = self.attributes.read().unwrap();
        pattern.iter().all(|(key, value)| data.get(key) == Some(value))
    }

    /// Attributes plus the record's `cid`.
    pub fn to_json(&self) -> Value {
        let mut out = Attributes::new();
        out.insert("cid".into(), self.cid.clone().into());
        out.extend(self.attributes());
        Value::Object(out)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.attributes, &other.attributes)
    }
}

impl Eq for Model {}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.cid)
            .field("attributes", &*self.attributes.read().unwrap())
            .finish()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
