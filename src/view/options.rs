use {
    crate::{
        buffer::{Attributes, Model},
        cid::Cid,
        error::Result,
        event::EventKind,
    },
    serde::{Deserialize, Deserializer},
    serde_json::Value,
    std::{cmp::Ordering, fmt, sync::Arc},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Filter
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Clone)]
pub enum Filter {
    Predicate(Arc<dyn Fn(&Model) -> bool + Send + Sync>),
    /// Keeps records whose attributes contain this object.
    Matches(Attributes),
}

impl Filter {
    pub fn predicate(f: impl Fn(&Model) -> bool + Send + Sync + 'static) -> Self {
        Filter::Predicate(Arc::new(f))
    }

    pub fn matches(pattern: Attributes) -> Self {
        Filter::Matches(pattern)
    }

    /// Only objects are matchable; anything else means "no filter".
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(pattern) => Some(Filter::Matches(pattern)),
            Value::Null => None,
            other => {
                tracing::warn!(filter = %other, "ignoring filter that is not an object");
                None
            }
        }
    }

    pub fn accepts(&self, model: &Model) -> bool {
        match self {
            Filter::Predicate(f) => f(model),
            Filter::Matches(pattern) => model.matches(pattern),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
            Filter::Matches(pattern) => f.debug_tuple("Matches").field(pattern).finish(),
        }
    }
}

/// Named filters, kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct Filters(Vec<(Cid, Filter)>);

impl Filters {
    pub fn insert(&mut self, cid: Cid, filter: Filter) {
        match self.0.iter_mut().find(|(c, _)| *c == cid) {
            Some(entry) => entry.1 = filter,
            None => self.0.push((cid, filter)),
        }
    }

    pub fn remove(&mut self, cid: &Cid) -> Option<Filter> {
        let idx = self.0.iter().position(|(c, _)| c == cid)?;
        Some(self.0.remove(idx).1)
    }

    pub fn get(&self, cid: &Cid) -> Option<&Filter> {
        self.0.iter().find(|(c, _)| c == cid).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter().map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Comparator
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Clone)]
pub enum Comparator {
    /// Ascending by the value of one attribute.
    Field(String),
    /// Ascending by a derived value.
    Key(Arc<dyn Fn(&Model) -> Value + Send + Sync>),
    Compare(Arc<dyn Fn(&Model, &Model) -> Ordering + Send + Sync>),
}

impl Comparator {
    pub fn field(name: impl Into<String>) -> Self {
        Comparator::Field(name.into())
    }

    pub fn key(f: impl Fn(&Model) -> Value + Send + Sync + 'static) -> Self {
        Comparator::Key(Arc::new(f))
    }

    pub fn compare(f: impl Fn(&Model, &Model) -> Ordering + Send + Sync + 'static) -> Self {
        Comparator::Compare(Arc::new(f))
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(field) => Some(Comparator::Field(field)),
            Value::Null => None,
            other => {
                tracing::warn!(comparator = %other, "ignoring comparator that is not a field name");
                None
            }
        }
    }

    /// Stable sort.
    pub fn sort(&self, models: &mut Vec<Model>) {
        match self {
            Comparator::Compare(f) => models.sort_by(|a, b| f(a, b)),
            Comparator::Field(field) => sort_by_value(models, |m| m.get(field).unwrap_or(Value::Null)),
            Comparator::Key(f) => sort_by_value(models, |m| f(m)),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Comparator::Key(_) => f.write_str("Key(..)"),
            Comparator::Compare(_) => f.write_str("Compare(..)"),
        }
    }
}

fn sort_by_value(models: &mut Vec<Model>, key: impl Fn(&Model) -> Value) {
    let mut keyed = models.drain(..).map(|m| (key(&m), m)).collect::<Vec<_>>();
    keyed.sort_by(|a, b| compare_values(&a.0, &b.0));
    models.extend(keyed.into_iter().map(|(_, m)| m));
}

/// Ordering used for attribute values: null < bool < number < string.
/// Arrays and objects compare equal to anything of their own kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               View Options
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub name: Option<String>,
    #[serde(deserialize_with = "filter_from_json")]
    pub filter: Option<Filter>,
    #[serde(skip)]
    pub filters: Filters,
    #[serde(deserialize_with = "comparator_from_json")]
    pub comparator: Option<Comparator>,
    pub size: Option<i64>,
    pub offset: Option<i64>,
    #[serde(rename = "listenTo", alias = "listen_to", deserialize_with = "listen_to_from_json")]
    pub listen_to: Option<Vec<EventKind>>,
    /// Anything else, e.g. display flags read by whoever renders the view.
    #[serde(flatten)]
    pub extra: Attributes,
}

impl ViewOptions {
    pub fn new() -> Self {
        ViewOptions::default()
    }

    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn listen_to(mut self, kinds: &[EventKind]) -> Self {
        self.listen_to = Some(kinds.to_vec());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Overwrites every option that `patch` sets and keeps the rest.
    pub fn merge(&mut self, patch: ViewOptions) {
        let ViewOptions {
            name,
            filter,
            filters,
            comparator,
            size,
            offset,
            listen_to,
            extra,
        } = patch;

        if name.is_some() {
            self.name = name;
        }
        if filter.is_some() {
            self.filter = filter;
        }
        for (cid, filter) in filters.0 {
            self.filters.insert(cid, filter);
        }
        if comparator.is_some() {
            self.comparator = comparator;
        }
        if size.is_some() {
            self.size = size;
        }
        if offset.is_some() {
            self.offset = offset;
        }
        if listen_to.is_some() {
            self.listen_to = listen_to;
        }
        self.extra.extend(extra);
    }
}

fn filter_from_json<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<Filter>, D::Error> {
    Ok(Filter::from_value(Value::deserialize(de)?))
}

fn comparator_from_json<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<Comparator>, D::Error> {
    Ok(Comparator::from_value(Value::deserialize(de)?))
}

fn listen_to_from_json<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<Vec<EventKind>>, D::Error> {
    let kinds = match Value::deserialize(de)? {
        Value::String(s) => EventKind::parse_list(&s),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(EventKind::parse_list)
            .collect(),
        Value::Null => return Ok(None),
        other => {
            tracing::warn!(listen_to = %other, "ignoring malformed listenTo option");
            return Ok(None);
        }
    };

    Ok(if kinds.is_empty() { None } else { Some(kinds) })
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
