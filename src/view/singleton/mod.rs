use {
    crate::{buffer::Attributes, view::Source},
    serde_json::Value,
};

/// A single record: a state, or a state view's snapshot.
pub trait RecordSource: Source {
    fn attributes(&self) -> Attributes;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub trait RecordQuery: RecordSource {
    fn keys(&self) -> Vec<String> {
        self.attributes().keys().cloned().collect()
    }

    fn values(&self) -> Vec<Value> {
        self.attributes().values().cloned().collect()
    }

    fn pairs(&self) -> Vec<(String, Value)> {
        self.attributes().into_iter().collect()
    }

    /// Swaps keys and values. Values that are not strings are rendered
    /// as JSON text; on collision the later key wins.
    fn invert(&self) -> Attributes {
        self.attributes()
            .into_iter()
            .map(|(k, v)| {
                let key = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, Value::String(k))
            })
            .collect()
    }

    fn pick(&self, keys: &[&str]) -> Attributes {
        self.attributes()
            .into_iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .collect()
    }

    fn omit(&self, keys: &[&str]) -> Attributes {
        self.attributes()
            .into_iter()
            .filter(|(k, _)| !keys.contains(&k.as_str()))
            .collect()
    }

    fn has(&self, key: &str) -> bool {
        matches!(self.attributes().get(key), Some(v) if !v.is_null())
    }
}

impl<T: RecordSource + ?Sized> RecordQuery for T {}
