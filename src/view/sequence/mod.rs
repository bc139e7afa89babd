use {
    crate::{
        buffer::{Attributes, Model},
        view::{options::compare_values, Source},
    },
    serde_json::Value,
    std::{cmp::Ordering, collections::HashMap, hash::Hash},
};

/// Ordered sequence of records: a store, or a store view's projection.
pub trait CollectionSource: Source {
    /// Snapshot of the current sequence.
    fn models(&self) -> Vec<Model>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Read-only helpers over a fresh snapshot of [`CollectionSource::models`].
pub trait CollectionQuery: CollectionSource {
    fn for_each(&self, f: impl FnMut(&Model)) {
        self.models().iter().for_each(f)
    }

    fn map<T>(&self, f: impl FnMut(&Model) -> T) -> Vec<T> {
        self.models().iter().map(f).collect()
    }

    fn reduce<T>(&self, init: T, mut f: impl FnMut(T, &Model) -> T) -> T {
        self.models().iter().fold(init, |acc, m| f(acc, m))
    }

    fn reduce_right<T>(&self, init: T, mut f: impl FnMut(T, &Model) -> T) -> T {
        self.models().iter().rev().fold(init, |acc, m| f(acc, m))
    }

    fn find(&self, mut pred: impl FnMut(&Model) -> bool) -> Option<Model> {
        self.models().into_iter().find(|m| pred(m))
    }

    fn filter(&self, mut pred: impl FnMut(&Model) -> bool) -> Vec<Model> {
        self.models().into_iter().filter(|m| pred(m)).collect()
    }

    fn reject(&self, mut pred: impl FnMut(&Model) -> bool) -> Vec<Model> {
        self.models().into_iter().filter(|m| !pred(m)).collect()
    }

    fn every(&self, pred: impl FnMut(&Model) -> bool) -> bool {
        self.models().iter().all(pred)
    }

    fn some(&self, pred: impl FnMut(&Model) -> bool) -> bool {
        self.models().iter().any(pred)
    }

    fn contains(&self, model: &Model) -> bool {
        self.models().contains(model)
    }

    /// First record with the greatest key.
    fn max_by(&self, key: impl Fn(&Model) -> Value) -> Option<Model> {
        extreme_by(self.models(), key, Ordering::Greater)
    }

    /// First record with the smallest key.
    fn min_by(&self, key: impl Fn(&Model) -> Value) -> Option<Model> {
        extreme_by(self.models(), key, Ordering::Less)
    }

    fn first(&self) -> Option<Model> {
        self.models().into_iter().next()
    }

    fn last(&self) -> Option<Model> {
        self.models().pop()
    }

    fn take(&self, n: usize) -> Vec<Model> {
        self.models().into_iter().take(n).collect()
    }

    /// Everything but the last record.
    fn initial(&self) -> Vec<Model> {
        let mut models = self.models();
        models.pop();
        models
    }

    /// Everything but the first record.
    fn rest(&self) -> Vec<Model> {
        self.models().into_iter().skip(1).collect()
    }

    fn without(&self, model: &Model) -> Vec<Model> {
        self.reject(|m| m == model)
    }

    fn difference(&self, others: &[Model]) -> Vec<Model> {
        self.reject(|m| others.contains(m))
    }

    fn index_of(&self, model: &Model) -> Option<usize> {
        self.models().iter().position(|m| m == model)
    }

    fn last_index_of(&self, model: &Model) -> Option<usize> {
        self.models().iter().rposition(|m| m == model)
    }

    fn find_index(&self, pred: impl FnMut(&Model) -> bool) -> Option<usize> {
        self.models().iter().position(pred)
    }

    fn find_last_index(&self, pred: impl FnMut(&Model) -> bool) -> Option<usize> {
        self.models().iter().rposition(pred)
    }

    /// `(accepted, rejected)`
    fn partition(&self, mut pred: impl FnMut(&Model) -> bool) -> (Vec<Model>, Vec<Model>) {
        self.models().into_iter().partition(|m| pred(m))
    }

    fn group_by<K: Hash + Eq>(&self, key: impl Fn(&Model) -> K) -> HashMap<K, Vec<Model>> {
        let mut groups = HashMap::<K, Vec<Model>>::new();
        for model in self.models() {
            groups.entry(key(&model)).or_default().push(model);
        }
        groups
    }

    fn count_by<K: Hash + Eq>(&self, key: impl Fn(&Model) -> K) -> HashMap<K, usize> {
        let mut counts = HashMap::new();
        for model in self.models() {
            *counts.entry(key(&model)).or_insert(0) += 1;
        }
        counts
    }

    /// Last record wins on duplicate keys.
    fn index_by<K: Hash + Eq>(&self, key: impl Fn(&Model) -> K) -> HashMap<K, Model> {
        self.models().into_iter().map(|m| (key(&m), m)).collect()
    }

    /// Stable ascending sort by a derived value.
    fn sort_by(&self, key: impl Fn(&Model) -> Value) -> Vec<Model> {
        let mut keyed = self.models().into_iter().map(|m| (key(&m), m)).collect::<Vec<_>>();
        keyed.sort_by(|a, b| compare_values(&a.0, &b.0));
        keyed.into_iter().map(|(_, m)| m).collect()
    }

    fn sort_by_field(&self, field: &str) -> Vec<Model> {
        self.sort_by(|m| m.get(field).unwrap_or(Value::Null))
    }

    fn pluck(&self, field: &str) -> Vec<Option<Value>> {
        self.map(|m| m.get(field))
    }

    /// The given attributes of every record.
    fn pick_each(&self, keys: &[&str]) -> Vec<Attributes> {
        self.map(|m| {
            let attrs = m.attributes();
            keys.iter()
                .filter_map(|k| attrs.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect()
        })
    }
}

impl<T: CollectionSource + ?Sized> CollectionQuery for T {}

fn extreme_by(models: Vec<Model>, key: impl Fn(&Model) -> Value, wanted: Ordering) -> Option<Model> {
    let mut best: Option<(Value, Model)> = None;
    for model in models {
        let k = key(&model);
        let replace = match &best {
            Some((b, _)) => compare_values(&k, b) == wanted,
            None => true,
        };
        if replace {
            best = Some((k, model));
        }
    }
    best.map(|(_, m)| m)
}
