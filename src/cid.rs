use {
    serde::Serialize,
    std::{
        fmt,
        sync::atomic::{AtomicUsize, Ordering},
    },
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// Returns `prefix` followed by a counter shared by every prefix,
/// so ids never repeat within the process.
pub fn unique_id(prefix: &str) -> String {
    format!("{}{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Client id of a record, view or mutator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    pub fn generate(prefix: &str) -> Self {
        Cid(unique_id(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Cid {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Cid {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<Cid> for serde_json::Value {
    fn from(cid: Cid) -> Self {
        serde_json::Value::String(cid.0)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::cid::*;

    #[test]
    fn ids_are_unique_across_prefixes() {
        let a = Cid::generate("c");
        let b = Cid::generate("view");
        let c = Cid::generate("c");

        assert!(a.as_str().starts_with('c'));
        assert!(b.as_str().starts_with("view"));
        assert_ne!(a, c);
        assert_ne!(&a.as_str()[1..], &b.as_str()[4..]);
    }
}
