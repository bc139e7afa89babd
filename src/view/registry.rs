use {
    crate::{
        cid::unique_id,
        error::{PrismError, Result},
        event::EventKind,
        view::{options::ViewOptions, Source},
    },
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
};

pub const DEFAULT_VIEW: &str = "default";

/// Name-keyed child views of one instance.
/// A view leaves the registry when it emits `destroy`.
pub struct ViewRegistry<V> {
    views: Arc<RwLock<HashMap<String, Arc<V>>>>,
}

impl<V: Source + 'static> ViewRegistry<V> {
    pub fn new() -> Self {
        ViewRegistry {
            views: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<V>> {
        self.views.read().unwrap().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.read().unwrap().contains_key(name)
    }

    /// Sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.views.read().unwrap().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.views.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.read().unwrap().is_empty()
    }

    pub fn register(&self, name: String, view: Arc<V>) -> Result<Arc<V>> {
        {
            let mut views = self.views.write().unwrap();
            if views.contains_key(&name) {
                return Err(PrismError::DuplicateView(name));
            }
            views.insert(name.clone(), view.clone());
        }

        let registry = Arc::downgrade(&self.views);
        let cid = view.cid().clone();
        let key = name.clone();
        view.events().on(EventKind::Destroy, move |_| {
            if let Some(views) = registry.upgrade() {
                let mut views = views.write().unwrap();
                // the name may have been taken over by a newer view
                if views.get(&key).is_some_and(|v| *v.cid() == cid) {
                    views.remove(&key);
                    tracing::debug!(view = %cid, name = %key, "deregistered view");
                }
            }
            Ok(())
        });

        tracing::debug!(view = %view.cid(), %name, "registered view");
        Ok(view)
    }
}

impl<V: Source + 'static> Default for ViewRegistry<V> {
    fn default() -> Self {
        ViewRegistry::new()
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Viewable
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait Viewable {
    type View: Source + 'static;

    fn registry(&self) -> &ViewRegistry<Self::View>;

    /// Builds an unregistered view of `self`.
    fn spawn_view(&self, options: ViewOptions) -> Arc<Self::View>;

    fn create_view(&self, mut options: ViewOptions) -> Result<Arc<Self::View>> {
        let name = options.name.clone().unwrap_or_else(|| unique_id("view"));
        if self.registry().contains(&name) {
            return Err(PrismError::DuplicateView(name));
        }
        options.name = Some(name.clone());

        let view = self.spawn_view(options);
        self.registry().register(name, view)
    }

    fn get_view(&self, name: &str) -> Option<Arc<Self::View>> {
        self.registry().get(name)
    }

    /// Creates the view named `"default"` on first use.
    fn get_default_view(&self) -> Result<Arc<Self::View>> {
        match self.registry().get(DEFAULT_VIEW) {
            Some(view) => Ok(view),
            None => self.create_view(ViewOptions::new().name(DEFAULT_VIEW)),
        }
    }

    fn view_names(&self) -> Vec<String> {
        self.registry().names()
    }

    fn view_count(&self) -> usize {
        self.registry().len()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
