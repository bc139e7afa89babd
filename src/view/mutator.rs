use {
    crate::{
        cid::Cid,
        error::Result,
        event::{Event, EventKind, Events},
        view::{
            options::{Comparator, Filter, ViewOptions},
            Syncable,
        },
    },
    std::{
        ops::Deref,
        sync::{
            atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
            Arc, RwLock, Weak,
        },
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Configurable
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// A view whose options are written by mutators.
pub trait Configurable: Syncable {
    fn options_cell(&self) -> &RwLock<ViewOptions>;
    fn mutators(&self) -> &MutatorSet;

    /// Rebuilds the options from the construction options and the last
    /// write of every remaining mutator, replayed in the order those writes
    /// happened. Callbacks are not run again.
    fn reconfigure(&self) {
        let mut writes = self
            .mutators()
            .list()
            .iter()
            .filter_map(|m| m.last_write())
            .collect::<Vec<_>>();
        writes.sort_by_key(|w| w.seq);

        let mut options = self.mutators().base().clone();
        for write in writes {
            write.contribution.merge_into(&write.mutator, &mut options);
        }
        *self.options_cell().write().unwrap() = options;
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Mutator
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub(crate) type ConfigFn = Box<dyn Fn() -> Result<ViewOptions> + Send + Sync>;
pub(crate) type FilterFn = Box<dyn Fn() -> Result<Filter> + Send + Sync>;
pub(crate) type ComparatorFn = Box<dyn Fn() -> Result<Comparator> + Send + Sync>;

pub(crate) enum MutatorKind {
    Config(ConfigFn),
    Filter(FilterFn),
    Comparator(ComparatorFn),
    Paginator(Arc<Pagination>),
}

/// What one application wrote into the owner's options.
#[derive(Clone, Debug)]
pub(crate) enum Contribution {
    Config(ViewOptions),
    Filter(Filter),
    Comparator(Comparator),
    Bounds { size: i64, offset: i64 },
}

impl Contribution {
    fn merge_into(&self, mutator: &Cid, options: &mut ViewOptions) {
        match self {
            Contribution::Config(patch) => options.merge(patch.clone()),
            Contribution::Filter(filter) => options.filters.insert(mutator.clone(), filter.clone()),
            Contribution::Comparator(comparator) => options.comparator = Some(comparator.clone()),
            Contribution::Bounds { size, offset } => {
                options.size = Some(*size);
                options.offset = Some(*offset);
            }
        }
    }
}

static NEXT_WRITE: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug)]
pub(crate) struct Write {
    seq: u64,
    mutator: Cid,
    contribution: Contribution,
}

impl MutatorKind {
    fn prefix(&self) -> &'static str {
        match self {
            MutatorKind::Config(_) => "mutator",
            MutatorKind::Filter(_) => "filter",
            MutatorKind::Comparator(_) => "comparator",
            MutatorKind::Paginator(_) => "paginator",
        }
    }
}

/// Writes a callback's result into its owner's options.
/// The callback runs again on every application; nothing is cached.
pub struct Mutator {
    cid: Cid,
    owner: Weak<dyn Configurable>,
    kind: MutatorKind,
    events: Events,
    last_write: RwLock<Option<Write>>,
    destroyed: AtomicBool,
}

impl Mutator {
    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    /// Emits `set` after every non-silent application and `destroy` once.
    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn was_applied(&self) -> bool {
        self.last_write.read().unwrap().is_some()
    }

    pub(crate) fn last_write(&self) -> Option<Write> {
        self.last_write.read().unwrap().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn apply(&self) -> Result<()> {
        if self.write()? {
            self.events.emit(&Event::new(EventKind::Set, self.cid.clone()))?;
        }
        Ok(())
    }

    pub fn apply_silent(&self) -> Result<()> {
        self.write().map(|_| ())
    }

    /// Returns false when there was nothing to write into.
    fn write(&self) -> Result<bool> {
        if self.is_destroyed() {
            return Ok(false);
        }
        let Some(owner) = self.owner.upgrade() else {
            return Ok(false);
        };

        // evaluate the callback before locking: it may read the owner
        let contribution = match &self.kind {
            MutatorKind::Config(f) => Contribution::Config(f()?),
            MutatorKind::Filter(f) => Contribution::Filter(f()?),
            MutatorKind::Comparator(f) => Contribution::Comparator(f()?),
            MutatorKind::Paginator(pages) => Contribution::Bounds {
                size: i64::try_from(pages.page_size).unwrap_or(i64::MAX),
                offset: i64::try_from(pages.offset()).unwrap_or(i64::MAX),
            },
        };

        contribution.merge_into(&self.cid, &mut owner.options_cell().write().unwrap());
        *self.last_write.write().unwrap() = Some(Write {
            seq: NEXT_WRITE.fetch_add(1, Ordering::SeqCst),
            mutator: self.cid.clone(),
            contribution,
        });
        tracing::trace!(mutator = %self.cid, "applied");
        Ok(true)
    }

    /// Idempotent. The owner drops this mutator's contribution and
    /// re-syncs once.
    pub fn destroy(&self) -> Result<()> {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(mutator = %self.cid, "destroying mutator");

        let result = self.events.emit(&Event::new(EventKind::Destroy, self.cid.clone()));
        self.events.clear();
        result
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                Paginator
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Debug)]
pub struct Pagination {
    page: AtomicUsize,
    page_size: usize,
}

impl Pagination {
    fn offset(&self) -> usize {
        self.page.load(Ordering::SeqCst).saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Mutator translating a 1-based page into `size` / `offset`.
#[derive(Clone)]
pub struct Paginator {
    mutator: Arc<Mutator>,
    pages: Arc<Pagination>,
}

impl Paginator {
    pub fn page(&self) -> usize {
        self.pages.page.load(Ordering::SeqCst)
    }

    pub fn page_size(&self) -> usize {
        self.pages.page_size
    }

    pub fn total_pages(&self, total: usize) -> usize {
        if self.pages.page_size == 0 {
            0
        } else {
            total.div_ceil(self.pages.page_size)
        }
    }

    pub fn set_current_page(&self, page: usize, apply: bool) -> Result<()> {
        self.pages.page.store(page, Ordering::SeqCst);
        if apply {
            self.mutator.apply()?;
        }
        Ok(())
    }

    pub fn mutator(&self) -> &Arc<Mutator> {
        &self.mutator
    }
}

impl Deref for Paginator {
    type Target = Mutator;

    fn deref(&self) -> &Mutator {
        &self.mutator
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Mutator Set
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// The mutators of one view, in registration order, together with the
/// options the view was constructed with.
pub struct MutatorSet {
    base: ViewOptions,
    list: RwLock<Vec<Arc<Mutator>>>,
}

impl MutatorSet {
    pub fn new(base: ViewOptions) -> Self {
        MutatorSet {
            base,
            list: RwLock::new(Vec::new()),
        }
    }

    pub fn base(&self) -> &ViewOptions {
        &self.base
    }

    pub fn list(&self) -> Vec<Arc<Mutator>> {
        self.list.read().unwrap().clone()
    }

    pub fn get(&self, cid: &Cid) -> Option<Arc<Mutator>> {
        self.list.read().unwrap().iter().find(|m| m.cid() == cid).cloned()
    }

    pub fn len(&self) -> usize {
        self.list.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.read().unwrap().is_empty()
    }

    /// Silent first pass, in registration order.
    pub fn apply_all_silent(&self) -> Result<()> {
        for mutator in self.list() {
            mutator.apply_silent()?;
        }
        Ok(())
    }

    pub(crate) fn attach(
        &self,
        owner: Weak<dyn Configurable>,
        owner_cid: &Cid,
        kind: MutatorKind,
    ) -> Arc<Mutator> {
        let mutator = Arc::new(Mutator {
            cid: Cid::generate(kind.prefix()),
            owner: owner.clone(),
            kind,
            events: Events::new(),
            last_write: RwLock::new(None),
            destroyed: AtomicBool::new(false),
        });

        // the owner subscribes first, so it has re-synced before anybody
        // else hears about the change
        let on_set = owner.clone();
        mutator.events.listen(owner_cid, &[EventKind::Set], move |_| match on_set.upgrade() {
            Some(owner) => owner.sync(),
            None => Ok(()),
        });

        let cid = mutator.cid.clone();
        mutator.events.listen(owner_cid, &[EventKind::Destroy], move |_| match owner.upgrade() {
            Some(owner) => {
                owner.mutators().detach(&cid);
                owner.reconfigure();
                owner.sync()
            }
            None => Ok(()),
        });

        tracing::debug!(owner = %owner_cid, mutator = %mutator.cid, "attached mutator");
        self.list.write().unwrap().push(mutator.clone());
        mutator
    }

    pub(crate) fn attach_paginator(
        &self,
        owner: Weak<dyn Configurable>,
        owner_cid: &Cid,
        page_size: usize,
        page: usize,
    ) -> Paginator {
        let pages = Arc::new(Pagination {
            page: AtomicUsize::new(page),
            page_size,
        });
        let mutator = self.attach(owner, owner_cid, MutatorKind::Paginator(pages.clone()));
        Paginator { mutator, pages }
    }

    fn detach(&self, cid: &Cid) -> Option<Arc<Mutator>> {
        let mut list = self.list.write().unwrap();
        let idx = list.iter().position(|m| m.cid() == cid)?;
        Some(list.remove(idx))
    }

    /// Stops `owner` listening to every mutator; used when the owner goes away.
    pub(crate) fn release(&self, owner_cid: &Cid) {
        for mutator in self.list() {
            mutator.events.stop_listening(owner_cid);
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{error::PrismError, view::mutator::*};
    use serde_json::json;

    /// Minimal owner counting its syncs.
    struct Owner {
        cid: Cid,
        options: RwLock<ViewOptions>,
        mutators: MutatorSet,
        syncs: AtomicUsize,
    }

    impl Syncable for Owner {
        fn sync(&self) -> Result<()> {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Configurable for Owner {
        fn options_cell(&self) -> &RwLock<ViewOptions> {
            &self.options
        }

        fn mutators(&self) -> &MutatorSet {
            &self.mutators
        }
    }

    fn owner(base: ViewOptions) -> Arc<Owner> {
        Arc::new(Owner {
            cid: Cid::generate("owner"),
            options: RwLock::new(base.clone()),
            mutators: MutatorSet::new(base),
            syncs: AtomicUsize::new(0),
        })
    }

    fn attach(owner: &Arc<Owner>, kind: MutatorKind) -> Arc<Mutator> {
        let weak: Weak<dyn Configurable> = Arc::downgrade(owner) as Weak<Owner>;
        owner.mutators.attach(weak, &owner.cid, kind)
    }

    #[test]
    fn silent_apply_does_not_notify() {
        let owner = owner(ViewOptions::new().size(10));
        let config = attach(&owner, MutatorKind::Config(Box::new(|| Ok(ViewOptions::new().size(5)))));

        config.apply_silent().unwrap();
        assert_eq!(owner.options.read().unwrap().size, Some(5));
        assert_eq!(owner.syncs.load(Ordering::SeqCst), 0);

        config.apply().unwrap();
        assert_eq!(owner.syncs.load(Ordering::SeqCst), 1);
        assert!(config.cid().as_str().starts_with("mutator"));
    }

    #[test]
    fn owner_resyncs_before_other_listeners() {
        let owner = owner(ViewOptions::new());
        let config = attach(&owner, MutatorKind::Config(Box::new(|| Ok(ViewOptions::new()))));

        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let (watched, target) = (owner.clone(), seen.clone());
        config.events().on(EventKind::Set, move |_| {
            target.store(watched.syncs.load(Ordering::SeqCst), Ordering::SeqCst);
            Ok(())
        });

        config.apply().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn filters_are_keyed_by_mutator() {
        let owner = owner(ViewOptions::new());
        let a = attach(&owner, MutatorKind::Filter(Box::new(|| Ok(Filter::predicate(|_| true)))));
        let b = attach(
            &owner,
            MutatorKind::Filter(Box::new(|| Ok(Filter::matches(json!({"age": 5}).as_object().unwrap().clone())))),
        );
        a.apply_silent().unwrap();
        b.apply_silent().unwrap();

        let options = owner.options.read().unwrap();
        assert_eq!(options.filters.len(), 2);
        assert!(options.filters.get(a.cid()).is_some());
        assert!(matches!(options.filters.get(b.cid()), Some(Filter::Matches(_))));
    }

    #[test]
    fn last_comparator_wins() {
        let owner = owner(ViewOptions::new());
        let by_name = attach(&owner, MutatorKind::Comparator(Box::new(|| Ok(Comparator::field("name")))));
        let by_age = attach(&owner, MutatorKind::Comparator(Box::new(|| Ok(Comparator::field("age")))));

        owner.mutators.apply_all_silent().unwrap();
        assert!(matches!(owner.options.read().unwrap().comparator, Some(Comparator::Field(ref f)) if f == "age"));

        by_name.apply_silent().unwrap();
        assert!(matches!(owner.options.read().unwrap().comparator, Some(Comparator::Field(ref f)) if f == "name"));
        drop(by_age);
    }

    #[test]
    fn destroy_removes_contribution_once() {
        let owner = owner(ViewOptions::new().size(3));
        let filter = attach(&owner, MutatorKind::Filter(Box::new(|| Ok(Filter::predicate(|_| false)))));
        let config = attach(&owner, MutatorKind::Config(Box::new(|| Ok(ViewOptions::new().offset(2)))));
        owner.mutators.apply_all_silent().unwrap();

        filter.destroy().unwrap();
        filter.destroy().unwrap();

        assert_eq!(owner.syncs.load(Ordering::SeqCst), 1);
        assert_eq!(owner.mutators.len(), 1);
        assert!(filter.is_destroyed());
        assert_eq!(filter.events().listener_count(), 0);

        let options = owner.options.read().unwrap();
        assert!(options.filters.is_empty());
        assert_eq!(options.size, Some(3));
        assert_eq!(options.offset, Some(2));
        drop(options);

        // destroyed mutators write nothing
        filter.apply().unwrap();
        assert_eq!(owner.syncs.load(Ordering::SeqCst), 1);
        assert!(config.was_applied());
    }

    #[test]
    fn destroy_replays_remaining_writes_in_applied_order() {
        let owner = owner(ViewOptions::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let by_name = attach(
            &owner,
            MutatorKind::Comparator(Box::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Comparator::field("name"))
            })),
        );
        let by_age = attach(&owner, MutatorKind::Comparator(Box::new(|| Ok(Comparator::field("age")))));
        let noop = attach(&owner, MutatorKind::Filter(Box::new(|| Ok(Filter::predicate(|_| true)))));
        owner.mutators.apply_all_silent().unwrap();
        by_name.apply().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        noop.destroy().unwrap();
        assert!(matches!(owner.options.read().unwrap().comparator, Some(Comparator::Field(ref f)) if f == "name"));
        assert!(owner.options.read().unwrap().filters.is_empty());
        // the stored write is replayed, the callback is not
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(by_age.was_applied());
    }

    #[test]
    fn destroy_keeps_pending_page_unapplied() {
        let owner = owner(ViewOptions::new());
        let weak: Weak<dyn Configurable> = Arc::downgrade(&owner) as Weak<Owner>;
        let paginator = owner.mutators.attach_paginator(weak, &owner.cid, 3, 2);
        let config = attach(&owner, MutatorKind::Config(Box::new(|| Ok(ViewOptions::new().with("dense", true)))));
        owner.mutators.apply_all_silent().unwrap();

        paginator.set_current_page(3, false).unwrap();
        config.destroy().unwrap();

        let options = owner.options.read().unwrap();
        assert_eq!(options.offset, Some(3));
        assert_eq!(options.size, Some(3));
        assert!(options.get("dense").is_none());
    }

    #[test]
    fn huge_page_saturates_offset() {
        let owner = owner(ViewOptions::new());
        let weak: Weak<dyn Configurable> = Arc::downgrade(&owner) as Weak<Owner>;
        let paginator = owner.mutators.attach_paginator(weak, &owner.cid, usize::MAX / 2, usize::MAX);

        paginator.apply_silent().unwrap();
        let options = owner.options.read().unwrap();
        assert_eq!(options.offset, Some(i64::MAX));
        assert_eq!(options.size, Some(i64::try_from(usize::MAX / 2).unwrap_or(i64::MAX)));
    }

    #[test]
    fn callback_failure_propagates() {
        let owner = owner(ViewOptions::new().size(3));
        let config = attach(
            &owner,
            MutatorKind::Config(Box::new(|| Err(PrismError::callback("no options today")))),
        );

        assert!(matches!(config.apply(), Err(PrismError::Callback(_))));
        assert!(matches!(owner.mutators.apply_all_silent(), Err(PrismError::Callback(_))));
        assert_eq!(owner.options.read().unwrap().size, Some(3));
        assert!(!config.was_applied());
    }

    #[test]
    fn paginator_pages() {
        let owner = owner(ViewOptions::new());
        let weak: Weak<dyn Configurable> = Arc::downgrade(&owner) as Weak<Owner>;
        let paginator = owner.mutators.attach_paginator(weak, &owner.cid, 3, 2);

        paginator.apply_silent().unwrap();
        assert_eq!(owner.options.read().unwrap().size, Some(3));
        assert_eq!(owner.options.read().unwrap().offset, Some(3));
        assert_eq!(paginator.total_pages(7), 3);
        assert_eq!(paginator.total_pages(6), 2);

        paginator.set_current_page(3, false).unwrap();
        assert_eq!(paginator.page(), 3);
        assert_eq!(owner.options.read().unwrap().offset, Some(3));
        assert_eq!(owner.syncs.load(Ordering::SeqCst), 0);

        paginator.set_current_page(1, true).unwrap();
        assert_eq!(owner.options.read().unwrap().offset, Some(0));
        assert_eq!(owner.syncs.load(Ordering::SeqCst), 1);
        assert!(paginator.cid().as_str().starts_with("paginator"));
    }
}
