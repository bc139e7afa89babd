use {
    crate::{
        cid::Cid,
        error::Result,
        event::{Event, EventKind, NotifyFnObserver, Observer},
    },
    std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

static NEXT_LISTENER: AtomicUsize = AtomicUsize::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

struct Listener {
    id: ListenerId,
    owner: Option<Cid>,
    kinds: Vec<EventKind>,
    observer: Arc<dyn Observer>,
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Events
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
/// Synchronous event bus. Cloning yields another handle on the same
/// listener list.
#[derive(Clone, Default)]
pub struct Events {
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl Events {
    pub fn new() -> Self {
        Events::default()
    }

    pub fn add_observer(
        &self,
        owner: Option<Cid>,
        kinds: &[EventKind],
        observer: Arc<dyn Observer>,
    ) -> ListenerId {
        let id = ListenerId(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push(Listener {
            id,
            owner,
            kinds: kinds.to_vec(),
            observer,
        });
        id
    }

    /// Subscribes an anonymous listener.
    pub fn on<F>(&self, kind: EventKind, f: F) -> ListenerId
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        self.add_observer(None, &[kind], Arc::new(NotifyFnObserver::new(f)))
    }

    /// Subscribes a listener on behalf of `owner`, so that it can later be
    /// detached together with everything else `owner` registered here.
    pub fn listen<F>(&self, owner: &Cid, kinds: &[EventKind], f: F) -> ListenerId
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        self.add_observer(Some(owner.clone()), kinds, Arc::new(NotifyFnObserver::new(f)))
    }

    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn stop_listening(&self, owner: &Cid) -> usize {
        let mut listeners = self.listeners.write().unwrap();
        let before = listeners.len();
        listeners.retain(|l| l.owner.as_ref() != Some(owner));
        before - listeners.len()
    }

    pub fn clear(&self) {
        self.listeners.write().unwrap().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    /// Calls every listener subscribed to `event.kind`, in subscription
    /// order. The first failure aborts the dispatch and is returned.
    ///
    /// Listeners run without any lock held, so they may subscribe,
    /// unsubscribe or emit again.
    pub fn emit(&self, event: &Event) -> Result<()> {
        let observers = {
            let listeners = self.listeners.read().unwrap();
            listeners
                .iter()
                .filter(|l| l.kinds.contains(&event.kind))
                .map(|l| l.observer.clone())
                .collect::<Vec<_>>()
        };

        for observer in observers {
            observer.notify(event)?;
        }
        Ok(())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use crate::{cid::Cid, error::PrismError, event::*};
    use std::sync::{Arc, RwLock};

    fn sync_event() -> Event {
        Event::new(EventKind::Sync, Cid::generate("test"))
    }

    #[test]
    fn listeners_fire_in_subscription_order() {
        let events = Events::new();
        let log = Arc::new(RwLock::new(Vec::new()));

        for i in 0..3 {
            let log = log.clone();
            events.on(EventKind::Sync, move |_| {
                log.write().unwrap().push(i);
                Ok(())
            });
        }
        let other = log.clone();
        events.on(EventKind::Add, move |_| {
            other.write().unwrap().push(99);
            Ok(())
        });

        events.emit(&sync_event()).unwrap();
        assert_eq!(*log.read().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn stop_listening_detaches_owner_only() {
        let events = Events::new();
        let owner = Cid::generate("owner");

        events.listen(&owner, &[EventKind::Sync, EventKind::Add], |_| Ok(()));
        events.listen(&owner, &[EventKind::Remove], |_| Ok(()));
        let anon = events.on(EventKind::Sync, |_| Ok(()));

        assert_eq!(events.stop_listening(&owner), 2);
        assert_eq!(events.listener_count(), 1);
        assert!(events.off(anon));
        assert!(!events.off(anon));
    }

    #[test]
    fn listener_may_reenter_the_bus() {
        let events = Events::new();
        let inner = events.clone();
        events.on(EventKind::Sync, move |_| {
            inner.on(EventKind::Sync, |_| Ok(()));
            Ok(())
        });

        events.emit(&sync_event()).unwrap();
        assert_eq!(events.listener_count(), 2);
    }

    #[test]
    fn failure_stops_dispatch() {
        let events = Events::new();
        let reached = Arc::new(RwLock::new(false));

        events.on(EventKind::Sync, |_| Err(PrismError::callback("boom")));
        let flag = reached.clone();
        events.on(EventKind::Sync, move |_| {
            *flag.write().unwrap() = true;
            Ok(())
        });

        assert!(matches!(events.emit(&sync_event()), Err(PrismError::Callback(_))));
        assert!(!*reached.read().unwrap());
    }
}
