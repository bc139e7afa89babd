use {
    crate::{
        error::Result,
        event::{Event, EventKind, Events, ListenerId},
        view::{mutator::Configurable, Source},
    },
    std::sync::{
        atomic::{AtomicBool, Ordering},
        RwLock, Weak,
    },
};

/// Activity state embedded in every view.
#[derive(Debug)]
pub struct Activation {
    listen_to: Vec<EventKind>,
    active: AtomicBool,
    initialized: AtomicBool,
    bootstrapped: AtomicBool,
    subscription: RwLock<Option<ListenerId>>,
}

impl Activation {
    pub fn new(listen_to: Vec<EventKind>) -> Self {
        Activation {
            listen_to,
            active: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            bootstrapped: AtomicBool::new(false),
            subscription: RwLock::new(None),
        }
    }

    pub fn listen_to(&self) -> &[EventKind] {
        &self.listen_to
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Activatable
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait Activatable: Source + Configurable + Sized + 'static {
    fn activation(&self) -> &Activation;
    fn this(&self) -> Weak<Self>;

    /// Bus of the parent, or `None` once the parent has been dropped.
    fn parent_events(&self) -> Option<Events>;

    fn is_active(&self) -> bool {
        self.activation().active.load(Ordering::SeqCst)
    }

    fn is_initialized(&self) -> bool {
        self.activation().initialized.load(Ordering::SeqCst)
    }

    fn sleep(&self) {
        let activation = self.activation();
        activation.active.store(false, Ordering::SeqCst);

        if let Some(id) = activation.subscription.write().unwrap().take() {
            if let Some(parent) = self.parent_events() {
                parent.off(id);
            }
        }
        tracing::debug!(view = %self.cid(), "sleep");
    }

    fn wakeup(&self, run_sync: bool) -> Result<()> {
        let activation = self.activation();

        if !activation.bootstrapped.load(Ordering::SeqCst) {
            self.mutators().apply_all_silent()?;
            activation.bootstrapped.store(true, Ordering::SeqCst);
        }

        let mut subscription = activation.subscription.write().unwrap();
        if subscription.is_none() {
            if let Some(parent) = self.parent_events() {
                let this = self.this();
                *subscription = Some(parent.listen(self.cid(), &activation.listen_to, move |_| {
                    match this.upgrade() {
                        Some(view) => view.sync(),
                        None => Ok(()),
                    }
                }));
            }
        }
        drop(subscription);

        activation.active.store(true, Ordering::SeqCst);
        tracing::debug!(view = %self.cid(), run_sync, "wakeup");

        if run_sync {
            self.sync()?;
        }
        Ok(())
    }

    /// Wakes the view, then publishes so that its own views start in turn.
    fn initialize(&self) -> Result<()> {
        self.wakeup(true)?;
        self.activation().initialized.store(true, Ordering::SeqCst);
        tracing::debug!(view = %self.cid(), "initialized");

        self.events().emit(&Event::new(EventKind::Publish, self.cid().clone()))
    }

    /// Initializes the view whenever the parent publishes.
    fn await_parent(&self) {
        let Some(parent) = self.parent_events() else {
            return;
        };
        let this = self.this();
        parent.listen(self.cid(), &[EventKind::Publish], move |_| match this.upgrade() {
            Some(view) => view.initialize(),
            None => Ok(()),
        });
    }
}
