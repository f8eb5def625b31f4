/// Identifies a subscriber registered on an [`EventBus`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Typed event fan-out for a single-threaded owner.
///
/// Events are delivered synchronously to every subscriber in registration
/// order and also kept in a log until drained, so headless callers can
/// inspect what happened without registering a listener.
pub struct EventBus<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
    log: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
            log: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.log.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, event: E) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        self.log.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.log
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.log)
    }

    /// Drops every subscriber and the pending log.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.log.clear();
    }
}
