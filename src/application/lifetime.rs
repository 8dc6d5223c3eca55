use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Mounted/unmounted flag shared between a view and its in-flight requests.
#[derive(Debug)]
pub struct ViewLifetime {
    alive: Arc<AtomicBool>,
}

/// Tracks the newest request of one kind issued by a view.
#[derive(Debug, Default)]
pub struct RequestSlot {
    latest: u64,
}

/// Handed out when a request starts, presented again when it completes.
#[derive(Debug)]
pub struct Ticket {
    alive: Arc<AtomicBool>,
    generation: u64,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn ticket(&self, slot: &mut RequestSlot) -> Ticket {
        slot.latest += 1;
        Ticket {
            alive: Arc::clone(&self.alive),
            generation: slot.latest,
        }
    }

    pub fn unmount(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl RequestSlot {
    /// A completion is applied only while the view is mounted and no newer
    /// request of the same kind has started.
    pub fn accepts(&self, ticket: &Ticket) -> bool {
        ticket.is_live() && ticket.generation == self.latest
    }
}

impl Ticket {
    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
