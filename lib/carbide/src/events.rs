use crate::error::Fault;
use crate::session::Session;
use std::cell::RefCell;
use std::rc::Rc;

/// Events published by the engine. Discriminants are part of the host
/// contract and must never be renumbered; extensions append.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// Ciphertext is available to send to the peer.
    IoOutEnc = 0,
    /// Cleartext is available for the application.
    IoOutClear = 1,
    /// Ciphertext was pushed in.
    IoInEnc = 2,
    /// Cleartext was pushed in.
    IoInClear = 3,
    /// A log message was emitted; retrieve via `Session::log_msg_get`.
    LogMsg = 4,
}

impl Event {
    pub const COUNT: usize = 5;

    #[inline]
    pub fn indexer(self) -> usize {
        self as usize
    }
}

/// Subscribers hold their baton as closure captures and may re-enter the
/// session, so they live behind `Rc<RefCell<_>>` rather than inside it.
pub type Subscriber = Rc<RefCell<dyn FnMut(&mut Session, Event) -> Result<(), Fault>>>;

/// Per-event subscriber lists, directly indexed by the event discriminant.
pub(crate) struct Subscriptions {
    table: [Vec<Subscriber>; Event::COUNT],
}

impl Subscriptions {
    #[inline]
    pub fn new() -> Subscriptions {
        Subscriptions {
            table: Default::default(),
        }
    }

    /// Appends a subscriber; delivery follows subscription order.
    #[inline]
    pub fn subscribe(&mut self, event: Event, subscriber: Subscriber) {
        self.table[event.indexer()].push(subscriber);
    }

    /// Clones the current subscriber list. Publication iterates the
    /// snapshot, so subscribers added mid-publish only see the next one.
    #[inline]
    pub fn snapshot(&self, event: Event) -> Vec<Subscriber> {
        self.table[event.indexer()].clone()
    }
}
