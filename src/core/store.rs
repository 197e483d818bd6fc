use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use tokio::sync::watch;

/// Issuance position of a pending write, see [Observable::ticket].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Sequence {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

/// A reactive value holder.
///
/// Handles are cheap to clone and all clones share the same value. [Observable::set] replaces
/// the value and wakes every subscriber immediately.
#[derive(Debug)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
    sequence: Arc<Sequence>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
            sequence: Arc::default(),
        }
    }

    /// Replace the current value, returning the previous one.
    pub fn set(&self, value: T) -> T {
        self.sender.send_replace(value)
    }

    /// Reserve a place for a value that will be written later with [Observable::set_in_order].
    pub fn ticket(&self) -> Ticket {
        Ticket(self.sequence.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Write `value` unless a write holding a later ticket already landed. Returns whether the
    /// value was written.
    ///
    /// Plain [Observable::set] calls are not ordered against ticketed writes.
    pub fn set_in_order(&self, ticket: Ticket, value: T) -> bool {
        let mut applied = self
            .sequence
            .applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if ticket.0 <= *applied {
            return false;
        }
        *applied = ticket.0;
        self.sender.send_replace(value);
        true
    }

    /// Receive every subsequent change. The receiver starts with the current value marked as
    /// seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

/// The UI state written by the dapp's handlers.
#[derive(Debug, Clone, Default)]
pub struct DappStore {
    /// Text shown in place of the connected wallet's address.
    pub wallet_address: Observable<String>,
    /// Last value read from the on-chain counter.
    pub counter: Observable<i64>,
}

impl DappStore {
    pub fn new() -> Self {
        Self::default()
    }
}
