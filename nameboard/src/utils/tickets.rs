use std::collections::HashMap;
use std::hash::Hash;

/// Issued when a request for `target` starts. Only the most recently issued
/// ticket for a target is current; results carrying older tickets are stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub target: K,
    pub seq: u64,
}

#[derive(Debug)]
pub struct Tickets<K> {
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K: Eq + Hash + Clone> Default for Tickets<K> {
    fn default() -> Self {
        Self { next: 0, latest: HashMap::new() }
    }
}

impl<K: Eq + Hash + Clone> Tickets<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, target: K) -> Ticket<K> {
        self.next += 1;
        self.latest.insert(target.clone(), self.next);
        Ticket { target, seq: self.next }
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.latest.get(&ticket.target) == Some(&ticket.seq)
    }
}
