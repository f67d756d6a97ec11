//! Forward traversal links derived from a coordinator's order.
//!
//! The order vector is the single source of truth. [`OrderLinks`] is a
//! rebuilt mirror of it that lets per-tick propagation hop from tracker to
//! tracker without rescanning the order: `next(order[i]) == order[i + 1]` and
//! `next(order[last]) == None`.

/// Singly linked traversal over tracker storage slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLinks {
    head: Option<usize>,
    next: Vec<Option<usize>>,
}

impl OrderLinks {
    /// Build the links mirroring `order`. `slots` is the number of storage
    /// slots; every entry of `order` must be `< slots`.
    pub fn from_order(order: &[usize], slots: usize) -> Self {
        let mut next = vec![None; slots];
        for pair in order.windows(2) {
            next[pair[0]] = Some(pair[1]);
        }
        Self {
            head: order.first().copied(),
            next,
        }
    }

    /// Slot of the primary tracker.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Slot following `slot`, or `None` at the end of the chain.
    pub fn next(&self, slot: usize) -> Option<usize> {
        self.next.get(slot).copied().flatten()
    }

    /// Iterate slots from the head along the chain.
    pub fn walk(&self) -> LinkWalk<'_> {
        LinkWalk {
            links: self,
            cursor: self.head,
        }
    }

    /// Whether these links are exactly the mirror of `order`.
    pub fn mirrors(&self, order: &[usize]) -> bool {
        if self.head != order.first().copied() {
            return false;
        }
        let mut expected = vec![None; self.next.len()];
        for pair in order.windows(2) {
            match expected.get_mut(pair[0]) {
                Some(slot) => *slot = Some(pair[1]),
                None => return false,
            }
        }
        expected == self.next
    }
}

/// Iterator returned by [`OrderLinks::walk`].
pub struct LinkWalk<'a> {
    links: &'a OrderLinks,
    cursor: Option<usize>,
}

impl Iterator for LinkWalk<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let slot = self.cursor?;
        self.cursor = self.links.next(slot);
        Some(slot)
    }
}
