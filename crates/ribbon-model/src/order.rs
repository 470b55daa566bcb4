#![forbid(unsafe_code)]

//! Order assignment for pages, groups, and items.
//!
//! Every element carries an explicit `order` sort key. Unset (`0`) values
//! are assigned sequentially in encounter order; pre-set values are
//! preserved and act as a high-water mark for later automatic assignment.
//! A pre-set value that collides with an already-taken one is reassigned to
//! the next free counter value, so assignment always yields a unique key
//! per element and therefore a stable total order even with
//! partially-specified priorities.
//!
//! # Invariants
//!
//! 1. After [`assign_orders`], no two elements share an order value.
//! 2. A non-zero input value is kept unless an earlier element already
//!    claimed it.
//! 3. Elements with unset orders keep their relative input sequence.
//! 4. Running [`assign_orders`] a second time changes nothing.

use ahash::AHashSet;

/// An element carrying an `order` sort key.
pub trait Ordered {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Assign unique order values in place.
///
/// `{0, 0, 5, 0, 2}` supplied in that sequence becomes `{1, 2, 5, 3, 4}`:
/// the zeros take `1, 2, 3` in encounter order, `5` is preserved, and the
/// trailing `2` collides with the second element's assignment and moves to
/// the next free counter value.
pub fn assign_orders<T: Ordered>(entries: &mut [T]) {
    assign_orders_with(entries, []);
}

/// Like [`assign_orders`], but with a set of already-taken order values
/// (e.g. the orders of existing siblings the entries will join).
pub fn assign_orders_with<T: Ordered>(entries: &mut [T], taken: impl IntoIterator<Item = u32>) {
    let mut used: AHashSet<u32> = taken.into_iter().collect();
    used.reserve(entries.len());
    let mut counter = 0u32;
    for entry in entries.iter_mut() {
        let order = entry.order();
        if order != 0 && used.insert(order) {
            continue;
        }
        loop {
            counter += 1;
            if used.insert(counter) {
                break;
            }
        }
        entry.set_order(counter);
    }
}

/// Stable sort by order value. Ties (only possible for values that bypassed
/// [`assign_orders`]) keep discovery order.
pub fn sort_by_order<T: Ordered>(entries: &mut [T]) {
    entries.sort_by_key(Ordered::order);
}
