//! Fixtures shared by the pipeline stage tests.

use crate::domain::{OrderNumber, UserId};
use crate::storage::{ConcurrentOrderStore, OrderStore};

/// `count` distinct order numbers that pass the Luhn check
pub(crate) fn luhn_numbers(count: usize) -> Vec<OrderNumber> {
    (1..=count as u64)
        .map(|n| {
            let body = 1_000_000 + n;
            (0..10)
                .find_map(|digit| OrderNumber::parse(&format!("{body}{digit}")).ok())
                .unwrap()
        })
        .collect()
}

/// In-memory store holding `count` NEW orders owned by one user
pub(crate) async fn seeded_store(count: usize) -> ConcurrentOrderStore {
    let store = ConcurrentOrderStore::new();
    let user = UserId::new();
    for number in luhn_numbers(count) {
        store.register_order(user, number).await.unwrap();
    }
    store
}
