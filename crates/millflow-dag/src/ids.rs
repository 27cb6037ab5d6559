//! Identity generation.
//!
//! The core never mints ids on its own; the editor is handed an
//! [`IdGenerator`] and draws every node, sheet, blocker and note id from it.

use uuid::Uuid;

pub trait IdGenerator {
    fn next_uuid(&mut self) -> Uuid;

    fn next_id<T: From<Uuid>>(&mut self) -> T
    where
        Self: Sized,
    {
        T::from(self.next_uuid())
    }
}

/// Time-ordered UUIDv7 ids, so id order follows creation order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_uuid(&mut self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic counter ids for tests and seeded simulation.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u128) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_uuid(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_uuid(&mut self) -> Uuid {
        (**self).next_uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new();
        let a: NodeId = ids.next_id();
        let b: NodeId = ids.next_id();
        assert_eq!(a, NodeId::from_u128(1));
        assert_eq!(b, NodeId::from_u128(2));
        assert!(a < b);
    }

    #[test]
    fn random_ids_are_time_ordered() {
        let mut ids = RandomIds;
        let a: NodeId = ids.next_id();
        let b: NodeId = ids.next_id();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
