//! Entity catalog: dependency-respecting delete and write orders
//!
//! The catalog is pure metadata. It computes a total order over the entity
//! kinds from their declared foreign-key edges, so that:
//!
//! - `write_order()` lists every kind only after all kinds it depends on
//! - `delete_order()` is the exact reverse: every kind before the kinds it
//!   depends on, i.e. referencing rows are deleted before referenced rows
//!
//! The order is computed with Kahn's algorithm rather than hand-written, so
//! adding a kind with new edges cannot silently break the ordering.

use crate::error::{Error, Result};
use crate::kind::EntityKind;

/// Dependency order for deleting and writing a revision's entity kinds.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    write_order: Vec<EntityKind>,
}

impl EntityCatalog {
    /// Catalog over all declared entity kinds and their edges.
    ///
    /// The declared edge set is acyclic by construction; a cycle here is a
    /// design-time defect caught by this crate's tests, so this constructor
    /// does not expose the error.
    pub fn standard() -> Self {
        Self::from_edges(&EntityKind::ALL, |kind| kind.dependencies())
            .unwrap_or_else(|e| unreachable!("declared entity edges are acyclic: {e}"))
    }

    /// Build a catalog from an explicit kind list and edge function.
    ///
    /// `dependencies(kind)` must return the kinds `kind` references by
    /// foreign key. Returns [`Error::DependencyCycle`] if the edges cannot
    /// be linearized.
    pub fn from_edges(
        kinds: &[EntityKind],
        dependencies: impl Fn(EntityKind) -> &'static [EntityKind],
    ) -> Result<Self> {
        // Kahn's algorithm, scanning kinds in declaration order each round
        // so the result is deterministic.
        let mut remaining: Vec<EntityKind> = kinds.to_vec();
        let mut write_order = Vec::with_capacity(kinds.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|&kind| {
                dependencies(kind)
                    .iter()
                    .all(|dep| !remaining.contains(dep))
            });
            match ready {
                Some(i) => write_order.push(remaining.remove(i)),
                None => return Err(Error::DependencyCycle { remaining }),
            }
        }

        Ok(Self { write_order })
    }

    /// Kinds in write order: every kind appears after all its dependencies.
    pub fn write_order(&self) -> &[EntityKind] {
        &self.write_order
    }

    /// Kinds in delete order: every kind appears before all its
    /// dependencies, so referencing rows go first.
    pub fn delete_order(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.write_order.iter().rev().copied()
    }
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[EntityKind], kind: EntityKind) -> usize {
        order.iter().position(|&k| k == kind).expect("kind in order")
    }

    #[test]
    fn test_write_order_respects_every_declared_edge() {
        let catalog = EntityCatalog::standard();
        let order = catalog.write_order();
        assert_eq!(order.len(), EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            for dep in kind.dependencies() {
                assert!(
                    position(order, *dep) < position(order, kind),
                    "{dep} must be written before {kind}"
                );
            }
        }
    }

    #[test]
    fn test_delete_order_is_reverse_of_write_order() {
        let catalog = EntityCatalog::standard();
        let mut reversed: Vec<EntityKind> = catalog.delete_order().collect();
        reversed.reverse();
        assert_eq!(reversed, catalog.write_order());
    }

    #[test]
    fn test_delete_order_removes_referencing_rows_first() {
        let catalog = EntityCatalog::standard();
        let order: Vec<EntityKind> = catalog.delete_order().collect();
        for kind in EntityKind::ALL {
            for dep in kind.dependencies() {
                assert!(
                    position(&order, kind) < position(&order, *dep),
                    "{kind} must be deleted before {dep}"
                );
            }
        }
    }

    #[test]
    fn test_order_is_deterministic() {
        let a = EntityCatalog::standard();
        let b = EntityCatalog::standard();
        assert_eq!(a.write_order(), b.write_order());
    }

    #[test]
    fn test_cycle_is_reported() {
        // Trip <-> Block form a cycle under this synthetic edge function.
        let result = EntityCatalog::from_edges(
            &[EntityKind::Trip, EntityKind::Block],
            |kind| match kind {
                EntityKind::Trip => &[EntityKind::Block],
                EntityKind::Block => &[EntityKind::Trip],
                _ => &[],
            },
        );
        match result {
            Err(Error::DependencyCycle { remaining }) => {
                assert_eq!(remaining.len(), 2);
            }
            other => panic!("expected DependencyCycle, got {other:?}"),
        }
    }
}
