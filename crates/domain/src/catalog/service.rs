//! Catalog lookups.

use record_store::RecordStore;

use crate::entity::EntityStore;
use crate::error::DomainError;

use super::{Item, ItemId, NewItem};

/// Read side of the item catalog, plus registration for seeding.
#[derive(Clone)]
pub struct Catalog<S: RecordStore> {
    entities: EntityStore<S>,
}

impl<S: RecordStore> Catalog<S> {
    /// Creates a new catalog over the given store.
    pub fn new(store: S) -> Self {
        Self {
            entities: EntityStore::new(store),
        }
    }

    /// Looks up an item by ID.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, item_id: ItemId) -> Result<Option<Item>, DomainError> {
        self.entities.get(item_id).await
    }

    /// Returns every item with exactly this name (case-sensitive).
    #[tracing::instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Item>, DomainError> {
        self.entities.find_where("name", name).await
    }

    /// Returns all items in registration order.
    #[tracing::instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, DomainError> {
        self.entities.list().await
    }

    /// Registers a new item.
    #[tracing::instrument(skip(self), fields(name = %new_item.name))]
    pub async fn register(&self, new_item: NewItem) -> Result<Item, DomainError> {
        let mut item = new_item.into_item()?;
        self.entities.save(&mut item).await?;

        tracing::info!(item_id = %item.id(), "Item registered");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use record_store::InMemoryRecordStore;

    async fn seeded() -> (Catalog<InMemoryRecordStore>, Item, Item) {
        let catalog = Catalog::new(InMemoryRecordStore::new());
        let round = catalog
            .register(NewItem::new(
                "Round Widget",
                Money::from_cents(299),
                "A widget that is round",
            ))
            .await
            .unwrap();
        let square = catalog
            .register(NewItem::new(
                "Square Widget",
                Money::from_cents(199),
                "A widget that is square",
            ))
            .await
            .unwrap();
        (catalog, round, square)
    }

    #[tokio::test]
    async fn find_by_id() {
        let (catalog, round, _) = seeded().await;

        let found = catalog.find_by_id(round.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "Round Widget");

        assert!(catalog.find_by_id(ItemId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_name_is_exact() {
        let (catalog, _, square) = seeded().await;

        let found = catalog.find_by_name("Square Widget").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), square.id());

        assert!(catalog.find_by_name("square widget").await.unwrap().is_empty());
        assert!(catalog.find_by_name("Square").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_name_returns_every_match() {
        let (catalog, _, _) = seeded().await;
        catalog
            .register(NewItem::new("Round Widget", Money::from_cents(349), "Larger"))
            .await
            .unwrap();

        assert_eq!(catalog.find_by_name("Round Widget").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_items_in_registration_order() {
        let (catalog, round, square) = seeded().await;

        let ids: Vec<_> = catalog
            .list_items()
            .await
            .unwrap()
            .iter()
            .map(Item::id)
            .collect();
        assert_eq!(ids, [round.id(), square.id()]);
    }

    #[tokio::test]
    async fn register_rejects_invalid_item() {
        let catalog = Catalog::new(InMemoryRecordStore::new());
        let result = catalog
            .register(NewItem::new("", Money::from_cents(100), ""))
            .await;

        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
        assert!(catalog.list_items().await.unwrap().is_empty());
    }
}
