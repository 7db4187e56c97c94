use crate::{
    entities::{checkout, item},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// The inventory store: every mutation runs inside one transaction that
/// commits on success and rolls back on any error.
///
/// Names are used exactly as given; trimming and emptiness checks belong to
/// the callers (HTTP handlers, CLI). Quantities are clamped at zero by the
/// adjust/set operations rather than rejected.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Looks up an item by exact name.
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<item::Model>, ServiceError> {
        let found = Self::find_on(&*self.db, name).await?;
        Ok(found)
    }

    /// Creates the item at `max(0, delta)` if missing, otherwise adds `delta`
    /// to its quantity, flooring the result at zero. A negative delta on a
    /// missing item therefore creates it at quantity 0.
    ///
    /// Returns the item id and the stored quantity.
    #[instrument(skip(self))]
    pub async fn create_or_adjust(
        &self,
        name: &str,
        delta: i32,
    ) -> Result<(i32, i32), ServiceError> {
        let txn = self.db.begin().await?;

        let result = match Self::find_on(&txn, name).await? {
            None => {
                let created = item::ActiveModel {
                    name: Set(name.to_string()),
                    quantity: Set(delta.max(0)),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                (created.id, created.quantity)
            }
            Some(found) => {
                let new_quantity = found.quantity.saturating_add(delta).max(0);
                let id = found.id;
                let mut active: item::ActiveModel = found.into();
                active.quantity = Set(new_quantity);
                active.update(&txn).await?;
                (id, new_quantity)
            }
        };

        txn.commit().await?;
        info!(name, delta, quantity = result.1, "adjusted item quantity");
        Ok(result)
    }

    /// Overwrites the item's quantity with `max(0, quantity)`, creating the
    /// item if it does not exist. The previous value is ignored entirely.
    ///
    /// Returns the item id and the stored quantity.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        name: &str,
        quantity: i32,
    ) -> Result<(i32, i32), ServiceError> {
        let txn = self.db.begin().await?;

        let new_quantity = quantity.max(0);
        let result = match Self::find_on(&txn, name).await? {
            None => {
                let created = item::ActiveModel {
                    name: Set(name.to_string()),
                    quantity: Set(new_quantity),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                (created.id, created.quantity)
            }
            Some(found) => {
                let id = found.id;
                let mut active: item::ActiveModel = found.into();
                active.quantity = Set(new_quantity);
                active.update(&txn).await?;
                (id, new_quantity)
            }
        };

        txn.commit().await?;
        info!(name, quantity = result.1, "set item quantity");
        Ok(result)
    }

    /// Lists all items sorted ascending by name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<item::Model>, ServiceError> {
        let items = item::Entity::find()
            .order_by_asc(item::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Deletes an item and, via cascade, its checkout records. Returns false
    /// if no such item exists; a missing item is a no-op, not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await?;

        let Some(found) = Self::find_on(&txn, name).await? else {
            return Ok(false);
        };

        item::Entity::delete_by_id(found.id).exec(&txn).await?;

        txn.commit().await?;
        info!(name, "deleted item");
        Ok(true)
    }

    /// Removes `amount` units of stock and appends one checkout record.
    ///
    /// All three preconditions are checked before anything is written, so a
    /// failing checkout leaves no partial state:
    /// * `Err(InvalidAmount)` if `amount <= 0`
    /// * `Err(NotFound)` if no item is named `name`
    /// * `Err(InsufficientStock)` if the item holds fewer than `amount` units
    ///
    /// Returns the item id and the remaining quantity.
    #[instrument(skip(self))]
    pub async fn checkout(
        &self,
        name: &str,
        amount: i32,
        recipient: Option<String>,
    ) -> Result<(i32, i32), ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidAmount(
                "checkout amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let found = Self::find_on(&txn, name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item '{}' not found", name)))?;

        if found.quantity < amount {
            return Err(ServiceError::InsufficientStock(format!(
                "item '{}' has {} in stock, requested {}",
                name, found.quantity, amount
            )));
        }

        let new_quantity = found.quantity - amount;
        let item_id = found.id;
        let mut active: item::ActiveModel = found.into();
        active.quantity = Set(new_quantity);
        active.update(&txn).await?;

        checkout::ActiveModel {
            item_id: Set(item_id),
            amount: Set(amount),
            recipient: Set(recipient),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(name, amount, remaining = new_quantity, "checked out stock");
        Ok((item_id, new_quantity))
    }

    async fn find_on<C: ConnectionTrait>(
        conn: &C,
        name: &str,
    ) -> Result<Option<item::Model>, sea_orm::DbErr> {
        item::Entity::find()
            .filter(item::Column::Name.eq(name))
            .one(conn)
            .await
    }
}
