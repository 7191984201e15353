//! SeaORM implementation of SlotRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, warn};

use crate::domain::{DomainError, DomainResult, Slot, SlotCounts, SlotStatus, VehicleType};
use crate::infrastructure::database::entities::parking_slot;

pub struct SeaOrmSlotRepository {
    db: DatabaseConnection,
}

impl SeaOrmSlotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(s: parking_slot::Model) -> Slot {
    Slot {
        id: s.id,
        lot_id: s.lot_id,
        slot_number: s.slot_number,
        status: SlotStatus::from_str(&s.status).unwrap_or(SlotStatus::Maintenance),
        vehicle_type: VehicleType::from_str(&s.vehicle_type).unwrap_or(VehicleType::Car),
        current_session_id: s.current_session_id,
        created_at: s.created_at,
        updated_at: s.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl crate::domain::SlotRepository for SeaOrmSlotRepository {
    async fn reserve_first_available(
        &self,
        lot_id: &str,
        vehicle_type: VehicleType,
        session_id: &str,
    ) -> DomainResult<Option<Slot>> {
        // Pick the lowest-numbered candidate, then flip it with an UPDATE
        // conditioned on it still being Available. rows_affected = 0 means
        // a concurrent caller won that slot; move on to the next candidate.
        loop {
            let candidate = parking_slot::Entity::find()
                .filter(parking_slot::Column::LotId.eq(lot_id))
                .filter(parking_slot::Column::VehicleType.eq(vehicle_type.as_str()))
                .filter(parking_slot::Column::Status.eq(SlotStatus::Available.as_str()))
                .order_by_asc(parking_slot::Column::SlotNumber)
                .one(&self.db)
                .await
                .map_err(db_err)?;

            let Some(candidate) = candidate else {
                return Ok(None);
            };

            let result = parking_slot::Entity::update_many()
                .col_expr(
                    parking_slot::Column::Status,
                    Expr::value(SlotStatus::Occupied.as_str()),
                )
                .col_expr(
                    parking_slot::Column::CurrentSessionId,
                    Expr::value(Some(session_id.to_string())),
                )
                .col_expr(parking_slot::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(parking_slot::Column::Id.eq(candidate.id))
                .filter(parking_slot::Column::Status.eq(SlotStatus::Available.as_str()))
                .exec(&self.db)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 1 {
                let mut slot = model_to_domain(candidate);
                slot.status = SlotStatus::Occupied;
                slot.current_session_id = Some(session_id.to_string());
                return Ok(Some(slot));
            }
            debug!(
                lot_id,
                slot = candidate.slot_number,
                "slot taken concurrently, retrying with next candidate"
            );
        }
    }

    async fn release(&self, lot_id: &str, slot_number: i32) -> DomainResult<()> {
        let result = parking_slot::Entity::update_many()
            .col_expr(
                parking_slot::Column::Status,
                Expr::value(SlotStatus::Available.as_str()),
            )
            .col_expr(
                parking_slot::Column::CurrentSessionId,
                Expr::value(Option::<String>::None),
            )
            .col_expr(parking_slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(parking_slot::Column::LotId.eq(lot_id))
            .filter(parking_slot::Column::SlotNumber.eq(slot_number))
            .filter(parking_slot::Column::Status.eq(SlotStatus::Occupied.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        // releasing an already-free or deleted slot is tolerated
        if result.rows_affected == 0 {
            warn!(lot_id, slot_number, "release had no occupied slot to free");
        }
        Ok(())
    }

    async fn bulk_create(
        &self,
        lot_id: &str,
        count: i32,
        vehicle_type: VehicleType,
    ) -> DomainResult<Vec<Slot>> {
        let start = parking_slot::Entity::find()
            .filter(parking_slot::Column::LotId.eq(lot_id))
            .order_by_desc(parking_slot::Column::SlotNumber)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|s| s.slot_number)
            .unwrap_or(0);

        let now = Utc::now();
        let mut created = Vec::with_capacity(count as usize);
        for i in 1..=count {
            let model = parking_slot::ActiveModel {
                lot_id: Set(lot_id.to_string()),
                slot_number: Set(start + i),
                status: Set(SlotStatus::Available.as_str().to_string()),
                vehicle_type: Set(vehicle_type.as_str().to_string()),
                current_session_id: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let inserted = model.insert(&self.db).await.map_err(db_err)?;
            created.push(model_to_domain(inserted));
        }
        Ok(created)
    }

    async fn list_for_lot(&self, lot_id: &str) -> DomainResult<Vec<Slot>> {
        let models = parking_slot::Entity::find()
            .filter(parking_slot::Column::LotId.eq(lot_id))
            .order_by_asc(parking_slot::Column::SlotNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn count_available_for_lot(
        &self,
        lot_id: &str,
        vehicle_type: Option<VehicleType>,
    ) -> DomainResult<u64> {
        let mut query = parking_slot::Entity::find()
            .filter(parking_slot::Column::LotId.eq(lot_id))
            .filter(parking_slot::Column::Status.eq(SlotStatus::Available.as_str()));
        if let Some(vt) = vehicle_type {
            query = query.filter(parking_slot::Column::VehicleType.eq(vt.as_str()));
        }
        query.count(&self.db).await.map_err(db_err)
    }

    async fn count_for_lot(&self, lot_id: &str) -> DomainResult<u64> {
        parking_slot::Entity::find()
            .filter(parking_slot::Column::LotId.eq(lot_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn counts(&self) -> DomainResult<SlotCounts> {
        let total = parking_slot::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let occupied = parking_slot::Entity::find()
            .filter(parking_slot::Column::Status.eq(SlotStatus::Occupied.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(SlotCounts { total, occupied })
    }
}
