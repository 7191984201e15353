//! SeaORM implementation of LotRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::domain::{DomainError, DomainResult, ParkingLot, Pricing};
use crate::infrastructure::database::entities::parking_lot;

pub struct SeaOrmLotRepository {
    db: DatabaseConnection,
}

impl SeaOrmLotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(l: parking_lot::Model) -> ParkingLot {
    ParkingLot {
        id: l.id,
        name: l.name,
        code: l.code,
        total_slots: l.total_slots,
        pricing: Pricing {
            rate_per_hour: l.rate_per_hour,
            free_minutes: l.free_minutes,
        },
        address: l.address,
        latitude: l.latitude,
        longitude: l.longitude,
        is_active: l.is_active,
        created_at: l.created_at,
        updated_at: l.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl crate::domain::LotRepository for SeaOrmLotRepository {
    async fn create(&self, lot: ParkingLot) -> DomainResult<ParkingLot> {
        let model = parking_lot::ActiveModel {
            id: Set(lot.id.clone()),
            name: Set(lot.name.clone()),
            code: Set(lot.code.clone()),
            total_slots: Set(lot.total_slots),
            rate_per_hour: Set(lot.pricing.rate_per_hour),
            free_minutes: Set(lot.pricing.free_minutes),
            address: Set(lot.address.clone()),
            latitude: Set(lot.latitude),
            longitude: Set(lot.longitude),
            is_active: Set(lot.is_active),
            created_at: Set(lot.created_at),
            updated_at: Set(lot.updated_at),
        };
        match model.insert(&self.db).await {
            Ok(inserted) => Ok(model_to_domain(inserted)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::Conflict(format!("lot code {} already exists", lot.code)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingLot>> {
        let model = parking_lot::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, only_active: bool) -> DomainResult<Vec<ParkingLot>> {
        let mut query = parking_lot::Entity::find();
        if only_active {
            query = query.filter(parking_lot::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(parking_lot::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn set_active(&self, id: &str, active: bool) -> DomainResult<ParkingLot> {
        let existing = parking_lot::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "ParkingLot",
                field: "id",
                value: id.to_string(),
            });
        };

        let mut model: parking_lot::ActiveModel = existing.into();
        model.is_active = Set(active);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(updated))
    }

    async fn count(&self) -> DomainResult<u64> {
        parking_lot::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
