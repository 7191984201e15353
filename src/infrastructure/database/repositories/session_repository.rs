//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::domain::{
    DomainError, DomainResult, NewSession, ParkingSession, PaymentStatus, SessionCounters,
    SessionFilter, SessionStatus,
};
use crate::infrastructure::database::entities::parking_session;

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(s: parking_session::Model) -> ParkingSession {
    ParkingSession {
        id: s.id,
        plate_number: s.plate_number,
        lot_id: s.lot_id,
        slot_number: s.slot_number,
        user_id: s.user_id,
        entry_time: s.entry_time,
        exit_time: s.exit_time,
        duration_minutes: s.duration_minutes,
        fare: s.fare,
        payment_status: PaymentStatus::from_str(&s.payment_status)
            .unwrap_or(PaymentStatus::Pending),
        status: SessionStatus::from_str(&s.status).unwrap_or(SessionStatus::Out),
        created_at: s.created_at,
        updated_at: s.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl crate::domain::SessionRepository for SeaOrmSessionRepository {
    async fn open(&self, session: NewSession) -> DomainResult<ParkingSession> {
        let now = Utc::now();
        let model = parking_session::ActiveModel {
            id: Set(session.id),
            plate_number: Set(session.plate_number.clone()),
            lot_id: Set(session.lot_id),
            slot_number: Set(session.slot_number),
            user_id: Set(session.user_id),
            entry_time: Set(session.entry_time),
            exit_time: Set(None),
            duration_minutes: Set(None),
            fare: Set(0),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            status: Set(SessionStatus::In.as_str().to_string()),
            active: Set(Some(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // the unique index on (plate_number, active) converts a lost race
        // into a Conflict instead of a duplicate open session
        match model.insert(&self.db).await {
            Ok(inserted) => Ok(model_to_domain(inserted)),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(DomainError::Conflict(format!(
                        "active session exists for plate {}",
                        session.plate_number
                    )))
                } else {
                    Err(db_err(e))
                }
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>> {
        let model = parking_session::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active(&self, plate_number: &str) -> DomainResult<Option<ParkingSession>> {
        let model = parking_session::Entity::find()
            .filter(parking_session::Column::PlateNumber.eq(plate_number))
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_in_lot(
        &self,
        plate_number: &str,
        lot_id: &str,
    ) -> DomainResult<Option<ParkingSession>> {
        let model = parking_session::Entity::find()
            .filter(parking_session::Column::PlateNumber.eq(plate_number))
            .filter(parking_session::Column::LotId.eq(lot_id))
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_by_slot(
        &self,
        lot_id: &str,
        slot_number: i32,
    ) -> DomainResult<Option<ParkingSession>> {
        let model = parking_session::Entity::find()
            .filter(parking_session::Column::LotId.eq(lot_id))
            .filter(parking_session::Column::SlotNumber.eq(slot_number))
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn close(
        &self,
        session_id: &str,
        exit_time: DateTime<Utc>,
        duration_minutes: i64,
        fare: i64,
        payment_status: PaymentStatus,
    ) -> DomainResult<ParkingSession> {
        // conditional on the session still being IN; a concurrent close
        // leaves rows_affected at 0 for the loser
        let result = parking_session::Entity::update_many()
            .col_expr(
                parking_session::Column::Status,
                Expr::value(SessionStatus::Out.as_str()),
            )
            .col_expr(parking_session::Column::ExitTime, Expr::value(Some(exit_time)))
            .col_expr(
                parking_session::Column::DurationMinutes,
                Expr::value(Some(duration_minutes)),
            )
            .col_expr(parking_session::Column::Fare, Expr::value(fare))
            .col_expr(
                parking_session::Column::PaymentStatus,
                Expr::value(payment_status.as_str()),
            )
            .col_expr(
                parking_session::Column::Active,
                Expr::value(Option::<bool>::None),
            )
            .col_expr(parking_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(parking_session::Column::Id.eq(session_id))
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NoActiveSession(session_id.to_string()));
        }

        let model = parking_session::Entity::find_by_id(session_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::NotFound {
                entity: "ParkingSession",
                field: "id",
                value: session_id.to_string(),
            })?;
        Ok(model_to_domain(model))
    }

    async fn set_payment_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> DomainResult<()> {
        let result = parking_session::Entity::update_many()
            .col_expr(
                parking_session::Column::PaymentStatus,
                Expr::value(status.as_str()),
            )
            .col_expr(parking_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(parking_session::Column::Id.eq(session_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "ParkingSession",
                field: "id",
                value: session_id.to_string(),
            });
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: SessionFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)> {
        let mut query = parking_session::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(parking_session::Column::Status.eq(status.as_str()));
        }
        if let Some(plate) = &filter.plate_number {
            query = query.filter(parking_session::Column::PlateNumber.eq(plate.as_str()));
        }
        if let Some(lot_id) = &filter.lot_id {
            query = query.filter(parking_session::Column::LotId.eq(lot_id.as_str()));
        }

        let paginator = query
            .order_by_desc(parking_session::Column::EntryTime)
            .paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(db_err)?;
        Ok((models.into_iter().map(model_to_domain).collect(), total))
    }

    async fn find_active_for_plates(
        &self,
        plates: &[String],
    ) -> DomainResult<Vec<ParkingSession>> {
        if plates.is_empty() {
            return Ok(Vec::new());
        }
        let models = parking_session::Entity::find()
            .filter(parking_session::Column::PlateNumber.is_in(plates.to_vec()))
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_for_plates(
        &self,
        plates: &[String],
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)> {
        if plates.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let paginator = parking_session::Entity::find()
            .filter(parking_session::Column::PlateNumber.is_in(plates.to_vec()))
            .order_by_desc(parking_session::Column::EntryTime)
            .paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(db_err)?;
        Ok((models.into_iter().map(model_to_domain).collect(), total))
    }

    async fn counters(&self, since: DateTime<Utc>) -> DomainResult<SessionCounters> {
        let active = parking_session::Entity::find()
            .filter(parking_session::Column::Status.eq(SessionStatus::In.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let entries_since = parking_session::Entity::find()
            .filter(parking_session::Column::EntryTime.gte(since))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let exited = parking_session::Entity::find()
            .filter(parking_session::Column::ExitTime.gte(since))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let exits_since = exited.len() as u64;
        let revenue_since = exited.iter().map(|s| s.fare).sum();
        Ok(SessionCounters {
            active,
            entries_since,
            exits_since,
            revenue_since,
        })
    }
}
