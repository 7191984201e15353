//! SeaORM implementations of UserRepository and AdminRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::domain::{AdminRole, AdminUser, DomainError, DomainResult, User};
use crate::infrastructure::database::entities::{admin_user, app_user, user_vehicle};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn plates_for(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let rows = user_vehicle::Entity::find()
            .filter(user_vehicle::Column::UserId.eq(user_id))
            .order_by_asc(user_vehicle::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|v| v.plate_number).collect())
    }

    async fn to_domain(&self, u: app_user::Model) -> DomainResult<User> {
        let plates = self.plates_for(&u.id).await?;
        Ok(User {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            password_hash: u.password_hash,
            fcm_token: u.fcm_token,
            is_active: u.is_active,
            vehicle_plates: plates,
            created_at: u.created_at,
            updated_at: u.updated_at,
        })
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl crate::domain::UserRepository for SeaOrmUserRepository {
    async fn create(&self, user: User) -> DomainResult<User> {
        let model = app_user::ActiveModel {
            id: Set(user.id.clone()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            phone: Set(user.phone.clone()),
            password_hash: Set(user.password_hash.clone()),
            fcm_token: Set(user.fcm_token.clone()),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };
        match model.insert(&self.db).await {
            Ok(inserted) => self.to_domain(inserted).await,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::Conflict(format!("user with email {} already exists", user.email)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = app_user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match model {
            Some(m) => Ok(Some(self.to_domain(m).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = app_user::Entity::find()
            .filter(app_user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match model {
            Some(m) => Ok(Some(self.to_domain(m).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_plate(&self, plate_number: &str) -> DomainResult<Option<User>> {
        let vehicle = user_vehicle::Entity::find()
            .filter(user_vehicle::Column::PlateNumber.eq(plate_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let Some(vehicle) = vehicle else {
            return Ok(None);
        };
        self.find_by_id(&vehicle.user_id).await
    }

    async fn link_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>> {
        let owner = app_user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if owner.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        }

        let model = user_vehicle::ActiveModel {
            user_id: Set(user_id.to_string()),
            plate_number: Set(plate_number.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        match model.insert(&self.db).await {
            Ok(_) => self.plates_for(user_id).await,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::Conflict(format!("plate {} is already registered", plate_number)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn unlink_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>> {
        let result = user_vehicle::Entity::delete_many()
            .filter(user_vehicle::Column::UserId.eq(user_id))
            .filter(user_vehicle::Column::PlateNumber.eq(plate_number))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Vehicle",
                field: "plate_number",
                value: plate_number.to_string(),
            });
        }
        self.plates_for(user_id).await
    }

    async fn set_fcm_token(&self, user_id: &str, token: Option<String>) -> DomainResult<()> {
        let result = app_user::Entity::update_many()
            .col_expr(app_user::Column::FcmToken, Expr::value(token))
            .col_expr(app_user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(app_user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_fcm_token_by_value(&self, token: &str) -> DomainResult<()> {
        app_user::Entity::update_many()
            .col_expr(app_user::Column::FcmToken, Expr::value(Option::<String>::None))
            .col_expr(app_user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(app_user::Column::FcmToken.eq(token))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

pub struct SeaOrmAdminRepository {
    db: DatabaseConnection,
}

impl SeaOrmAdminRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn admin_to_domain(a: admin_user::Model) -> AdminUser {
    AdminUser {
        id: a.id,
        username: a.username,
        email: a.email,
        password_hash: a.password_hash,
        role: match a.role {
            admin_user::AdminRole::Admin => AdminRole::Admin,
            admin_user::AdminRole::Operator => AdminRole::Operator,
        },
        is_active: a.is_active,
        created_at: a.created_at,
        updated_at: a.updated_at,
        last_login_at: a.last_login_at,
    }
}

#[async_trait]
impl crate::domain::AdminRepository for SeaOrmAdminRepository {
    async fn create(&self, admin: AdminUser) -> DomainResult<AdminUser> {
        let model = admin_user::ActiveModel {
            id: Set(admin.id.clone()),
            username: Set(admin.username.clone()),
            email: Set(admin.email.clone()),
            password_hash: Set(admin.password_hash.clone()),
            role: Set(match admin.role {
                AdminRole::Admin => admin_user::AdminRole::Admin,
                AdminRole::Operator => admin_user::AdminRole::Operator,
            }),
            is_active: Set(admin.is_active),
            created_at: Set(admin.created_at),
            updated_at: Set(admin.updated_at),
            last_login_at: Set(admin.last_login_at),
        };
        match model.insert(&self.db).await {
            Ok(inserted) => Ok(admin_to_domain(inserted)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::Conflict(format!("admin {} already exists", admin.username)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AdminUser>> {
        let model = admin_user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(admin_to_domain))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<AdminUser>> {
        let model = admin_user::Entity::find()
            .filter(admin_user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(admin_to_domain))
    }

    async fn touch_last_login(&self, id: &str) -> DomainResult<()> {
        admin_user::Entity::update_many()
            .col_expr(
                admin_user::Column::LastLoginAt,
                Expr::value(Some(Utc::now())),
            )
            .col_expr(admin_user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(admin_user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        admin_user::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
