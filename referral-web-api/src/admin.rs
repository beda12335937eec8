use crate::auth::Caller;
use crate::dto::Role;
use crate::error::{ApiError, ApiResult};
use referral_db_entity::db::user::{self, Entity as User, Model as UserModel};
use rocket::fairing::AdHoc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Holds the account that receives platform fees.
///
/// The id comes from `admin_user_id` when configured. Otherwise the first
/// `role = admin` user (ordered by id) is looked up once and cached for the
/// life of the process.
pub struct AdminDirectory {
    admin_id: OnceCell<String>,
}

impl AdminDirectory {
    pub fn new(configured: Option<String>) -> AdminDirectory {
        let admin_id = match configured.filter(|id| !id.trim().is_empty()) {
            Some(id) => OnceCell::from(id),
            None => OnceCell::new(),
        };
        AdminDirectory { admin_id }
    }

    pub async fn admin_id<C: ConnectionTrait>(&self, db: &C) -> ApiResult<String> {
        self.admin_id
            .get_or_try_init(|| find_admin_id(db))
            .await
            .map(|id| id.to_owned())
    }
}

async fn find_admin_id<C: ConnectionTrait>(db: &C) -> ApiResult<String> {
    let admins = User::find()
        .filter(user::Column::Role.eq(Role::Admin.to_string()))
        .order_by_asc(user::Column::Id)
        .limit(2)
        .all(db)
        .await?;
    if admins.len() > 1 {
        // Fee routing is ambiguous with several admins; first by id wins.
        warn!(
            "More than one admin user found, routing platform fees to {}",
            admins[0].id
        );
    }
    match admins.into_iter().next() {
        Some(admin) => {
            info!("Platform fees routed to admin {}", admin.id);
            Ok(admin.id)
        }
        None => Err(ApiError::NotFound("Admin user not found".to_owned())),
    }
}

/// Loads the caller's user row and checks it holds the admin role.
pub async fn require_admin<C: ConnectionTrait>(db: &C, caller: &Caller) -> ApiResult<UserModel> {
    match User::find_by_id(caller.user_id.to_owned()).one(db).await? {
        Some(user) if user.role == Role::Admin.to_string() => Ok(user),
        _ => {
            warn!("Non-admin {} attempted an admin action", caller.user_id);
            Err(ApiError::Forbidden("Admin access required".to_owned()))
        }
    }
}

/// Resolves the fee admin while igniting so the first approval does not pay
/// for the lookup. A missing admin is not fatal; it is retried on demand.
pub fn warm_up() -> AdHoc {
    AdHoc::on_ignite("Resolve admin user", |rocket| async move {
        let conn = crate::pool::connection(&rocket);
        match (rocket.state::<AdminDirectory>(), conn) {
            (Some(directory), Some(conn)) => {
                if let Err(error) = directory.admin_id(&conn).await {
                    warn!("Admin user not resolved at startup: {}", error);
                }
            }
            _ => warn!("Admin directory or database missing at ignite"),
        }
        rocket
    })
}
