/*!
 * HTTP handlers. Each submodule owns the routes for one resource; the
 * shared service container is threaded through axum state.
 */

use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    AssetService, AssignmentService, AuditService, CategoryService, NotificationService,
    TransferService, UserService,
};

pub mod assets;
pub mod assignments;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod notifications;
pub mod transfers;
pub mod users;

/// Container holding all application services
#[derive(Clone)]
pub struct AppServices {
    pub assets: Arc<AssetService>,
    pub assignments: Arc<AssignmentService>,
    pub transfers: Arc<TransferService>,
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub audit: Arc<AuditService>,
    pub notifications: Arc<NotificationService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            assets: Arc::new(AssetService::new(db_pool.clone(), event_sender.clone())),
            assignments: Arc::new(AssignmentService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            transfers: Arc::new(TransferService::new(db_pool.clone(), event_sender)),
            users: Arc::new(UserService::new(db_pool.clone())),
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            audit: Arc::new(AuditService::new(db_pool.clone())),
            notifications: Arc::new(NotificationService::new(db_pool)),
            auth,
        }
    }
}
