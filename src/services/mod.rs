/*!
 * Business logic services. Handlers stay thin; everything that touches the
 * database or enforces a workflow rule lives here.
 */

pub mod assets;
pub mod assignments;
pub mod audit;
pub mod categories;
pub mod notifications;
pub mod transfers;
pub mod users;

pub use assets::AssetService;
pub use assignments::AssignmentService;
pub use audit::AuditService;
pub use categories::CategoryService;
pub use notifications::NotificationService;
pub use transfers::TransferService;
pub use users::UserService;
