pub mod asset;
pub mod asset_assignment;
pub mod asset_transfer;
pub mod audit_log;
pub mod category;
pub mod department;
pub mod location;
pub mod notification;
pub mod refresh_token;
pub mod user;
pub mod user_role;
pub mod vendor;
