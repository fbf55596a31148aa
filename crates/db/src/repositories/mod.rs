//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod admin_user_repo;
pub mod client_repo;
pub mod color_scheme_repo;
pub mod invitation_repo;
pub mod project_repo;
pub mod sales_list_repo;
pub mod sales_list_version_repo;
pub mod submission_repo;
pub mod unit_repo;
pub mod unit_type_repo;
pub mod upgrade_option_repo;

pub use admin_user_repo::AdminUserRepo;
pub use client_repo::ClientRepo;
pub use color_scheme_repo::ColorSchemeRepo;
pub use invitation_repo::InvitationRepo;
pub use project_repo::ProjectRepo;
pub use sales_list_repo::SalesListRepo;
pub use sales_list_version_repo::SalesListVersionRepo;
pub use submission_repo::SubmissionRepo;
pub use unit_repo::UnitRepo;
pub use unit_type_repo::UnitTypeRepo;
pub use upgrade_option_repo::UpgradeOptionRepo;
