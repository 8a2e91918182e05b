pub mod breadcrumbs;
pub mod cloud_storage;
pub mod credentials;
pub mod datetime;
pub mod oauth;

pub use breadcrumbs::Breadcrumb;
pub use cloud_storage::{
    DriveError, FileEntry, StorageProvider,
    google_drive::{DriveClient, GoogleDriveService},
};
pub use credentials::CredentialBundle;
pub use oauth::OAuthService;
