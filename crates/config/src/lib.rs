pub mod client_secrets;
pub mod settings;

pub use client_secrets::{ClientSecrets, ClientSecretsError};
pub use settings::*;
