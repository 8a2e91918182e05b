use serde::Serialize;
use tracing::debug;

use crate::cloud_storage::{DriveError, DriveResult, ROOT_FOLDER_ID, StorageProvider};

/// Upper bound on parent hops before the walk is abandoned.
pub const MAX_BREADCRUMB_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub id: String,
    pub name: String,
}

/// Path from the first folder below the root down to `folder_id`, root
/// excluded.
///
/// Walks child→parent one metadata fetch at a time, following the first
/// parent. A folder with no parents ends the walk but is still part of the
/// path (shared folders look like this), unless it is the account root
/// addressed by its real id.
pub async fn resolve<P>(provider: &P, folder_id: &str) -> DriveResult<Vec<Breadcrumb>>
where
    P: StorageProvider + ?Sized,
{
    let mut path = Vec::new();
    let mut current = Some(folder_id.to_string());

    while let Some(id) = current.take() {
        if id.is_empty() || id == ROOT_FOLDER_ID {
            break;
        }
        if path.len() >= MAX_BREADCRUMB_DEPTH {
            return Err(DriveError::BreadcrumbDepthExceeded(MAX_BREADCRUMB_DEPTH));
        }

        let folder = provider
            .get_metadata(&id, &["id", "name", "parents"])
            .await?;

        current = folder.parent_id().map(str::to_string);
        if current.is_none() && is_account_root(provider, &id).await? {
            break;
        }

        path.push(Breadcrumb {
            id,
            name: folder.name,
        });
    }

    path.reverse();
    debug!(folder_id = %folder_id, depth = path.len(), "Resolved breadcrumbs");
    Ok(path)
}

async fn is_account_root<P>(provider: &P, id: &str) -> DriveResult<bool>
where
    P: StorageProvider + ?Sized,
{
    let root = provider.get_metadata(ROOT_FOLDER_ID, &["id"]).await?;
    Ok(root.id == id)
}
