//! Repository authorization: ownership, contributor membership and visibility.

mod contributors;
mod policy;

pub use contributors::{grant_contributor, revoke_contributor};
pub use policy::{AccessPolicy, RepoAction};

use crate::error::{Error, Result};
use crate::store::{AccountStore, RepoStore};
use crate::types::{Repo, Visibility};

/// Repositories owned by or contributed to by `target`, as seen by `requester`.
///
/// A user sees all of their own. Anyone else sees the public ones and the
/// ones they contribute to themselves.
pub fn visible_repositories<S>(store: &S, target: &str, requester: &str) -> Result<Vec<Repo>>
where
    S: AccountStore + RepoStore + ?Sized,
{
    if store.get_user(target)?.is_none() {
        return Err(Error::UserNotFound);
    }

    let mut repos = store.list_owned_repos(target)?;
    repos.extend(store.list_contributed_repos(target)?);

    if target != requester {
        let policy = AccessPolicy::new(store);
        let mut visible = Vec::with_capacity(repos.len());
        for repo in repos {
            if repo.visibility == Visibility::Public
                || policy.is_contributor(&repo.owner, &repo.name, requester)?
            {
                visible.push(repo);
            }
        }
        repos = visible;
    }

    repos.sort_by(|a, b| (&a.owner, &a.name).cmp(&(&b.owner, &b.name)));
    repos.dedup_by(|a, b| a.owner == b.owner && a.name == b.name);
    Ok(repos)
}
