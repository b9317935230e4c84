use super::policy::{AccessPolicy, RepoAction};
use crate::error::{Error, Result};
use crate::store::{AccountStore, RepoStore};

/// Adds `target` to the contributors of `owner/repo`. Only the owner may do this.
pub fn grant_contributor<S>(
    store: &S,
    owner: &str,
    repo: &str,
    requester: &str,
    target: &str,
) -> Result<()>
where
    S: AccountStore + RepoStore + ?Sized,
{
    AccessPolicy::new(store).authorize(RepoAction::ManageContributors, owner, repo, requester)?;

    if target == owner {
        return Err(Error::AlreadyContributor);
    }
    if store.get_user(target)?.is_none() {
        return Err(Error::UserNotFound);
    }

    store.add_contributor(owner, repo, target)?;
    tracing::info!("Granted {} contributor access to {}/{}", target, owner, repo);
    Ok(())
}

/// Removes `target` from the contributors of `owner/repo`. Only the owner may do this.
pub fn revoke_contributor<S>(
    store: &S,
    owner: &str,
    repo: &str,
    requester: &str,
    target: &str,
) -> Result<()>
where
    S: AccountStore + RepoStore + ?Sized,
{
    AccessPolicy::new(store).authorize(RepoAction::ManageContributors, owner, repo, requester)?;

    if !store.remove_contributor(owner, repo, target)? {
        return Err(Error::NoSuchMembership);
    }

    tracing::info!("Revoked {} contributor access to {}/{}", target, owner, repo);
    Ok(())
}
