use crate::error::{Error, Result};
use crate::store::RepoStore;
use crate::types::Visibility;

/// Operations on a repository that the request pipeline gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoAction {
    ViewMetadata,
    ReadSecret,
    Push,
    Pull,
    ManageContributors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    PublicOrContributor,
    Contributor,
    Owner,
}

impl RepoAction {
    const fn requirement(self) -> Requirement {
        match self {
            RepoAction::ViewMetadata => Requirement::PublicOrContributor,
            RepoAction::ReadSecret | RepoAction::Push | RepoAction::Pull => {
                Requirement::Contributor
            }
            RepoAction::ManageContributors => Requirement::Owner,
        }
    }
}

/// Answers ownership, membership and visibility questions for repositories.
///
/// The requester is always passed in explicitly.
pub struct AccessPolicy<'a, R: RepoStore + ?Sized> {
    repos: &'a R,
}

impl<'a, R: RepoStore + ?Sized> AccessPolicy<'a, R> {
    pub fn new(repos: &'a R) -> Self {
        Self { repos }
    }

    pub fn visibility(&self, owner: &str, repo: &str) -> Result<Visibility> {
        self.repos
            .get_visibility(owner, repo)?
            .ok_or(Error::RepositoryNotFound)
    }

    /// The owner is a contributor without a membership lookup.
    pub fn is_contributor(&self, owner: &str, repo: &str, candidate: &str) -> Result<bool> {
        if owner == candidate {
            return Ok(true);
        }
        self.repos.is_contributor(owner, repo, candidate)
    }

    #[must_use]
    pub fn is_owner(&self, owner: &str, candidate: &str) -> bool {
        owner == candidate
    }

    /// Checks `requester` against the rule for `action` and returns the
    /// repository's visibility.
    ///
    /// A requester who may not view a private repository gets
    /// `RepositoryNotFound` for every action, so its existence does not leak.
    pub fn authorize(
        &self,
        action: RepoAction,
        owner: &str,
        repo: &str,
        requester: &str,
    ) -> Result<Visibility> {
        let visibility = self.visibility(owner, repo)?;
        let contributor = self.is_contributor(owner, repo, requester)?;
        let hidden = visibility == Visibility::Private && !contributor;

        let allowed = match action.requirement() {
            Requirement::PublicOrContributor => visibility == Visibility::Public || contributor,
            Requirement::Contributor => contributor,
            Requirement::Owner => self.is_owner(owner, requester),
        };

        if allowed {
            return Ok(visibility);
        }

        tracing::debug!(
            "Denied {:?} on {}/{} for {}",
            action,
            owner,
            repo,
            requester
        );

        if hidden {
            return Err(Error::RepositoryNotFound);
        }
        match action.requirement() {
            Requirement::Owner => Err(Error::NotOwner),
            _ => Err(Error::NotContributor),
        }
    }
}
