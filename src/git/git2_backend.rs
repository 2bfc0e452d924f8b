use git2::{
    BranchType, Cred, ErrorCode, IndexAddOption, Oid, PushOptions, RemoteCallbacks, Repository,
    Signature, build::CheckoutBuilder,
};
use std::cell::Cell;
use std::path::Path;

use crate::settings::{CommitAuthor, Secret};

/// Name of the remote that publishing always pushes through.
pub const ORIGIN: &str = "origin";

/// Open the repository at `path`, initializing a new one if none exists.
pub fn open_or_init(path: &Path) -> Result<Repository, git2::Error> {
    if path.join(".git").exists() {
        Repository::open(path)
    } else {
        tracing::debug!(path = %path.display(), "initializing repository");
        Repository::init(path)
    }
}

/// Stage every addition, modification and removal in the worktree (`git add -A`).
pub fn stage_all(repo: &Repository) -> Result<(), git2::Error> {
    let mut index = repo.index()?;
    index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"], None)?;
    index.write()
}

fn signature(repo: &Repository, author: &CommitAuthor) -> Result<Signature<'static>, git2::Error> {
    match repo.signature() {
        Ok(sig) => Ok(sig.to_owned()),
        Err(_) => Signature::now(&author.author_name, &author.author_email),
    }
}

/// Commit the current index on HEAD, parented on HEAD's commit if any.
///
/// Always creates a commit, including when nothing changed since HEAD.
pub fn commit(repo: &Repository, message: &str, author: &CommitAuthor) -> Result<Oid, git2::Error> {
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
        Err(e) => return Err(e),
    };

    let tree = repo.find_tree(tree_id)?;
    let sig = signature(repo, author)?;
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
    tracing::info!(commit = %oid, msg = message, "created commit");
    Ok(oid)
}

/// Make `origin` point at `url`, creating the remote if it is missing.
///
/// A configured `remote.origin.pushurl` is removed so pushes go to `url` as
/// well. `pushurl()` alone is not trusted for this: a `pushInsteadOf` rule
/// fills it in without any key to delete.
pub fn ensure_remote(repo: &Repository, url: &str) -> Result<(), git2::Error> {
    match repo.find_remote(ORIGIN) {
        Ok(remote) => {
            if remote.url() != Some(url) {
                tracing::debug!("updating origin url");
                repo.remote_set_url(ORIGIN, url)?;
            }
            if has_config_key(repo, "remote.origin.pushurl")?
                && let Err(e) = repo.remote_set_pushurl(ORIGIN, None)
                && e.code() != ErrorCode::NotFound
            {
                return Err(e);
            }
        }
        Err(e) if e.code() == ErrorCode::NotFound => {
            tracing::debug!("creating origin remote");
            repo.remote(ORIGIN, url)?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn has_config_key(repo: &Repository, key: &str) -> Result<bool, git2::Error> {
    match repo.config()?.get_entry(key) {
        Ok(_) => Ok(true),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Create `branch` from HEAD if absent, then switch HEAD and the worktree to it.
pub fn checkout_branch(repo: &Repository, branch: &str) -> Result<(), git2::Error> {
    let reference = match repo.find_branch(branch, BranchType::Local) {
        Ok(b) => b.into_reference(),
        Err(e) if e.code() == ErrorCode::NotFound => {
            let head = repo.head()?.peel_to_commit()?;
            repo.branch(branch, &head, false)?.into_reference()
        }
        Err(e) => return Err(e),
    };
    let name = reference
        .name()
        .ok_or_else(|| git2::Error::from_str("invalid reference name"))?;
    repo.set_head(name)?;
    repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
    Ok(())
}

/// Push `branch` to `origin` with an explicit `refs/heads/b:refs/heads/b` refspec.
///
/// The token is offered once through the credential callback; a second prompt
/// means it was refused. A ref the server rejects is reported as an error.
pub fn push_branch(repo: &Repository, branch: &str, token: &Secret) -> Result<(), git2::Error> {
    let mut remote = repo.find_remote(ORIGIN)?;
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);

    let attempts = Cell::new(0u8);
    let rejection: Cell<Option<String>> = Cell::new(None);
    {
        let mut cb = RemoteCallbacks::new();
        cb.credentials(|_url, _username, _allowed| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > 1 {
                return Err(git2::Error::from_str("authentication rejected"));
            }
            Cred::userpass_plaintext("x-access-token", token.expose())
        });
        cb.push_update_reference(|refname, status| {
            if let Some(msg) = status {
                rejection.set(Some(format!("{} rejected: {}", refname, msg)));
            }
            Ok(())
        });

        let mut opts = PushOptions::new();
        opts.remote_callbacks(cb);
        tracing::info!(branch, "pushing to origin");
        remote.push(&[refspec.as_str()], Some(&mut opts))?;
    }

    match rejection.take() {
        Some(msg) => Err(git2::Error::from_str(&msg)),
        None => Ok(()),
    }
}

/// Clone `url` into `dest`.
///
/// Templates are public, so no credentials are offered.
pub fn clone_into(url: &str, dest: &Path) -> Result<Repository, git2::Error> {
    tracing::debug!(url, dest = %dest.display(), "git clone");
    Repository::clone(url, dest)
}
