use git2::Repository;
use std::path::Path;

use crate::error::Result;

/// Find a tag pointing at `HEAD` of the repository containing `path`
pub fn tag_on_head(path: &Path) -> Result<Option<String>> {
    let repo = Repository::discover(path)?;
    let head = repo.head()?;
    let Some(oid) = head.target() else {
        return Ok(None);
    };

    let tags = repo.tag_names(None)?;
    for tag in tags.iter().flatten() {
        // Annotated tags peel to the commit they point at
        if let Ok(commit) = repo
            .revparse_single(&format!("refs/tags/{tag}"))
            .and_then(|object| object.peel_to_commit())
        {
            if commit.id() == oid {
                return Ok(Some(tag.to_string()));
            }
        }
    }

    Ok(None)
}
