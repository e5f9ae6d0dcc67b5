//! Turns tag names and version specs into verified commit hashes.
//!
//! Every lookup goes through a [`Catalog`]. Results are memoized per resolver
//! instance, so one run performs at most one resolution sequence per distinct
//! `(owner, repo, reference)` and `(owner, repo, spec)`.
//!
//! Minor and major specs take the first matching release (then tag) in the
//! order the catalog lists them. GitHub lists both newest-first; the resolver
//! relies on that ordering and does not sort.

use crate::catalog::{self, fetch, Catalog, GitRef, Release, Tag, PAGE_SIZE};
use crate::error::{PinError, Result};
use crate::version::{self, is_full_commit_sha, SpecKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

type CacheKey = (String, String, String);

/// A resolved version: the tag that satisfied the spec and its commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub tag: String,
    pub commit: String,
}

pub struct TagResolver<'a> {
    catalog: &'a dyn Catalog,
    refs: HashMap<CacheKey, String>,
    specs: HashMap<CacheKey, Resolution>,
}

impl<'a> TagResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self {
            catalog,
            refs: HashMap::new(),
            specs: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    /// Dereference a tag name to its commit, following annotated tags.
    ///
    /// A full 40-hex hash is trusted and returned lowercased without a fetch.
    pub fn resolve_reference(&mut self, owner: &str, repo: &str, reference: &str) -> Result<String> {
        if is_full_commit_sha(reference) {
            return Ok(reference.to_lowercase());
        }

        let key = (owner.to_lowercase(), repo.to_lowercase(), reference.to_string());
        if let Some(sha) = self.refs.get(&key) {
            tracing::debug!(owner, repo, reference, "reference cache hit");
            return Ok(sha.clone());
        }

        let r: GitRef = fetch(self.catalog, &catalog::tag_ref_path(owner, repo, reference))?;
        let mut object = r.object;
        while object.kind == "tag" {
            tracing::debug!(owner, repo, reference, sha = %object.sha, "dereferencing annotated tag");
            let r: GitRef = fetch(
                self.catalog,
                &catalog::tag_object_path(owner, repo, &object.sha),
            )?;
            object = r.object;
        }

        if object.kind != "commit" {
            return Err(PinError::UnsupportedObject {
                reference: reference.to_string(),
                kind: object.kind,
            });
        }

        let sha = object.sha.to_lowercase();
        self.refs.insert(key, sha.clone());
        Ok(sha)
    }

    // -----------------------------------------------------------------------
    // Version specs
    // -----------------------------------------------------------------------

    /// Resolve a version spec (`v1`, `1.2`, `v1.2.3`, or a literal ref name).
    pub fn resolve_spec(&mut self, owner: &str, repo: &str, spec: &str) -> Result<Resolution> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(PinError::EmptySpec);
        }

        let (kind, normalized) = version::classify(spec);
        let key = (
            owner.to_lowercase(),
            repo.to_lowercase(),
            normalized.to_lowercase(),
        );
        if let Some(cached) = self.specs.get(&key) {
            tracing::debug!(owner, repo, spec, "spec cache hit");
            return Ok(cached.clone());
        }

        let resolution = match kind {
            SpecKind::Exact => self.resolve_exact(owner, repo, spec, &normalized)?,
            SpecKind::Minor | SpecKind::Major => {
                let tag = self.find_matching_tag(owner, repo, &normalized, kind)?;
                let commit = self.resolve_reference(owner, repo, &tag)?;
                Resolution { tag, commit }
            }
            SpecKind::Unknown => Resolution {
                tag: spec.to_string(),
                commit: self.resolve_reference(owner, repo, spec)?,
            },
        };

        tracing::debug!(owner, repo, spec, %kind, tag = %resolution.tag, commit = %resolution.commit, "resolved spec");
        self.specs.insert(key, resolution.clone());
        Ok(resolution)
    }

    fn resolve_exact(
        &mut self,
        owner: &str,
        repo: &str,
        original: &str,
        normalized: &str,
    ) -> Result<Resolution> {
        let digits = original
            .strip_prefix(['v', 'V'])
            .unwrap_or(original);

        let mut candidates: Vec<&str> = Vec::with_capacity(3);
        for candidate in [normalized, original, digits] {
            if !candidate.is_empty()
                && !candidates.iter().any(|c| c.eq_ignore_ascii_case(candidate))
            {
                candidates.push(candidate);
            }
        }

        for candidate in candidates {
            match self.resolve_reference(owner, repo, candidate) {
                Ok(commit) => {
                    return Ok(Resolution {
                        tag: candidate.to_string(),
                        commit,
                    })
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(owner, repo, candidate, "tag not found, trying next candidate");
                }
                Err(e) => return Err(e),
            }
        }

        Err(PinError::NoReleaseFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
            spec: original.to_string(),
        })
    }

    /// First release (then tag) whose name satisfies a minor or major spec.
    pub fn find_matching_tag(
        &self,
        owner: &str,
        repo: &str,
        normalized: &str,
        kind: SpecKind,
    ) -> Result<String> {
        let from_releases = self.search_pages(
            |page| catalog::releases_path(owner, repo, page),
            |release: &Release| {
                (!release.prerelease && version::matches(&release.tag_name, normalized, kind))
                    .then(|| release.tag_name.clone())
            },
        )?;
        if let Some(tag) = from_releases {
            return Ok(tag);
        }

        tracing::debug!(owner, repo, spec = normalized, "no matching release, searching tags");
        let from_tags = self.search_pages(
            |page| catalog::tags_path(owner, repo, page),
            |tag: &Tag| version::matches(&tag.name, normalized, kind).then(|| tag.name.clone()),
        )?;

        from_tags.ok_or_else(|| PinError::NoMatchingRelease {
            owner: owner.to_string(),
            repo: repo.to_string(),
            spec: normalized.to_string(),
        })
    }

    /// Walk a paged listing until `pick` returns a name. A short page or a 404
    /// ends the listing.
    fn search_pages<T, P, F>(&self, path_for: P, pick: F) -> Result<Option<String>>
    where
        T: DeserializeOwned,
        P: Fn(usize) -> String,
        F: Fn(&T) -> Option<String>,
    {
        let mut page = 1;
        loop {
            let path = path_for(page);
            let items: Vec<T> = match fetch(self.catalog, &path) {
                Ok(items) => items,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%path, "listing not found");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            if let Some(found) = items.iter().find_map(&pick) {
                return Ok(Some(found));
            }
            if items.len() < PAGE_SIZE {
                return Ok(None);
            }
            page += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Latest version
    // -----------------------------------------------------------------------

    /// The version an upgrade should move to: `version_override` when given,
    /// otherwise the latest release, otherwise the newest tag.
    pub fn latest(
        &mut self,
        owner: &str,
        repo: &str,
        version_override: Option<&str>,
    ) -> Result<Resolution> {
        if let Some(spec) = version_override.filter(|s| !s.trim().is_empty()) {
            return self.resolve_spec(owner, repo, spec);
        }

        match fetch::<Release>(self.catalog, &catalog::latest_release_path(owner, repo)) {
            Ok(release) if !release.tag_name.is_empty() => {
                match self.resolve_reference(owner, repo, &release.tag_name) {
                    Ok(commit) => {
                        return Ok(Resolution {
                            tag: release.tag_name,
                            commit,
                        })
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        tracing::debug!(owner, repo, "no usable latest release, using newest tag");
        let tags: Vec<Tag> = fetch(self.catalog, &catalog::newest_tag_path(owner, repo))?;
        let newest = tags
            .into_iter()
            .next()
            .and_then(|t| t.commit.map(|c| (t.name, c.sha)));
        match newest {
            Some((tag, sha)) => Ok(Resolution {
                tag,
                commit: sha.to_lowercase(),
            }),
            None => Err(PinError::NoRelease {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
        }
    }
}
