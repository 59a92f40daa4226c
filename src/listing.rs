// src/listing.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Prefix/delimiter listing: request normalization plus the
//! continuation-token pagination engine.
//!
//! S3 keys form a flat namespace; a delimiter-bounded listing simulates a
//! folder hierarchy by splitting each page into common prefixes ("folders")
//! and keys ("files"). One `ListObjectsV2` call produces one page; a
//! truncated page carries an opaque continuation token that resumes the
//! enumeration exactly where the previous call stopped.

use async_trait::async_trait;
use futures::Stream;

use crate::error::RemoteCallError;

/// Delimiter used for folder simulation.
pub const DEFAULT_DELIMITER: &str = "/";

/// Append `delimiter` to a non-empty prefix that does not already end with
/// it. An empty prefix stays empty so an unscoped listing remains unscoped.
/// Idempotent.
pub fn normalize_prefix(prefix: &str, delimiter: &str) -> String {
    if !prefix.is_empty() && !prefix.ends_with(delimiter) {
        format!("{prefix}{delimiter}")
    } else {
        prefix.to_owned()
    }
}

/// Trim one trailing delimiter from a common-prefix entry to get the folder
/// name it simulates. Only the trailing delimiter is removed; a degenerate
/// entry equal to the delimiter itself trims to the empty name.
pub fn folder_name<'a>(common_prefix: &'a str, delimiter: &str) -> &'a str {
    common_prefix
        .strip_suffix(delimiter)
        .unwrap_or(common_prefix)
}

/// One delimited listing request. The prefix is normalized on construction,
/// so a non-empty prefix always ends with the delimiter by the time it is
/// sent.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub bucket: String,
    pub prefix: String,
    pub delimiter: String,
}

impl ListingRequest {
    pub fn new(bucket: impl Into<String>, prefix: &str) -> Self {
        Self::with_delimiter(bucket, prefix, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter(bucket: impl Into<String>, prefix: &str, delimiter: &str) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: normalize_prefix(prefix, delimiter),
            delimiter: delimiter.to_owned(),
        }
    }
}

/// One page of a delimited listing, as returned by a single call.
/// Immutable once returned.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub common_prefixes: Vec<String>,
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_token: Option<String>,
}

impl ListingPage {
    /// Folder names on this page, one trailing delimiter trimmed.
    pub fn folders<'a>(&'a self, delimiter: &'a str) -> impl Iterator<Item = &'a str> {
        self.common_prefixes
            .iter()
            .map(move |p| folder_name(p, delimiter))
    }

    /// Object keys on this page, verbatim.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// A backend that can serve one listing page at a time.
#[async_trait]
pub trait ListPageSource {
    /// Issue a single page request. `continuation` is the token from the
    /// previous page, or `None` for the first call.
    async fn list_page(
        &self,
        request: &ListingRequest,
        continuation: Option<&str>,
    ) -> Result<ListingPage, RemoteCallError>;
}

/// Drive `source` through every page of `request`.
///
/// The stream is lazy, finite, and not restartable: it ends after the first
/// non-truncated page, or after yielding the first error. Pages yielded
/// before a failure remain valid; no retry is attempted and no further
/// calls are issued. Page N+1 is never requested before page N's
/// continuation token is known.
pub fn page_stream<'a, S>(
    source: &'a S,
    request: ListingRequest,
) -> impl Stream<Item = Result<ListingPage, RemoteCallError>> + 'a
where
    S: ListPageSource + Sync + ?Sized,
{
    async_stream::stream! {
        let mut continuation: Option<String> = None;
        loop {
            let page = match source.list_page(&request, continuation.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            // A page that is not truncated is terminal, whatever its token says.
            let next = if page.is_truncated {
                page.next_token.clone()
            } else {
                None
            };
            yield Ok(page);
            match next {
                Some(token) => continuation = Some(token),
                None => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_leaves_empty_prefix_alone() {
        assert_eq!(normalize_prefix("", "/"), "");
    }

    #[test]
    fn normalize_appends_missing_delimiter() {
        assert_eq!(normalize_prefix("logs", "/"), "logs/");
        assert_eq!(normalize_prefix("logs/", "/"), "logs/");
    }

    #[test]
    fn normalize_is_idempotent() {
        for p in ["", "logs", "logs/", "a/b", "a/b/", "/"] {
            let once = normalize_prefix(p, "/");
            assert_eq!(normalize_prefix(&once, "/"), once, "input {p:?}");
        }
    }

    #[test]
    fn folder_name_trims_one_trailing_delimiter() {
        assert_eq!(folder_name("folder1/", "/"), "folder1");
        assert_eq!(folder_name("folder1", "/"), "folder1");
        assert_eq!(folder_name("a/b/", "/"), "a/b");
    }

    #[test]
    fn folder_name_passes_degenerate_entry_through() {
        assert_eq!(folder_name("/", "/"), "");
    }

    #[test]
    fn request_normalizes_prefix_on_construction() {
        let req = ListingRequest::new("bucket", "img");
        assert_eq!(req.prefix, "img/");
        assert_eq!(req.delimiter, "/");

        let req = ListingRequest::new("bucket", "");
        assert_eq!(req.prefix, "");
    }

    #[test]
    fn page_views_trim_folders_and_keep_files_verbatim() {
        let page = ListingPage {
            common_prefixes: vec!["img/2020/".into(), "img/2021".into(), "/".into()],
            keys: vec!["img/readme.txt".into()],
            is_truncated: false,
            next_token: None,
        };
        let folders: Vec<&str> = page.folders("/").collect();
        assert_eq!(folders, vec!["img/2020", "img/2021", ""]);
        let files: Vec<&str> = page.files().collect();
        assert_eq!(files, vec!["img/readme.txt"]);
    }
}
