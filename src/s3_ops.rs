// src/s3_ops.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! One-shot S3 operations over a scoped client.
//!
//! `S3Ops` owns the client for the duration of one CLI action and exposes
//! exactly the calls the smoke harness needs. Every method issues a single
//! request; the paginated listing lives in [`crate::listing`] and pulls its
//! pages through the [`ListPageSource`] impl at the bottom of this file.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::RemoteCallError;
use crate::listing::{DEFAULT_DELIMITER, ListPageSource, ListingPage, ListingRequest, normalize_prefix};

/// Bucket name plus creation date, for account-level listing output.
#[derive(Debug, Clone)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: String,
}

/// Result of the one-shot full-bucket count.
///
/// `truncated` means the service had more keys than one page could carry;
/// the count covers the first page only and the remainder is deliberately
/// not fetched. The paginated listing is the authoritative path.
#[derive(Debug, Clone, Copy)]
pub struct ObjectCount {
    pub keys: usize,
    pub truncated: bool,
}

pub struct S3Ops {
    client: Client,
}

impl S3Ops {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the account's buckets. One call; the service returns at most
    /// one page of buckets and truncation is not followed.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>, RemoteCallError> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(RemoteCallError::from_sdk)?;

        let buckets = resp
            .buckets()
            .iter()
            .map(|b| BucketInfo {
                name: b.name().unwrap_or_default().to_owned(),
                creation_date: b
                    .creation_date()
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        Ok(buckets)
    }

    /// Count keys with a single undelimited `ListObjectsV2` call.
    ///
    /// Distinct from the paginated listing on purpose: this is the cheap
    /// "is anything there at all" probe and never loops.
    pub async fn count_objects(&self, bucket: &str) -> Result<ObjectCount, RemoteCallError> {
        debug!("COUNT s3://{}", bucket);
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(RemoteCallError::from_sdk)?;

        Ok(ObjectCount {
            keys: resp.contents().len(),
            truncated: resp.is_truncated().unwrap_or(false),
        })
    }

    /// Upload one object.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
    ) -> Result<(), RemoteCallError> {
        debug!("PUT s3://{}/{} ({} bytes)", bucket, key, data.len());
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(RemoteCallError::from_sdk)?;
        Ok(())
    }

    /// Download one object into memory.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, RemoteCallError> {
        debug!("GET s3://{}/{}", bucket, key);
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(RemoteCallError::from_sdk)?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| RemoteCallError::new("ByteStreamError", e.to_string()))?;
        Ok(body.into_bytes())
    }

    /// Delete one key. S3 reports success even when the key never existed,
    /// so the outcome cannot be used to infer prior existence.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), RemoteCallError> {
        debug!("DELETE s3://{}/{}", bucket, key);
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(RemoteCallError::from_sdk)?;
        Ok(())
    }
}

#[async_trait]
impl ListPageSource for S3Ops {
    async fn list_page(
        &self,
        request: &ListingRequest,
        continuation: Option<&str>,
    ) -> Result<ListingPage, RemoteCallError> {
        debug!(
            "LIST s3://{}/{} delimiter={:?} token={:?}",
            request.bucket, request.prefix, request.delimiter, continuation
        );

        let mut req = self
            .client
            .list_objects_v2()
            .bucket(&request.bucket)
            .prefix(&request.prefix)
            .delimiter(&request.delimiter);
        if let Some(token) = continuation {
            req = req.continuation_token(token);
        }

        let resp = req.send().await.map_err(RemoteCallError::from_sdk)?;

        Ok(ListingPage {
            common_prefixes: resp
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix())
                .map(str::to_owned)
                .collect(),
            keys: resp
                .contents()
                .iter()
                .filter_map(|o| o.key())
                .map(str::to_owned)
                .collect(),
            is_truncated: resp.is_truncated().unwrap_or(false),
            next_token: resp.next_continuation_token().map(str::to_owned),
        })
    }
}

/// Remote key for an uploaded file: the remote directory (delimiter
/// appended when missing, empty meaning the bucket root) plus the file name.
pub fn remote_upload_key(remote_dir: &str, file_name: &str) -> String {
    format!(
        "{}{}",
        normalize_prefix(remote_dir, DEFAULT_DELIMITER),
        file_name
    )
}

/// Local target for a downloaded key: the segment after the last delimiter,
/// joined onto the destination directory.
pub fn download_target(local_dir: &Path, key: &str) -> PathBuf {
    let file_name = match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    };
    local_dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_key_joins_dir_and_file() {
        assert_eq!(remote_upload_key("backups", "a.bin"), "backups/a.bin");
        assert_eq!(remote_upload_key("backups/", "a.bin"), "backups/a.bin");
        assert_eq!(remote_upload_key("", "a.bin"), "a.bin");
    }

    #[test]
    fn download_target_uses_final_key_segment() {
        let dir = Path::new("/tmp/dst");
        assert_eq!(
            download_target(dir, "a/b/c.txt"),
            PathBuf::from("/tmp/dst/c.txt")
        );
        assert_eq!(
            download_target(dir, "plain.txt"),
            PathBuf::from("/tmp/dst/plain.txt")
        );
    }
}
