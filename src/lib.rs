// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root: module declarations plus the re-exports the CLI uses.

pub mod data_gen;
pub mod error;
pub mod listing;
pub mod s3_client;
pub mod s3_ops;

pub use crate::data_gen::{DEFAULT_OBJECT_SIZE, generate_random_data, populate_keys};
pub use crate::error::RemoteCallError;
pub use crate::listing::{
    DEFAULT_DELIMITER, ListPageSource, ListingPage, ListingRequest, folder_name, normalize_prefix,
    page_stream,
};
pub use crate::s3_client::{DEFAULT_REGION, StaticCredentials, build_client};
pub use crate::s3_ops::{BucketInfo, ObjectCount, S3Ops, download_target, remote_upload_key};
