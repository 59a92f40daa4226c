//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Smoke-test CLI for S3-compatible object stores.
//!
//! Examples:
//! ```bash
//! s3smoke --access-key AK --secret-key SK list --bucket mybucket --prefix img
//! s3smoke populate --bucket mybucket --remotekey blob --count 10
//! s3smoke upload   --bucket mybucket --localfile ./a.bin --remotedir backups
//! s3smoke download --bucket mybucket --remotekey backups/a.bin --localdir /tmp
//! s3smoke deletekey --bucket mybucket --remotekey backups/a.bin
//! ```
//!
//! Argument errors print usage and exit 1. Remote-call failures are printed
//! per call site and the process still exits 0: a failed page stops only the
//! remaining pages of that listing, never the program.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use futures_util::{StreamExt, pin_mut};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use s3smoke::{
    DEFAULT_OBJECT_SIZE, ListingRequest, S3Ops, StaticCredentials, build_client, download_target,
    generate_random_data, page_stream, populate_keys, remote_upload_key,
};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(
        short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    /// Access key id; falls back to AWS_ACCESS_KEY_ID.
    #[arg(long = "access-key", global = true)]
    access_key: Option<String>,

    /// Secret key; falls back to AWS_SECRET_ACCESS_KEY.
    #[arg(long = "secret-key", global = true)]
    secret_key: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List buckets, count keys, then list one prefix with folder simulation.
    List {
        /// Bucket to list.
        #[arg(long)]
        bucket: String,

        /// Key prefix; a trailing '/' is appended when missing.
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Upload `count` copies of a payload as `<remotekey><i>.bin`.
    Populate {
        #[arg(long)]
        bucket: String,

        /// Filename prefix for the generated keys.
        #[arg(long)]
        remotekey: String,

        /// Number of copies to upload.
        #[arg(long)]
        count: usize,

        /// Local file whose contents seed every copy; random data when absent.
        #[arg(long)]
        localfile: Option<PathBuf>,

        /// Payload size in bytes when no --localfile is given.
        #[arg(long, default_value_t = DEFAULT_OBJECT_SIZE)]
        size: usize,
    },

    /// Upload one local file under a remote directory.
    Upload {
        #[arg(long)]
        bucket: String,

        /// Local file to upload.
        #[arg(long)]
        localfile: PathBuf,

        /// Remote directory; empty uploads at the bucket root.
        #[arg(long, default_value = "")]
        remotedir: String,
    },

    /// Download one key into a local directory.
    Download {
        #[arg(long)]
        bucket: String,

        /// Key to download.
        #[arg(long)]
        remotekey: String,

        /// Destination directory; the file keeps the key's final segment.
        #[arg(long)]
        localdir: PathBuf,
    },

    /// Delete one key. Success does not prove the key existed.
    #[command(name = "deletekey")]
    DeleteKey {
        #[arg(long)]
        bucket: String,

        /// Key to delete.
        #[arg(long)]
        remotekey: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads any variables from .env that are not already set.
    dotenvy::dotenv().ok();

    // Clap's default parse-error exit code is 2; this harness exits 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let creds = match StaticCredentials::resolve(cli.access_key, cli.secret_key) {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // The client lives for exactly one action and is dropped on every exit
    // path, failures included.
    let ops = match build_client(&creds).await {
        Ok(client) => S3Ops::new(client),
        Err(e) => {
            eprintln!("client setup error: {e:#}");
            return Ok(());
        }
    };

    match cli.cmd {
        Command::List { bucket, prefix } => list_cmd(&ops, &bucket, &prefix).await?,
        Command::Populate {
            bucket,
            remotekey,
            count,
            localfile,
            size,
        } => populate_cmd(&ops, &bucket, &remotekey, count, localfile.as_deref(), size).await?,
        Command::Upload {
            bucket,
            localfile,
            remotedir,
        } => upload_cmd(&ops, &bucket, &localfile, &remotedir).await?,
        Command::Download {
            bucket,
            remotekey,
            localdir,
        } => download_cmd(&ops, &bucket, &remotekey, &localdir).await?,
        Command::DeleteKey { bucket, remotekey } => {
            deletekey_cmd(&ops, &bucket, &remotekey).await?
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// Command implementations
// -----------------------------------------------------------------------------

async fn list_cmd(ops: &S3Ops, bucket: &str, prefix: &str) -> Result<()> {
    // Account-level view first.
    match ops.list_buckets().await {
        Ok(buckets) => {
            safe_println!("Buckets:");
            for b in &buckets {
                safe_println!("  * {:<40} {}", b.name, b.creation_date);
            }
            safe_println!("{} bucket(s).", buckets.len());
        }
        Err(e) => eprintln!("ListBuckets error: {e}"),
    }

    // One-shot count: first page only, truncation surfaced but not followed.
    match ops.count_objects(bucket).await {
        Ok(count) if count.truncated => {
            safe_println!(
                "{} keys in {} (first page only; more keys exist).",
                count.keys,
                bucket
            );
        }
        Ok(count) => safe_println!("{} keys in {}.", count.keys, bucket),
        Err(e) => eprintln!("ListObjects error: {e}"),
    }

    let request = ListingRequest::new(bucket, prefix);
    let delimiter = request.delimiter.clone();
    safe_println!("Listing bucket {} with prefix {}:", bucket, request.prefix);

    let pages = page_stream(ops, request);
    pin_mut!(pages);
    while let Some(page) = pages.next().await {
        match page {
            Ok(page) => {
                for folder in page.folders(&delimiter) {
                    safe_println!("folder {}", folder);
                }
                for file in page.files() {
                    safe_println!("file   {}", file);
                }
                if page.is_truncated {
                    safe_println!(" continuing with next request...");
                }
            }
            Err(e) => eprintln!("ListObjects error: {e}"),
        }
    }
    Ok(())
}

async fn populate_cmd(
    ops: &S3Ops,
    bucket: &str,
    remotekey: &str,
    count: usize,
    localfile: Option<&Path>,
    size: usize,
) -> Result<()> {
    let payload = match localfile {
        Some(path) => match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("cannot read {}: {e}", path.display());
                return Ok(());
            }
        },
        None => generate_random_data(size),
    };

    safe_println!(
        "Uploading {} object(s) of {} bytes to bucket {}",
        count,
        payload.len(),
        bucket
    );

    // Strictly sequential: one upload completes before the next starts.
    for key in populate_keys(remotekey, count) {
        match ops.put_object(bucket, &key, payload.clone()).await {
            Ok(()) => safe_println!("  Uploaded {}.", key),
            Err(e) => eprintln!("PutObject error: {e}"),
        }
    }
    Ok(())
}

async fn upload_cmd(ops: &S3Ops, bucket: &str, localfile: &Path, remotedir: &str) -> Result<()> {
    let Some(file_name) = localfile.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        eprintln!("{} has no file name component", localfile.display());
        return Ok(());
    };

    let data = match fs::read(localfile) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("cannot read {}: {e}", localfile.display());
            return Ok(());
        }
    };

    let key = remote_upload_key(remotedir, &file_name);
    safe_println!(
        "Uploading {} to bucket {} as {}",
        localfile.display(),
        bucket,
        key
    );
    match ops.put_object(bucket, &key, data).await {
        Ok(()) => safe_println!("Done."),
        Err(e) => eprintln!("PutObject error: {e}"),
    }
    Ok(())
}

async fn download_cmd(ops: &S3Ops, bucket: &str, remotekey: &str, localdir: &Path) -> Result<()> {
    safe_println!(
        "Downloading {} from bucket {} to {}",
        remotekey,
        bucket,
        localdir.display()
    );

    match ops.get_object(bucket, remotekey).await {
        Ok(body) => {
            let target = download_target(localdir, remotekey);
            match fs::write(&target, &body) {
                Ok(()) => safe_println!("Done downloading to {}", target.display()),
                Err(e) => eprintln!("cannot write {}: {e}", target.display()),
            }
        }
        Err(e) => eprintln!("GetObject error: {e}"),
    }
    Ok(())
}

async fn deletekey_cmd(ops: &S3Ops, bucket: &str, remotekey: &str) -> Result<()> {
    match ops.delete_object(bucket, remotekey).await {
        Ok(()) => safe_println!("Deleted {} OK.", remotekey),
        Err(e) => eprintln!("DeleteObject error: {e}"),
    }
    Ok(())
}
