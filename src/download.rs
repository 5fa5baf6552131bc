use crate::config::USER_AGENT;
use crate::error::ShimError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::LOCATION;
use reqwest::{redirect, StatusCode, Url};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;

/// Upper bound on chained 301/302 responses followed by [`download_file`].
pub const MAX_REDIRECTS: usize = 10;

fn http_client() -> Result<reqwest::Client> {
    // Redirects are followed by hand so only 301/302 are honoured
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Downloads `url` into `local_path`.
///
/// 200 writes the body, 301/302 follow the `Location` header (at most
/// [`MAX_REDIRECTS`] times) and any other status fails with
/// [`ShimError::DownloadStatus`] before the destination is created. A
/// transfer or write error removes the partially written file.
pub async fn download_file(url: &str, local_path: &Path) -> Result<()> {
    let client = http_client()?;
    let mut current = Url::parse(url).with_context(|| format!("Invalid download URL: {}", url))?;
    let mut redirects = 0;

    let response = loop {
        tracing::debug!("GET {}", current);
        let response = client
            .get(current.clone())
            .send()
            .await
            .with_context(|| format!("Failed to request {}", current))?;

        let status = response.status();
        if status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND {
            if redirects == MAX_REDIRECTS {
                return Err(ShimError::TooManyRedirects {
                    url: url.to_string(),
                    limit: MAX_REDIRECTS,
                }
                .into());
            }
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| ShimError::MissingRedirectLocation {
                    url: current.to_string(),
                    status: status.as_u16(),
                })?;
            let next = response
                .url()
                .join(location)
                .with_context(|| format!("Invalid redirect target: {}", location))?;
            tracing::debug!("Following {} redirect to {}", status.as_u16(), next);
            current = next;
            redirects += 1;
            continue;
        }

        if status != StatusCode::OK {
            return Err(ShimError::DownloadStatus {
                url: current.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        break response;
    };

    if let Err(e) = write_body(response, local_path).await {
        if local_path.exists() {
            tracing::debug!("Removing partial download {}", local_path.display());
            let _ = fs::remove_file(local_path);
        }
        return Err(e);
    }

    Ok(())
}

async fn write_body(response: reqwest::Response, local_path: &Path) -> Result<()> {
    let total_size = response.content_length().unwrap_or(0);
    let filename = local_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)
        .with_context(|| format!("Could not create {}", local_path.display()))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk)
            .with_context(|| format!("Could not write {}", local_path.display()))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }
    file.flush()?;

    pb.finish_and_clear();
    tracing::info!("Downloaded {} bytes to {}", downloaded, local_path.display());
    Ok(())
}

/// Extracts `binary_name` from the archive into `extract_dir`.
///
/// `.zip` archives contribute only the named entry, written flat into
/// `extract_dir`; `.gz` archives (tar+gzip) are unpacked whole. The
/// resulting executable is made `0o755` on Unix.
pub fn extract_archive(
    archive_path: &Path,
    extract_dir: &Path,
    binary_name: &str,
) -> Result<PathBuf> {
    let extension = archive_path.extension().and_then(|s| s.to_str());

    match extension {
        Some("zip") => {
            tracing::info!("Extracting {} from zip archive...", binary_name);
            extract_zip_entry(archive_path, extract_dir, binary_name)?;
        }
        Some("gz") => {
            tracing::info!("Extracting tar.gz archive...");
            extract_tar_gz(archive_path, extract_dir)?;
        }
        _ => {
            return Err(ShimError::UnsupportedArchive {
                path: archive_path.to_path_buf(),
            }
            .into());
        }
    }

    let executable_path = extract_dir.join(binary_name);
    if !executable_path.is_file() {
        return Err(ShimError::Extraction {
            archive: archive_path.to_path_buf(),
            reason: format!(
                "{} not found after extraction (found: {})",
                binary_name,
                list_files(extract_dir).join(", ")
            ),
        }
        .into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&executable_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&executable_path, perms)?;
    }

    tracing::info!(
        "Successfully extracted executable: {}",
        executable_path.display()
    );
    Ok(executable_path)
}

fn extract_zip_entry(archive_path: &Path, extract_dir: &Path, binary_name: &str) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Could not open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ShimError::Extraction {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort_by_key(|name| (name.len(), name.clone()));

    // Exact entry name first, then the shallowest entry whose file name matches
    let entry_name = names
        .iter()
        .find(|name| name.as_str() == binary_name)
        .or_else(|| {
            names
                .iter()
                .find(|name| name.rsplit('/').next() == Some(binary_name))
        })
        .ok_or_else(|| ShimError::Extraction {
            archive: archive_path.to_path_buf(),
            reason: format!("no entry named {}", binary_name),
        })?
        .clone();

    let mut entry = archive.by_name(&entry_name).map_err(|e| ShimError::Extraction {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::debug!("Using zip entry {}", entry.name());

    let outpath = extract_dir.join(binary_name);
    let mut outfile = fs::File::create(&outpath)
        .with_context(|| format!("Could not create {}", outpath.display()))?;
    io::copy(&mut entry, &mut outfile)?;

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Could not open {}", archive_path.display()))?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    archive.unpack(extract_dir).map_err(|e| ShimError::Extraction {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(())
}

fn list_files(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(dir)
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
        .collect()
}
