use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::ArtifactNames;
use crate::template::{self, group_thousands};

/// Summary of a successful packaging run.
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_len: u64,
    pub encoded_len: usize,
    pub sha256: String,
}

#[derive(Debug)]
pub enum PackageOutcome {
    Written(PackageReport),
    /// The source file did not exist; nothing was written.
    SourceMissing(PathBuf),
}

impl PackageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PackageOutcome::Written(_))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Match { bytes: u64, sha256: String },
    Mismatch { expected: String, actual: String },
    SourceMissing(PathBuf),
    ArtifactMissing(PathBuf),
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Match { .. })
    }
}

/// Standard padded base64 of `bytes`.
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload)
        .context("Embedded payload is not valid base64")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Find the payload literal assigned to `window.<global_name>` in an artifact.
pub fn extract_payload<'a>(artifact: &'a str, global_name: &str) -> Option<&'a str> {
    let prefix = template::assignment_prefix(global_name);
    artifact
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str())?.strip_suffix("`;"))
}

/// Read `source`, embed its base64 encoding in the loader template and write
/// the result to `output`.
///
/// A missing source is reported and returned as
/// [`PackageOutcome::SourceMissing`] without touching `output`. Read and write
/// failures are returned as errors.
pub fn package(source: &Path, output: &Path, names: &ArtifactNames) -> Result<PackageOutcome> {
    if !source.exists() {
        eprintln!("❌ Error: {} not found", source.display());
        return Ok(PackageOutcome::SourceMissing(source.to_path_buf()));
    }

    let bytes = fs::read(source)
        .with_context(|| format!("Failed to read source file: {}", source.display()))?;
    tracing::debug!(source = %source.display(), len = bytes.len(), "read source");

    let payload = encode_payload(&bytes);
    let source_len = bytes.len() as u64;

    println!("Database size: {} bytes", group_thousands(source_len));
    println!(
        "Base64 size: {} characters",
        group_thousands(payload.len() as u64)
    );

    let artifact = template::render(names, source_len, &payload);
    write_atomic(output, &artifact)?;

    println!("✅ Created {}", output.display());

    Ok(PackageOutcome::Written(PackageReport {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        source_len,
        encoded_len: payload.len(),
        sha256: sha256_hex(&bytes),
    }))
}

/// Check that the payload embedded in `output` decodes to the bytes of `source`.
pub fn verify(source: &Path, output: &Path, names: &ArtifactNames) -> Result<VerifyOutcome> {
    if !source.exists() {
        return Ok(VerifyOutcome::SourceMissing(source.to_path_buf()));
    }
    if !output.exists() {
        return Ok(VerifyOutcome::ArtifactMissing(output.to_path_buf()));
    }

    let bytes = fs::read(source)
        .with_context(|| format!("Failed to read source file: {}", source.display()))?;
    let artifact = fs::read_to_string(output)
        .with_context(|| format!("Failed to read artifact: {}", output.display()))?;

    let payload = extract_payload(&artifact, &names.global_name).with_context(|| {
        format!(
            "No `window.{}` assignment found in {}",
            names.global_name,
            output.display()
        )
    })?;
    let decoded = decode_payload(payload)
        .with_context(|| format!("Failed to decode payload in {}", output.display()))?;

    let expected = sha256_hex(&bytes);
    tracing::debug!(expected = %expected, decoded_len = decoded.len(), "comparing payload");

    if decoded == bytes {
        Ok(VerifyOutcome::Match {
            bytes: bytes.len() as u64,
            sha256: expected,
        })
    } else {
        Ok(VerifyOutcome::Mismatch {
            expected,
            actual: sha256_hex(&decoded),
        })
    }
}

/// Write `contents` to a temporary file next to `path` and rename it into
/// place, so `path` only ever holds a complete artifact.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut tempfile = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in: {}", dir.display()))?;
    tempfile
        .write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write artifact for: {}", path.display()))?;

    // Temporary files are created owner-only. An existing artifact keeps its mode.
    let permissions = match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        tempfile
            .as_file()
            .set_permissions(permissions)
            .with_context(|| format!("Failed to set permissions on: {}", path.display()))?;
    }

    // Drop the temporary file with the error so it is removed right away.
    tempfile
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    tracing::debug!(output = %path.display(), len = contents.len(), "wrote artifact");

    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}
