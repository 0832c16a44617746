//! Upload policy and storage key layout.
//!
//! Keys look like `<prefix>/matter-<matter_id>/<token>-<filename>`. The
//! per-matter prefix is what stops a key minted for one matter from being
//! registered against another.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::AppError;

const FILENAME_MAX: usize = 100;

fn exts_for_mime(ct: &str) -> Option<&'static [&'static str]> {
    match ct {
        "application/pdf" => Some(&["pdf"]),
        "application/msword" => Some(&["doc"]),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some(&["docx"]),
        "text/plain" => Some(&["txt"]),
        "image/png" => Some(&["png"]),
        "image/jpeg" | "image/jpg" => Some(&["jpg", "jpeg"]),
        _ => None,
    }
}

fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn is_allowed_extension(ext: &str) -> bool {
    matches!(ext, "pdf" | "doc" | "docx" | "txt" | "png" | "jpg" | "jpeg")
}

/// Content type must be on the allow-list and agree with the extension.
pub fn check_upload(filename: &str, content_type: &str) -> Result<(), AppError> {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let allowed = exts_for_mime(&ct)
        .ok_or_else(|| AppError::unsupported_file(format!("Content type {ct:?} is not allowed")))?;
    let ext = extension(filename)
        .ok_or_else(|| AppError::unsupported_file("File must have an extension"))?;
    if !allowed.contains(&ext.as_str()) {
        return Err(AppError::unsupported_file(format!(
            "Extension .{ext} does not match content type {ct}"
        )));
    }
    Ok(())
}

/// Extension check for registration, where no content type is sent.
pub fn check_filename(filename: &str) -> Result<(), AppError> {
    match extension(filename) {
        Some(ext) if is_allowed_extension(&ext) => Ok(()),
        _ => Err(AppError::unsupported_file("File type is not allowed")),
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    lazy_static! {
        static ref UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
        static ref DOTS: Regex = Regex::new(r"\.{2,}").unwrap();
    }
    // only the last path component counts
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE.replace_all(base, "_");
    // runs of dots would read as ".." in the key
    let cleaned = DOTS.replace_all(&cleaned, ".");
    let cleaned = cleaned.trim_start_matches('.');
    // keep the tail so the extension survives
    let skip = cleaned.chars().count().saturating_sub(FILENAME_MAX);
    let out: String = cleaned.chars().skip(skip).collect();
    if out.is_empty() {
        return "file".into();
    }
    out
}

pub fn matter_prefix(upload_prefix: &str, matter_id: i64) -> String {
    format!("{}/matter-{}/", upload_prefix.trim_matches('/'), matter_id)
}

pub fn mint_key(upload_prefix: &str, matter_id: i64, filename: &str) -> String {
    format!(
        "{}{}-{}",
        matter_prefix(upload_prefix, matter_id),
        Uuid::new_v4().simple(),
        sanitize_filename(filename)
    )
}

/// Rejects keys that were not minted for `matter_id`, and keys whose own
/// name is not an allowed file type.
pub fn ensure_key_for_matter(upload_prefix: &str, matter_id: i64, key: &str) -> Result<(), AppError> {
    let prefix = matter_prefix(upload_prefix, matter_id);
    let rest = key
        .strip_prefix(&prefix)
        .ok_or_else(|| AppError::unsupported_file("Storage key does not belong to this matter"))?;
    if rest.is_empty() || rest.contains('/') || rest.contains("..") {
        return Err(AppError::unsupported_file("Malformed storage key"));
    }
    check_filename(rest)
}
