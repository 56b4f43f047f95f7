use std::path::{Path, PathBuf};

use crate::extract::PhotoMetadata;
use crate::types::AlbumKind;

/// Site tag embedded in every filename.
const SOURCE_TAG: &str = "fb";

/// `{YYYYMMDD}_fb_{album}_{account}_{photo_id}.{ext}`
///
/// A pure function of its inputs, so a photo seen again maps to the same file.
pub fn photo_filename(photo: &PhotoMetadata, album: AlbumKind, account: &str) -> String {
    clean_filename(&format!(
        "{}_{}_{}_{}_{}.{}",
        photo.date_stamp(),
        SOURCE_TAG,
        album.as_str(),
        account,
        photo.photo_id,
        photo.extension
    ))
}

pub fn local_download_path(
    directory: &Path,
    photo: &PhotoMetadata,
    album: AlbumKind,
    account: &str,
) -> PathBuf {
    directory.join(photo_filename(photo, album, account))
}

/// Staging path the body is streamed to before the final rename.
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Remove characters that are invalid in filenames on common platforms.
pub fn clean_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}
