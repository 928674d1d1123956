//! Artifactory storage API types
//!
//! Response bodies of the storage and file-list endpoints, and their
//! conversion to [`FileInfo`].

use chrono::DateTime;
use serde::{Deserialize, Deserializer};

use crate::remote::FileInfo;
use crate::vfs::RepoPath;

/// Deserialize a size that might be encoded as a string, a negative
/// number (folders report -1) or null.
fn deserialize_flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct FlexibleU64Visitor;

    impl<'de> de::Visitor<'de> for FlexibleU64Visitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a u64, a string containing a u64, or null")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
            Ok(u64::try_from(value).unwrap_or(0))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
            match value.parse::<i64>() {
                Ok(number) => self.visit_i64(number),
                Err(_) => value.parse::<u64>().map_err(de::Error::custom),
            }
        }

        fn visit_none<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(FlexibleU64Visitor)
}

/// Parse an Artifactory ISO-8601 timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00.000Z`) as well as the compact
/// offset form Artifactory sometimes emits (`2024-01-15T10:30:00.000+0100`).
pub fn parse_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Response from the file list API (`?list&deep=0&listFolders=1`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    /// Storage URI of the listed folder
    #[serde(default)]
    pub uri: Option<String>,
    /// Immediate children of the folder
    #[serde(default)]
    pub files: Vec<FileListEntry>,
}

/// One child in a file list response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListEntry {
    /// Path relative to the listed folder, with a leading slash
    pub uri: String,
    /// Size in bytes (-1 or absent for folders)
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub size: u64,
    /// ISO-8601 modification time
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub folder: bool,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl FileListEntry {
    /// Convert to a FileInfo for a child of `dir`
    pub fn into_file_info(self, dir: &RepoPath) -> FileInfo {
        FileInfo {
            path: dir.child(&self.uri),
            size: if self.folder { 0 } else { self.size },
            last_modified: self
                .last_modified
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(0),
            is_directory: self.folder,
        }
    }
}

/// Child reference in a folder info response
#[derive(Debug, Clone, Deserialize)]
pub struct StorageChild {
    pub uri: String,
    #[serde(default)]
    pub folder: bool,
}

/// Checksums in a file info response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Checksums {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Response from the item info API (`/api/storage/{repo}/{path}`).
///
/// Folder info carries `children`; file info carries `size`,
/// `downloadUri` and `checksums`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub size: u64,
    #[serde(default)]
    pub download_uri: Option<String>,
    #[serde(default)]
    pub checksums: Option<Checksums>,
    #[serde(default)]
    pub children: Option<Vec<StorageChild>>,
}

impl StorageInfo {
    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    /// Modification time in epoch milliseconds, 0 when absent or malformed
    pub fn last_modified_millis(&self) -> i64 {
        self.last_modified
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(0)
    }
}
