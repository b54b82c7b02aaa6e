//! Input images: extension checks and filename sanitising.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

use crate::error::InputError;

/// Extensions accepted for every operation (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Whether `filename` has an allowed extension after its last `.`.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

/// Reduce a user-supplied file name to a safe ASCII name.
///
/// Accented letters are decomposed (NFKD) so their base letter survives
/// the ASCII filter. Path separators become word breaks, words are joined
/// with `_`, every character outside `[A-Za-z0-9_.-]` is dropped and
/// leading/trailing `.`/`_` are stripped. Returns an empty string if
/// nothing survives.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_chars()
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// An input image: its sanitised file name and raw bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate `file_name` and wrap the bytes.
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Result<Self, InputError> {
        if file_name.trim().is_empty() {
            return Err(InputError::NoFileName);
        }
        if !allowed_file(file_name) {
            return Err(InputError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }

        // The allowed extension always survives sanitising, so the name
        // is never empty here
        Ok(Self {
            file_name: secure_filename(file_name),
            bytes,
        })
    }

    /// Read an image from disk, refusing files larger than `max_bytes`.
    pub async fn from_path(path: &Path, max_bytes: u64) -> Result<Self, InputError> {
        let file_name = path
            .file_name()
            .ok_or(InputError::NoFileName)?
            .to_str()
            .ok_or_else(|| InputError::InvalidFileName {
                path: path.to_path_buf(),
            })?;

        // Check the name before touching the file system
        if !allowed_file(file_name) {
            return Err(InputError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }

        let read_err = |source| InputError::Read {
            path: path.to_path_buf(),
            source,
        };
        let size = tokio::fs::metadata(path).await.map_err(read_err)?.len();
        if size > max_bytes {
            return Err(InputError::FileTooLarge {
                size,
                max: max_bytes,
            });
        }
        let bytes = tokio::fs::read(path).await.map_err(read_err)?;

        tracing::debug!(path = %path.display(), size, "Read input image");
        Self::new(file_name, bytes)
    }

    /// Sanitised file name, e.g. `holiday_photo.JPG`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without its final extension, used to name outputs.
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&self.file_name)
    }

    /// Lowercased extension, if the sanitised name still has one.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
