use std::path::Path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

const HASH_LEN: usize = 8;

/// Short, filesystem-safe digest of a path in posix form.
fn hash_path(path: &Path) -> String {
    let posix = path.to_string_lossy().replace('\\', "/");
    let digest = Sha256::digest(posix.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

/// Default name prefix for environments owned by the project at `root`:
/// `<dir name>-<hash>-`.
#[must_use]
pub fn venv_prefix(root: &Path) -> String {
    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{name}-{}-", hash_path(root))
}
