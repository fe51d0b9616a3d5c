use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use url::Url;

/// `<root>/<packId>/v<version>`, with the pack id reduced to a safe path segment.
pub fn staging_dir(root: &Path, pack_id: &str, version: u64) -> PathBuf {
    root.join(path_segment(pack_id, "pack")).join(format!("v{version}"))
}

fn path_segment(raw: &str, fallback: &str) -> String {
    let segment: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    match segment.as_str() {
        "" | "." | ".." => fallback.to_string(),
        _ => segment,
    }
}

/// Resolves a shard or delta URL against the manifest URL.
pub fn resolve_url(manifest_url: &str, target: &str) -> String {
    match Url::parse(manifest_url).and_then(|base| base.join(target)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) if target.starts_with("http://") || target.starts_with("https://") => target.to_string(),
        Err(_) => format!("{}/{}", manifest_url.trim_end_matches('/'), target),
    }
}

/// Last path segment of `url` without query or fragment, or `fallback` if empty.
pub fn local_file_name(url: &str, fallback: &str) -> String {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => fallback.to_string(),
    }
}

/// Staging file name for one shard of a manifest.
///
/// Shards whose URLs end in the same segment get the shard id as a prefix, keeping the
/// extension so the codec is still chosen correctly.
pub fn shard_file_name(url: &str, shard_id: &str, taken: &mut BTreeSet<String>) -> String {
    let id = path_segment(shard_id, "shard");
    let plain = local_file_name(url, &format!("{id}.ndjson"));
    let mut name = plain.clone();
    let mut attempt = 0;
    while taken.contains(&name) {
        attempt += 1;
        name = if attempt == 1 {
            format!("{id}-{plain}")
        } else {
            format!("{id}-{attempt}-{plain}")
        };
    }
    taken.insert(name.clone());
    name
}
