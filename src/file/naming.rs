//! Collision-safe naming for uploaded files.
//!
//! A desired name `stem.ext` is tried as-is first, then as `stem(1).ext`,
//! `stem(2).ext`, ... until a free name is found.

use std::path::Path;

use super::media::is_visible;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Split a filename into stem and extension (the extension keeps its dot).
///
/// Leading dots belong to the stem, so `.bashrc` has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Longest filename, in bytes, most filesystems accept.
pub const MAX_NAME_BYTES: usize = 255;

/// Candidate names for `desired`, in the order they are tried.
///
/// The sequence is unbounded; the first item is `desired` itself. The stem is
/// shortened when needed so every candidate fits in [`MAX_NAME_BYTES`].
pub fn candidates(desired: &str) -> impl Iterator<Item = String> {
    let (stem, ext) = split_name(desired);
    let (stem, ext) = (stem.to_string(), ext.to_string());
    std::iter::once(fit_name(&stem, "", &ext))
        .chain((1u64..).map(move |n| fit_name(&stem, &format!("({n})"), &ext)))
}

/// `{stem}{marker}{ext}`, shortening the stem to fit in [`MAX_NAME_BYTES`].
fn fit_name(stem: &str, marker: &str, ext: &str) -> String {
    let budget = MAX_NAME_BYTES.saturating_sub(marker.len());
    if stem.len() + ext.len() <= budget {
        return format!("{stem}{marker}{ext}");
    }

    let kept = truncate_bytes(stem, budget.saturating_sub(ext.len()));
    if kept.is_empty() {
        // Extension alone is too long: keep the start of the whole name.
        let whole = format!("{stem}{ext}");
        return format!("{}{marker}", truncate_bytes(&whole, budget));
    }
    format!("{kept}{marker}{ext}")
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// First candidate for `desired` that does not exist in `dir`.
///
/// This is a plain check and is not atomic against concurrent writers;
/// [`FileStore::save`](super::FileStore::save) reserves names with exclusive
/// create instead.
pub fn resolve(dir: &Path, desired: &str) -> String {
    candidates(desired)
        .find(|candidate| dir.join(candidate).symlink_metadata().is_err())
        .unwrap_or_else(|| desired.to_string())
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps the last component, removes control characters, and trims
/// whitespace and leading dots. May return an empty string.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw.rsplit(is_separator).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    cleaned
        .trim()
        .trim_start_matches('.')
        .trim_start()
        .to_string()
}

/// Whether a name from a request path addresses a visible file directly
/// inside the store.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && is_visible(name)
        && !name.contains(is_separator)
        && !name.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_candidates_fit_name_limit() {
        let desired = format!("{}.mp4", "a".repeat(251));
        let names: Vec<String> = candidates(&desired).take(12).collect();

        assert_eq!(names[0], desired);
        assert_eq!(names[1], format!("{}(1).mp4", "a".repeat(248)));
        assert_eq!(names[11], format!("{}(11).mp4", "a".repeat(247)));
        assert!(names.iter().all(|n| n.len() <= MAX_NAME_BYTES));
    }

    #[test]
    fn test_candidates_truncate_on_char_boundary() {
        let desired = format!("{}.png", "é".repeat(126));
        let second = candidates(&desired).nth(1).unwrap();

        assert!(second.len() <= MAX_NAME_BYTES);
        assert!(second.ends_with("(1).png"));
        assert!(second.starts_with('é'));
    }

    #[test]
    fn test_candidates_short_names_untouched() {
        let names: Vec<String> = candidates("video.mp4").take(2).collect();
        assert_eq!(names, vec!["video.mp4", "video(1).mp4"]);
    }
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("video.mp4"), ("video", ".mp4"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name("..odd.txt"), ("..odd", ".txt"));
        assert_eq!(split_name("trailing."), ("trailing", "."));
        assert_eq!(split_name(""), ("", ""));
    }

    #[test]
    fn test_candidates_sequence() {
        let names: Vec<String> = candidates("video.mp4").take(4).collect();
        assert_eq!(
            names,
            vec!["video.mp4", "video(1).mp4", "video(2).mp4", "video(3).mp4"]
        );

        let names: Vec<String> = candidates("notes").take(2).collect();
        assert_eq!(names, vec!["notes", "notes(1)"]);
    }

    #[test]
    fn test_resolve_unused_name_unchanged() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve(dir.path(), "video.mp4"), "video.mp4");
    }

    #[test]
    fn test_resolve_appends_counter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("video.mp4"), b"a").unwrap();
        assert_eq!(resolve(dir.path(), "video.mp4"), "video(1).mp4");

        fs::write(dir.path().join("video(1).mp4"), b"b").unwrap();
        assert_eq!(resolve(dir.path(), "video.mp4"), "video(2).mp4");
    }

    #[test]
    fn test_resolve_fills_first_gap() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        fs::write(dir.path().join("a(2).txt"), b"").unwrap();
        assert_eq!(resolve(dir.path(), "a.txt"), "a(1).txt");
    }

    #[test]
    fn test_resolve_repeated_uploads_are_distinct() {
        let dir = TempDir::new().unwrap();
        let mut seen = HashSet::new();

        for _ in 0..10 {
            let name = resolve(dir.path(), "photo.png");
            fs::write(dir.path().join(&name), b"x").unwrap();
            assert!(seen.insert(name));
        }

        assert!(seen.contains("photo.png"));
        for n in 1..10 {
            assert!(seen.contains(&format!("photo({n}).png")));
        }
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cat.png"), "cat.png");
        assert_eq!(sanitize_filename("/abs/path/video.mp4"), "video.mp4");
    }

    #[test]
    fn test_sanitize_control_and_dots() {
        assert_eq!(sanitize_filename("bad\r\nname.txt"), "badname.txt");
        assert_eq!(sanitize_filename("  .hidden "), "hidden");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("dir/"), "");
        assert_eq!(sanitize_filename("日本語 ファイル.txt"), "日本語 ファイル.txt");
    }

    #[test]
    fn test_is_plain_name() {
        assert!(is_plain_name("video.mp4"));
        assert!(is_plain_name("my video(1).mp4"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("../secret"));
        assert!(!is_plain_name("a\\b"));
        assert!(!is_plain_name(".DS_Store"));
        assert!(!is_plain_name("a\nb"));
    }
}
