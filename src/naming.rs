//! Output file naming.
//!
//! The suffix goes in front of the last `.` of the file name, or nowhere
//! if the name has no dot at all.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Default marker inserted before the extension
pub const NOBOM_SUFFIX: &str = "_nobom";

/// Derive the output path for `path`.
///
/// Only the final component is rewritten: `dir.d/foo.txt` becomes
/// `dir.d/foo_nobom.txt`, `a.b.c` becomes `a.b_nobom.c`, and `foo`
/// stays `foo`. Callers must treat the last case as a naming conflict.
pub fn derive_output_path(path: &Path, suffix: &str) -> PathBuf {
    match path.file_name().and_then(|name| insert_suffix(name, suffix)) {
        Some(new_name) => path.with_file_name(new_name),
        None => path.to_path_buf(),
    }
}

/// Split on the raw bytes so non-UTF-8 names follow the same rule
#[cfg(unix)]
fn insert_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = name.as_bytes();
    let dot = bytes.iter().rposition(|&b| b == b'.')?;

    let mut out = Vec::with_capacity(bytes.len() + suffix.len());
    out.extend_from_slice(&bytes[..dot]);
    out.extend_from_slice(suffix.as_bytes());
    out.extend_from_slice(&bytes[dot..]);
    Some(OsString::from_vec(out))
}

#[cfg(not(unix))]
fn insert_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    match name.to_str() {
        Some(name) => {
            let dot = name.rfind('.')?;
            Some(format!("{}{}{}", &name[..dot], suffix, &name[dot..]).into())
        }
        // Unpaired surrogates: fall back to std's stem/extension split
        None => {
            let path = Path::new(name);
            let mut out = path.file_stem()?.to_os_string();
            out.push(suffix);
            out.push(".");
            out.push(path.extension()?);
            Some(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(p: &str) -> PathBuf {
        derive_output_path(Path::new(p), NOBOM_SUFFIX)
    }

    #[test]
    fn test_inserts_before_extension() {
        assert_eq!(derive("foo.txt"), PathBuf::from("foo_nobom.txt"));
    }

    #[test]
    fn test_last_dot_only() {
        assert_eq!(derive("a.b.c"), PathBuf::from("a.b_nobom.c"));
    }

    #[test]
    fn test_no_extension_is_unchanged() {
        assert_eq!(derive("foo"), PathBuf::from("foo"));
        assert_eq!(derive("dir/foo"), PathBuf::from("dir/foo"));
    }

    #[test]
    fn test_directory_dots_are_ignored() {
        assert_eq!(derive("dir.d/foo.txt"), PathBuf::from("dir.d/foo_nobom.txt"));
        assert_eq!(derive("./v1.2/README"), PathBuf::from("./v1.2/README"));
    }

    #[test]
    fn test_edge_dots() {
        assert_eq!(derive(".bashrc"), PathBuf::from("_nobom.bashrc"));
        assert_eq!(derive("foo."), PathBuf::from("foo_nobom."));
    }

    #[test]
    fn test_custom_suffix() {
        assert_eq!(
            derive_output_path(Path::new("notes.md"), ".clean"),
            PathBuf::from("notes.clean.md")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"caf\xe9.txt"));
        let out = derive_output_path(path, NOBOM_SUFFIX);
        assert_eq!(out.as_os_str().as_bytes(), b"caf\xe9_nobom.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_leading_dot() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b".caf\xe9"));
        let out = derive_output_path(path, NOBOM_SUFFIX);
        assert_eq!(out.as_os_str().as_bytes(), b"_nobom.caf\xe9");

        let dotless = Path::new(OsStr::from_bytes(b"caf\xe9"));
        assert_eq!(derive_output_path(dotless, NOBOM_SUFFIX), dotless);
    }
}
