//! Encoding signature database and classifier.
//!
//! Every known signature is a fixed byte sequence of 2, 3 or 4 bytes that
//! must appear at offset 0. Classification looks at a 4-byte prefix and
//! picks the longest entry it starts with, so `FF FE 00 00` is UTF-32LE
//! rather than UTF-16LE followed by two NULs.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{BomError, Result};

/// Number of bytes inspected at the start of a file
pub const PREFIX_LEN: usize = 4;

/// Encoding family a signature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Utf8,
    Utf16,
    Utf32,
    Utf7,
    Utf1,
    UtfEbcdic,
    Scsu,
    Bocu1,
    Gb18030,
}

impl Family {
    /// All families, in table order
    pub const ALL: [Family; 9] = [
        Family::Utf8,
        Family::Utf16,
        Family::Utf32,
        Family::Utf7,
        Family::Utf1,
        Family::UtfEbcdic,
        Family::Scsu,
        Family::Bocu1,
        Family::Gb18030,
    ];

    /// Signature length in bytes for this family
    pub fn signature_len(&self) -> usize {
        match self {
            Family::Utf16 => 2,
            Family::Utf8 | Family::Utf1 | Family::Scsu | Family::Bocu1 => 3,
            Family::Utf32 | Family::Utf7 | Family::UtfEbcdic | Family::Gb18030 => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Utf8 => "UTF-8",
            Family::Utf16 => "UTF-16",
            Family::Utf32 => "UTF-32",
            Family::Utf7 => "UTF-7",
            Family::Utf1 => "UTF-1",
            Family::UtfEbcdic => "UTF-EBCDIC",
            Family::Scsu => "SCSU",
            Family::Bocu1 => "BOCU-1",
            Family::Gb18030 => "GB-18030",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single signature table entry
#[derive(Debug, Clone, Copy)]
pub struct EncodingSignature {
    pub family: Family,
    /// Concrete variant, e.g. "UTF-16LE"
    pub name: &'static str,
    /// Exact bytes at offset 0
    pub bytes: &'static [u8],
}

impl EncodingSignature {
    /// Whether `prefix` starts with this signature
    pub fn matches(&self, prefix: &[u8]) -> bool {
        prefix.starts_with(self.bytes)
    }
}

/// Known signatures, grouped by family in lookup order
pub static SIGNATURES: &[EncodingSignature] = &[
    EncodingSignature {
        family: Family::Utf8,
        name: "UTF-8",
        bytes: &[0xEF, 0xBB, 0xBF],
    },
    EncodingSignature {
        family: Family::Utf16,
        name: "UTF-16BE",
        bytes: &[0xFE, 0xFF],
    },
    EncodingSignature {
        family: Family::Utf16,
        name: "UTF-16LE",
        bytes: &[0xFF, 0xFE],
    },
    EncodingSignature {
        family: Family::Utf32,
        name: "UTF-32BE",
        bytes: &[0x00, 0x00, 0xFE, 0xFF],
    },
    EncodingSignature {
        family: Family::Utf32,
        name: "UTF-32LE",
        bytes: &[0xFF, 0xFE, 0x00, 0x00],
    },
    EncodingSignature {
        family: Family::Utf7,
        name: "UTF-7 (+/v8)",
        bytes: b"+/v8",
    },
    EncodingSignature {
        family: Family::Utf7,
        name: "UTF-7 (+/v9)",
        bytes: b"+/v9",
    },
    EncodingSignature {
        family: Family::Utf7,
        name: "UTF-7 (+/v+)",
        bytes: b"+/v+",
    },
    EncodingSignature {
        family: Family::Utf7,
        name: "UTF-7 (+/v/)",
        bytes: b"+/v/",
    },
    EncodingSignature {
        family: Family::Utf1,
        name: "UTF-1",
        bytes: &[0xF7, 0x64, 0x4C],
    },
    EncodingSignature {
        family: Family::UtfEbcdic,
        name: "UTF-EBCDIC",
        bytes: &[0xDD, 0x73, 0x66, 0x73],
    },
    EncodingSignature {
        family: Family::Scsu,
        name: "SCSU",
        bytes: &[0x0E, 0xFE, 0xFF],
    },
    EncodingSignature {
        family: Family::Bocu1,
        name: "BOCU-1",
        bytes: &[0xFB, 0xEE, 0x28],
    },
    EncodingSignature {
        family: Family::Gb18030,
        name: "GB-18030",
        bytes: &[0x84, 0x31, 0x95, 0x33],
    },
];

/// Result of a successful classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignatureMatch {
    pub family: Family,
    pub name: &'static str,
    /// Number of bytes to strip
    pub len: usize,
}

impl From<&EncodingSignature> for SignatureMatch {
    fn from(sig: &EncodingSignature) -> Self {
        Self {
            family: sig.family,
            name: sig.name,
            len: sig.bytes.len(),
        }
    }
}

/// Classify a 4-byte file prefix.
///
/// Returns the longest matching table entry; entries of equal length are
/// byte-disjoint so table order only matters for reproducibility.
pub fn classify(prefix: &[u8; PREFIX_LEN]) -> Option<SignatureMatch> {
    let mut best: Option<&EncodingSignature> = None;
    for sig in SIGNATURES {
        if sig.matches(prefix) && best.map_or(true, |b| sig.bytes.len() > b.bytes.len()) {
            best = Some(sig);
        }
    }
    best.map(SignatureMatch::from)
}

/// Classify the start of an in-memory buffer
pub fn detect(data: &[u8]) -> Result<Option<SignatureMatch>> {
    let prefix: &[u8; PREFIX_LEN] = data
        .get(..PREFIX_LEN)
        .and_then(|p| p.try_into().ok())
        .ok_or_else(|| BomError::TruncatedInput {
            path: PathBuf::from("<buffer>"),
            expected: PREFIX_LEN as u64,
            actual: data.len() as u64,
        })?;
    Ok(classify(prefix))
}

/// Read the 4-byte prefix from the current position of `reader`.
///
/// Short reads are retried until the prefix is complete; end-of-file
/// before that is [`BomError::TruncatedInput`].
pub fn read_prefix<R: Read>(reader: &mut R, path: &Path) -> Result<[u8; PREFIX_LEN]> {
    let mut prefix = [0u8; PREFIX_LEN];
    let mut filled = 0;

    while filled < PREFIX_LEN {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => {
                return Err(BomError::TruncatedInput {
                    path: path.to_path_buf(),
                    expected: PREFIX_LEN as u64,
                    actual: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(BomError::io("read", path, e)),
        }
    }

    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_bytes(bytes: [u8; 4]) -> Option<(Family, usize)> {
        classify(&bytes).map(|m| (m.family, m.len))
    }

    #[test]
    fn test_every_entry_classifies_to_itself() {
        for sig in SIGNATURES {
            let mut prefix = [0x41u8; PREFIX_LEN];
            prefix[..sig.bytes.len()].copy_from_slice(sig.bytes);
            let m = classify(&prefix).unwrap();
            assert_eq!(m.name, sig.name, "prefix {:02X?}", prefix);
            assert_eq!(m.len, sig.family.signature_len());
        }
    }

    #[test]
    fn test_table_lengths_match_family() {
        for sig in SIGNATURES {
            assert_eq!(sig.bytes.len(), sig.family.signature_len(), "{}", sig.name);
            assert!((2..=4).contains(&sig.bytes.len()));
        }
    }

    #[test]
    fn test_every_family_has_an_entry() {
        for family in Family::ALL {
            assert!(SIGNATURES.iter().any(|s| s.family == family), "{family}");
        }
    }

    #[test]
    fn test_common_boms() {
        assert_eq!(classify_bytes([0xEF, 0xBB, 0xBF, b'h']), Some((Family::Utf8, 3)));
        assert_eq!(classify_bytes([0xFE, 0xFF, 0x00, b'h']), Some((Family::Utf16, 2)));
        assert_eq!(classify_bytes([0xFF, 0xFE, b'h', 0x00]), Some((Family::Utf16, 2)));
        assert_eq!(classify_bytes([0x00, 0x00, 0xFE, 0xFF]), Some((Family::Utf32, 4)));
        assert_eq!(classify_bytes(*b"+/v8"), Some((Family::Utf7, 4)));
        assert_eq!(classify_bytes(*b"+/v/"), Some((Family::Utf7, 4)));
        assert_eq!(classify_bytes([0x84, 0x31, 0x95, 0x33]), Some((Family::Gb18030, 4)));
    }

    #[test]
    fn test_utf32le_wins_over_utf16le() {
        let m = classify(&[0xFF, 0xFE, 0x00, 0x00]).unwrap();
        assert_eq!(m.family, Family::Utf32);
        assert_eq!(m.name, "UTF-32LE");
        assert_eq!(m.len, 4);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(classify(b"abcd"), None);
        assert_eq!(classify(&[0xEF, 0xBB, 0x00, 0x00]), None);
        assert_eq!(classify(b"+/v7"), None);
        // UTF-16 bytes at offset 2 are not a signature
        assert_eq!(classify(&[b'h', b'i', 0xFE, 0xFF]), None);
        assert_eq!(classify(&[0x00, 0x00, 0xFF, 0xFE]), None);
    }

    #[test]
    fn test_detect_short_buffer() {
        let err = detect(&[0xEF, 0xBB, 0xBF]).unwrap_err();
        assert!(matches!(
            err,
            BomError::TruncatedInput {
                expected: 4,
                actual: 3,
                ..
            }
        ));
        assert_eq!(detect(b"text").unwrap(), None);
    }

    #[test]
    fn test_read_prefix_loops_on_short_reads() {
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let prefix = read_prefix(&mut Trickle(&[0xEF, 0xBB, 0xBF, 0x41, 0x42]), Path::new("t"))
            .unwrap();
        assert_eq!(prefix, [0xEF, 0xBB, 0xBF, 0x41]);

        let err = read_prefix(&mut Trickle(&[0xFF]), Path::new("t")).unwrap_err();
        assert!(matches!(err, BomError::TruncatedInput { actual: 1, .. }));
    }
}
