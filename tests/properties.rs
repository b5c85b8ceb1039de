//! Property tests for classification, naming and the strip round trip

use std::fs;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::tempdir;

use bom_strip::{classify, derive_output_path, strip_file, Outcome, StripOptions, NOBOM_SUFFIX, SIGNATURES};

fn any_signature() -> impl Strategy<Value = &'static [u8]> {
    (0..SIGNATURES.len()).prop_map(|i| SIGNATURES[i].bytes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn classify_matches_iff_some_entry_prefixes(prefix in any::<[u8; 4]>()) {
        let expected = SIGNATURES
            .iter()
            .filter(|s| prefix.starts_with(s.bytes))
            .map(|s| s.bytes.len())
            .max();
        prop_assert_eq!(classify(&prefix).map(|m| m.len), expected);
    }

    #[test]
    fn strip_round_trip(sig in any_signature(), body in proptest::collection::vec(any::<u8>(), 2..2048)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.dat");
        let mut content = sig.to_vec();
        content.extend_from_slice(&body);
        fs::write(&path, &content).unwrap();

        let outcome = strip_file(&path, &StripOptions::default()).unwrap();
        let Outcome::Stripped { signature, report } = outcome else {
            return Err(TestCaseError::fail("signature not detected"));
        };

        // Longest match may swallow body bytes (FF FE + 00 00 is UTF-32LE)
        let written = fs::read(&report.output).unwrap();
        prop_assert!(signature.len >= sig.len());
        prop_assert_eq!(report.original_size, content.len() as u64);
        prop_assert_eq!(written.len(), content.len() - signature.len);
        prop_assert_eq!(&written[..], &content[signature.len..]);
        prop_assert_eq!(fs::read(&path).unwrap(), content);
    }

    #[test]
    fn second_strip_finds_nothing(sig in any_signature(), tail in proptest::collection::vec(any::<u8>(), 3..512)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("twice.txt");
        let mut content = sig.to_vec();
        content.push(b'a');
        content.extend_from_slice(&tail);
        fs::write(&path, &content).unwrap();

        let Outcome::Stripped { report, .. } = strip_file(&path, &StripOptions::default()).unwrap() else {
            return Err(TestCaseError::fail("signature not detected"));
        };

        let again = strip_file(&report.output, &StripOptions::default()).unwrap();
        let again_has_no_signature = matches!(again, Outcome::NoSignature { .. });
        prop_assert!(again_has_no_signature);
        prop_assert!(!dir.path().join("twice_nobom_nobom.txt").exists());
    }

    #[test]
    fn suffix_goes_before_last_dot(stem in "[a-z0-9][a-z0-9.]{0,11}", ext in "[a-z0-9]{0,5}") {
        let name = format!("{stem}.{ext}");
        let out = derive_output_path(Path::new(&name), NOBOM_SUFFIX);
        prop_assert_eq!(out, PathBuf::from(format!("{stem}{NOBOM_SUFFIX}.{ext}")));
    }

    #[test]
    fn dotless_name_is_unchanged(name in "[a-zA-Z0-9_-]{1,16}") {
        let path = Path::new("some.dir").join(&name);
        prop_assert_eq!(derive_output_path(&path, NOBOM_SUFFIX), path);
    }
}
