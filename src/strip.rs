//! Top-level strip operation: open, classify, rewrite.
//!
//! Walks `Start -> Classified -> Done`, stopping early at "no signature"
//! or on the first error. Nothing here decides process exit status.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{BomError, Result};
use crate::naming::NOBOM_SUFFIX;
use crate::rewrite::{Progress, RewriteReport, Rewriter};
use crate::signatures::{classify, read_prefix, SignatureMatch, PREFIX_LEN};

/// Options for a strip operation
#[derive(Debug, Clone)]
pub struct StripOptions {
    /// Marker inserted before the output file's extension
    pub suffix: String,
    /// Classify only, never write
    pub dry_run: bool,
    /// Re-read and hash-check the output after writing
    pub verify: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            suffix: NOBOM_SUFFIX.to_string(),
            dry_run: false,
            verify: false,
        }
    }
}

/// Where the strip state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Classified,
    Done,
}

/// Events emitted while stripping, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripEvent {
    /// First bytes of the file
    PrefixRead([u8; PREFIX_LEN]),
    /// A signature was recognised
    Detected(SignatureMatch),
    Rewrite(Progress),
}

/// Terminal state of a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing to do
    NoSignature {
        path: PathBuf,
        #[serde(serialize_with = "serialize_hex")]
        prefix: [u8; PREFIX_LEN],
    },
    /// Dry run: a signature is present but nothing was written
    Detected {
        path: PathBuf,
        signature: SignatureMatch,
        output: PathBuf,
    },
    Stripped {
        signature: SignatureMatch,
        report: RewriteReport,
    },
}

fn serialize_hex<S>(bytes: &[u8; PREFIX_LEN], s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&hex::encode(bytes))
}

/// Strip the encoding signature from `path`, if it has one
pub fn strip_file(path: &Path, options: &StripOptions) -> Result<Outcome> {
    strip_file_with_progress(path, options, |_| {})
}

/// Same as [`strip_file`], reporting each step to `events`
pub fn strip_file_with_progress<F>(
    path: &Path,
    options: &StripOptions,
    mut events: F,
) -> Result<Outcome>
where
    F: FnMut(StripEvent),
{
    let mut stage = Stage::Start;
    tracing::debug!(path = %path.display(), ?stage, "Opening");

    let mut file = File::open(path).map_err(|e| BomError::io("open", path, e))?;
    let prefix = read_prefix(&mut file, path)?;
    tracing::debug!(prefix = %hex::encode(prefix), "Read possible BOM bytes");
    events(StripEvent::PrefixRead(prefix));

    let Some(signature) = classify(&prefix) else {
        tracing::debug!(path = %path.display(), "No signature");
        return Ok(Outcome::NoSignature {
            path: path.to_path_buf(),
            prefix,
        });
    };

    stage = Stage::Classified;
    tracing::debug!(
        encoding = signature.name,
        len = signature.len,
        ?stage,
        "Signature detected"
    );
    events(StripEvent::Detected(signature));

    let rewriter = Rewriter::new(signature.len)
        .suffix(options.suffix.as_str())
        .verify(options.verify);

    if options.dry_run {
        return Ok(Outcome::Detected {
            path: path.to_path_buf(),
            signature,
            output: rewriter.output_path(path),
        });
    }

    let report =
        rewriter.rewrite_file_with_progress(&mut file, path, |p| events(StripEvent::Rewrite(p)))?;

    stage = Stage::Done;
    tracing::debug!(output = %report.output.display(), ?stage, "Finished");

    Ok(Outcome::Stripped { signature, report })
}
