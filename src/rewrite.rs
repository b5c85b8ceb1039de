//! File rewriter - copies everything after the signature into a new file.
//!
//! The payload is buffered in memory in one piece, then written out under
//! the derived name. The source file is only ever read.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{BomError, Result};
use crate::naming::{derive_output_path, NOBOM_SUFFIX};

/// Progress updates emitted while rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// About to reserve the payload buffer
    Allocating { bytes: u64 },
    /// Buffer reserved
    Allocated,
    /// Payload read, about to create the output file
    Writing { path: PathBuf },
    /// Output file fully written
    Written { bytes: u64 },
}

/// Summary of a completed rewrite
#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub signature_len: usize,
    pub original_size: u64,
    pub payload_size: u64,
    /// blake3 of the payload, hex encoded
    pub blake3: String,
    /// Whether the output was re-read and checked against the payload
    pub verified: bool,
}

/// Strips a known-length signature from a file into a sibling file
#[derive(Debug, Clone)]
pub struct Rewriter {
    signature_len: usize,
    suffix: String,
    verify: bool,
}

impl Rewriter {
    pub fn new(signature_len: usize) -> Self {
        Self {
            signature_len,
            suffix: NOBOM_SUFFIX.to_string(),
            verify: false,
        }
    }

    /// Marker inserted before the extension of the output name
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Re-read the output and compare its blake3 with the payload
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        derive_output_path(input, &self.suffix)
    }

    /// Rewrite from an already-open reader
    pub fn rewrite_file<R: Read + Seek>(&self, reader: &mut R, input: &Path) -> Result<RewriteReport> {
        self.rewrite_file_with_progress(reader, input, |_| {})
    }

    /// Rewrite from an already-open reader, reporting each step to `progress`
    pub fn rewrite_file_with_progress<R, F>(
        &self,
        reader: &mut R,
        input: &Path,
        mut progress: F,
    ) -> Result<RewriteReport>
    where
        R: Read + Seek,
        F: FnMut(Progress),
    {
        let output = self.output_path(input);
        // A link at the output name would truncate the source on create
        if output == input || same_file::is_same_file(input, &output).unwrap_or(false) {
            return Err(BomError::NamingConflict {
                path: input.to_path_buf(),
            });
        }

        let original_size = reader
            .seek(SeekFrom::End(0))
            .map_err(|e| BomError::io("seek", input, e))?;

        // File may have shrunk since the prefix was classified
        let payload_size = original_size
            .checked_sub(self.signature_len as u64)
            .ok_or_else(|| BomError::CorruptState {
                path: input.to_path_buf(),
                total: original_size,
                signature_len: self.signature_len,
            })?;

        reader
            .seek(SeekFrom::Start(self.signature_len as u64))
            .map_err(|e| BomError::io("seek", input, e))?;

        progress(Progress::Allocating {
            bytes: payload_size,
        });
        let mut buffer = allocate(payload_size)?;
        progress(Progress::Allocated);

        fill(reader, &mut buffer, input)?;
        let digest = blake3::hash(&buffer);

        progress(Progress::Writing {
            path: output.clone(),
        });
        write_payload(&output, &buffer)?;
        progress(Progress::Written {
            bytes: payload_size,
        });

        if self.verify {
            verify_output(&output, &digest)?;
        }

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            stripped = self.signature_len,
            bytes = payload_size,
            "Signature removed"
        );

        Ok(RewriteReport {
            input: input.to_path_buf(),
            output,
            signature_len: self.signature_len,
            original_size,
            payload_size,
            blake3: digest.to_hex().to_string(),
            verified: self.verify,
        })
    }
}

/// Strip `signature_len` bytes from `input_path` into a new file and
/// return the new file's path.
pub fn rewrite(input_path: &Path, signature_len: usize) -> Result<PathBuf> {
    let mut file = File::open(input_path).map_err(|e| BomError::io("open", input_path, e))?;
    Rewriter::new(signature_len)
        .rewrite_file(&mut file, input_path)
        .map(|report| report.output)
}

/// Read exactly `payload_size` bytes from the current position of `reader`
pub fn read_payload<R: Read>(reader: &mut R, payload_size: u64, path: &Path) -> Result<Vec<u8>> {
    let mut buffer = allocate(payload_size)?;
    fill(reader, &mut buffer, path)?;
    Ok(buffer)
}

/// Create (or truncate) `path` and write `data` into it in full.
///
/// A file left half-written by a failed write is removed before the error
/// is returned.
pub fn write_payload(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| BomError::io("open for writing", path, e))?;

    if let Err(e) = file.write_all(data).and_then(|()| file.flush()) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %cleanup,
                "Could not remove partially written file"
            );
        }
        return Err(BomError::io("write", path, e));
    }

    Ok(())
}

fn allocate(payload_size: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(payload_size).map_err(|_| BomError::AllocationFailure {
        bytes: payload_size,
    })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| BomError::AllocationFailure {
            bytes: payload_size,
        })?;
    buffer.resize(len, 0);
    Ok(buffer)
}

fn fill<R: Read>(reader: &mut R, buffer: &mut [u8], path: &Path) -> Result<()> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => {
                return Err(BomError::TruncatedInput {
                    path: path.to_path_buf(),
                    expected: buffer.len() as u64,
                    actual: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(BomError::io("read", path, e)),
        }
    }
    Ok(())
}

fn verify_output(path: &Path, expected: &blake3::Hash) -> Result<()> {
    let mut file = File::open(path).map_err(|e| BomError::io("open", path, e))?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).map_err(|e| BomError::io("read", path, e))?;

    if hasher.finalize() != *expected {
        return Err(BomError::VerificationFailed {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), "Output verified");
    Ok(())
}
