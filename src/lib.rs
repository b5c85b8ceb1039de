//! bom-strip Library
//!
//! Detects byte-order marks and other encoding signatures at the start of
//! a file and writes the remaining bytes to a new file without them.
//!
//! # Features
//!
//! - **Signature table**: UTF-8, UTF-16, UTF-32, UTF-7, UTF-1, UTF-EBCDIC,
//!   SCSU, BOCU-1 and GB-18030, matched as exact byte sequences
//! - **Non-destructive**: The source file is never modified; output goes to
//!   `<stem>_nobom.<ext>` next to it
//! - **Blake3 verification**: Optional hash check of the written file
//!
//! # Example
//!
//! ```no_run
//! use bom_strip::{strip_file, Outcome, StripOptions};
//! use std::path::Path;
//!
//! fn main() -> bom_strip::Result<()> {
//!     match strip_file(Path::new("notes.txt"), &StripOptions::default())? {
//!         Outcome::Stripped { report, .. } => println!("Wrote {}", report.output.display()),
//!         _ => println!("Nothing to do"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod rewrite;
pub mod signatures;
pub mod strip;

// Re-export commonly used types
pub use config::Config;
pub use error::{BomError, Result};
pub use naming::{derive_output_path, NOBOM_SUFFIX};
pub use rewrite::{rewrite, RewriteReport, Rewriter};
pub use signatures::{classify, detect, Family, SignatureMatch, SIGNATURES};
pub use strip::{strip_file, Outcome, StripOptions};
