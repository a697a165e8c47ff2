//! ZIP container reading.
//!
//! JTV schedules are distributed as a zip of `.ndx`/`.pdt` members. This
//! module lists the members and reads them whole:
//!
//! - [`structures`]: End of Central Directory records and entry metadata
//! - [`parser`]: locating and parsing the central directory
//! - [`extractor`]: reading member data, inflating DEFLATE members
//!
//! Supported: single-disk archives, ZIP64, STORED and DEFLATE members.
//! Not supported: encryption, multi-disk archives, other compression methods.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
