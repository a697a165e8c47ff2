//! # jtvzip
//!
//! Read TV schedules from JTV archives.
//!
//! A JTV archive is a zip holding one pair of members per channel: an
//! index (`<channel>.ndx`) of program start times and a text file
//! (`<channel>.pdt`) of program titles. This crate decodes every pair into
//! a single [`Schedule`] of (channel, title, start, end) entries, renaming
//! channels through a user-supplied alias table and inferring each
//! program's end from the next program on the same channel.
//!
//! Archives can be read from the local filesystem or straight from an
//! HTTP server with Range requests.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use jtvzip::{AliasTable, LocalFileReader, ScheduleBuilder, ZipArchive};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("tvprog.zip"))?);
//!     let archive = ZipArchive::open(reader).await?;
//!
//!     let aliases = AliasTable::load(Path::new("channel.alias.rc"))?;
//!     let schedule = ScheduleBuilder::new(aliases)
//!         .tz_correction(3)
//!         .build(&archive)
//!         .await?;
//!
//!     for entry in &schedule {
//!         println!("{} {} {}", entry.channel_name, entry.start_time, entry.end_time);
//!     }
//!     Ok(())
//! }
//! ```

pub mod alias;
pub mod archive;
pub mod charset;
pub mod cli;
pub mod error;
pub mod io;
pub mod record;
pub mod schedule;
pub mod time;
pub mod zip;

pub use alias::{AliasEntry, AliasTable};
pub use archive::{ArchiveReader, MemoryArchive, ZipArchive};
pub use charset::{CharsetConverter, EncodingConverter};
pub use cli::Cli;
pub use error::{JtvError, Result};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
pub use schedule::{Schedule, ScheduleBuilder, ScheduleEntry, SkipReason, SkippedPair, build};
pub use zip::{ZipExtractor, ZipFileEntry};
