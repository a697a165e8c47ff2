//! `.ndx` / `.pdt` record decoding.
//!
//! ## Layout
//!
//! All integers are little-endian and unpadded.
//!
//! Index file (`.ndx`):
//!
//! | Offset | Size | Field                                    |
//! |--------|------|------------------------------------------|
//! | 0      | 8    | header, record count in the low 4 bytes  |
//! | 8 + 16n| 8    | FILETIME start of program `n`            |
//! | 16 + 16n| 8   | seek into the text file (low 32 bits)    |
//!
//! Text file (`.pdt`), at every seek offset:
//!
//! | Size | Field                   |
//! |------|-------------------------|
//! | 2    | title length `N`        |
//! | N    | title bytes, no NUL     |
//!
//! The header count is not trusted; the number of records is derived from
//! the index length and a trailing partial record is ignored.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{JtvError, Result};
use crate::schedule::ScheduleEntry;
use crate::time::filetime_to_unix;

/// Size of the `.ndx` header.
pub const NDX_HEADER_SIZE: usize = 8;

/// Size of one `.ndx` record.
pub const NDX_RECORD_SIZE: usize = 16;

/// Size of the `.pdt` title length prefix.
pub const PDT_LENGTH_SIZE: usize = 2;

/// A raw index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdxRecord {
    pub filetime: u64,
    pub seek: u32,
}

/// Number of whole records in an index buffer.
pub fn record_count(ndx: &[u8]) -> usize {
    ndx.len().saturating_sub(NDX_HEADER_SIZE) / NDX_RECORD_SIZE
}

/// Iterate over the whole records of an index buffer.
pub fn ndx_records(ndx: &[u8]) -> impl Iterator<Item = NdxRecord> + '_ {
    ndx.get(NDX_HEADER_SIZE..)
        .unwrap_or_default()
        .chunks_exact(NDX_RECORD_SIZE)
        .map(|chunk| NdxRecord {
            filetime: LittleEndian::read_u64(&chunk[..8]),
            // Stored as 64 bits but only the low half is meaningful.
            seek: LittleEndian::read_u64(&chunk[8..]) as u32,
        })
}

/// Read the length-prefixed title at `seek` in a text buffer.
pub fn read_title(pdt: &[u8], seek: u32) -> Result<&[u8]> {
    let start = seek as usize;
    let prefix = pdt
        .get(start..start + PDT_LENGTH_SIZE)
        .ok_or_else(|| JtvError::CorruptRecord {
            offset: start,
            reason: format!("seek offset past end of text data ({} bytes)", pdt.len()),
        })?;
    let len = u16::from_le_bytes([prefix[0], prefix[1]]) as usize;

    let body = start + PDT_LENGTH_SIZE;
    pdt.get(body..body + len)
        .ok_or_else(|| JtvError::CorruptRecord {
            offset: start,
            reason: format!(
                "title of {len} bytes runs past end of text data ({} bytes)",
                pdt.len()
            ),
        })
}

/// Decode one channel's index and text buffers into schedule entries.
///
/// One entry is produced per whole index record, in index order. Each
/// entry's end time is provisionally `start + 1`. Any bad seek offset,
/// title length or timestamp fails the whole channel.
pub fn decode(
    channel_name: &str,
    ndx: &[u8],
    pdt: &[u8],
    channel_index: Option<usize>,
    tz_correction: i32,
) -> Result<Vec<ScheduleEntry>> {
    let mut entries = Vec::with_capacity(record_count(ndx));

    for record in ndx_records(ndx) {
        let start_time = filetime_to_unix(record.filetime, tz_correction)?;
        let title = read_title(pdt, record.seek)?;
        entries.push(ScheduleEntry {
            channel_name: channel_name.to_string(),
            channel_index,
            program_title: title.to_vec(),
            start_time,
            end_time: start_time + 1,
        });
    }

    Ok(entries)
}

/// Encode `(filetime, title)` programs into `.ndx` and `.pdt` buffers.
///
/// Titles are written back to back into the text buffer after `pdt_prefix`,
/// which lets callers reproduce a text-file banner.
pub fn encode_channel(programs: &[(u64, &[u8])], pdt_prefix: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut ndx = Vec::with_capacity(NDX_HEADER_SIZE + programs.len() * NDX_RECORD_SIZE);
    let mut pdt = pdt_prefix.to_vec();

    let count = u32::try_from(programs.len()).map_err(|_| JtvError::CorruptRecord {
        offset: 0,
        reason: "too many programs for one index".into(),
    })?;
    ndx.write_u32::<LittleEndian>(count)?;
    ndx.write_u32::<LittleEndian>(0)?;

    for (filetime, title) in programs {
        let seek = u32::try_from(pdt.len()).map_err(|_| JtvError::CorruptRecord {
            offset: pdt.len(),
            reason: "text data exceeds 4 GiB".into(),
        })?;
        let len = u16::try_from(title.len()).map_err(|_| JtvError::CorruptRecord {
            offset: pdt.len(),
            reason: format!("title of {} bytes is too long", title.len()),
        })?;

        ndx.write_u64::<LittleEndian>(*filetime)?;
        ndx.write_u64::<LittleEndian>(seek as u64)?;
        pdt.write_u16::<LittleEndian>(len)?;
        pdt.extend_from_slice(title);
    }

    Ok((ndx, pdt))
}
