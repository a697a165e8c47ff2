//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::Crc;
use flate2::write::DeflateEncoder;
use std::io::Write;

use jtvzip::record::encode_channel;
use jtvzip::time::unix_to_filetime;

/// Minimal zip writer: STORED or DEFLATE members, optional archive comment.
#[derive(Default)]
pub struct ZipBuilder {
    members: Vec<Member>,
    comment: Vec<u8>,
}

struct Member {
    name: Vec<u8>,
    data: Vec<u8>,
    deflate: bool,
    crc_override: Option<u32>,
    flags: u16,
    size_override: Option<u32>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.members.push(Member {
            name: name.into(),
            data: data.into(),
            deflate: false,
            crc_override: None,
            flags: 0,
            size_override: None,
        });
        self
    }

    pub fn deflated(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.members.push(Member {
            name: name.into(),
            data: data.into(),
            deflate: true,
            crc_override: None,
            flags: 0,
            size_override: None,
        });
        self
    }

    /// Store a member with a wrong CRC-32.
    pub fn damaged(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.members.push(Member {
            name: name.into(),
            data: data.into(),
            deflate: false,
            crc_override: Some(0xDEAD_BEEF),
            flags: 0,
            size_override: None,
        });
        self
    }

    /// Store a member flagged as encrypted; the data itself is left plain.
    pub fn encrypted(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.members.push(Member {
            name: name.into(),
            data: data.into(),
            deflate: false,
            crc_override: None,
            flags: 0x0001,
            size_override: None,
        });
        self
    }

    /// Store a member whose central directory claims `compressed_size` bytes.
    pub fn oversized(
        mut self,
        name: impl Into<Vec<u8>>,
        data: impl Into<Vec<u8>>,
        compressed_size: u32,
    ) -> Self {
        self.members.push(Member {
            name: name.into(),
            data: data.into(),
            deflate: false,
            crc_override: None,
            flags: 0,
            size_override: Some(compressed_size),
        });
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for member in &self.members {
            let mut crc = Crc::new();
            crc.update(&member.data);
            let crc = member.crc_override.unwrap_or(crc.sum());

            let (method, payload) = if member.deflate {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&member.data).unwrap();
                (8u16, encoder.finish().unwrap())
            } else {
                (0u16, member.data.clone())
            };

            let lfh_offset = out.len() as u32;
            out.extend_from_slice(b"PK\x03\x04");
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(member.flags).unwrap();
            out.write_u16::<LittleEndian>(method).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap(); // time + date
            out.write_u32::<LittleEndian>(crc).unwrap();
            out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(member.data.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(member.name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.extend_from_slice(&member.name);
            out.extend_from_slice(&payload);

            central.extend_from_slice(b"PK\x01\x02");
            central.write_u16::<LittleEndian>(20).unwrap();
            central.write_u16::<LittleEndian>(20).unwrap();
            central.write_u16::<LittleEndian>(member.flags).unwrap();
            central.write_u16::<LittleEndian>(method).unwrap();
            central.write_u32::<LittleEndian>(0).unwrap(); // time + date
            central.write_u32::<LittleEndian>(crc).unwrap();
            let compressed_size = member.size_override.unwrap_or(payload.len() as u32);
            central.write_u32::<LittleEndian>(compressed_size).unwrap();
            central.write_u32::<LittleEndian>(member.data.len() as u32).unwrap();
            central.write_u16::<LittleEndian>(member.name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap(); // extra
            central.write_u16::<LittleEndian>(0).unwrap(); // comment
            central.write_u16::<LittleEndian>(0).unwrap(); // disk
            central.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
            central.write_u32::<LittleEndian>(0).unwrap(); // external attrs
            central.write_u32::<LittleEndian>(lfh_offset).unwrap();
            central.extend_from_slice(&member.name);
        }

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.members.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(self.members.len() as u16).unwrap();
        out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.extend_from_slice(&self.comment);
        out
    }
}

/// Encode one channel's programs given as (unix seconds, title).
pub fn channel(programs: &[(i64, &str)]) -> (Vec<u8>, Vec<u8>) {
    let programs: Vec<(u64, &[u8])> = programs
        .iter()
        .map(|(secs, title)| (unix_to_filetime(*secs).unwrap(), title.as_bytes()))
        .collect();
    encode_channel(&programs, b"JTV 3.x TV Program Data\n\n\n").unwrap()
}
