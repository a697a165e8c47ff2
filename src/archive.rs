//! Archive access for the schedule builder.
//!
//! The builder only needs to list members and read them whole, so it talks
//! to archives through [`ArchiveReader`]. Member names are raw bytes: JTV
//! archives store them in a DOS codepage, not UTF-8.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::io::ReadAt;
use crate::zip::{ZipExtractor, ZipFileEntry};

/// Read-only view of an archive's members.
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// Names of all members, in archive order.
    async fn list_members(&self) -> Result<Vec<Vec<u8>>>;

    /// Contents of a member, or `None` if there is no such member.
    async fn read_member(&self, name: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Whether a member with this exact name exists.
    async fn member_exists(&self, name: &[u8]) -> Result<bool>;
}

/// [`ArchiveReader`] over a zip file from any [`ReadAt`] source.
///
/// The central directory is read once on [`open`](ZipArchive::open).
pub struct ZipArchive<R: ReadAt> {
    extractor: ZipExtractor<R>,
    entries: Vec<ZipFileEntry>,
}

impl<R: ReadAt> ZipArchive<R> {
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let extractor = ZipExtractor::new(reader);
        let entries = extractor.list_files().await?;
        Ok(Self { extractor, entries })
    }

    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    fn find(&self, name: &[u8]) -> Option<&ZipFileEntry> {
        self.entries
            .iter()
            .find(|e| !e.is_directory && e.raw_name == name)
    }
}

#[async_trait]
impl<R: ReadAt + 'static> ArchiveReader for ZipArchive<R> {
    async fn list_members(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.raw_name.clone())
            .collect())
    }

    async fn read_member(&self, name: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.find(name) {
            Some(entry) => Ok(Some(self.extractor.extract_to_memory(entry).await?)),
            None => Ok(None),
        }
    }

    async fn member_exists(&self, name: &[u8]) -> Result<bool> {
        Ok(self.find(name).is_some())
    }
}

/// [`ArchiveReader`] over members held in memory, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    members: Vec<(Vec<u8>, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    pub fn insert(&mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> &mut Self {
        let (name, data) = (name.into(), data.into());
        match self.members.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.members.push((name, data)),
        }
        self
    }

    pub fn with(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }
}

#[async_trait]
impl ArchiveReader for MemoryArchive {
    async fn list_members(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.members.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn read_member(&self, name: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.get(name).map(<[u8]>::to_vec))
    }

    async fn member_exists(&self, name: &[u8]) -> Result<bool> {
        Ok(self.get(name).is_some())
    }
}
