//! Schedule assembly.
//!
//! [`ScheduleBuilder`] walks an archive one `.ndx`/`.pdt` pair at a time,
//! resolves the channel through the alias table, decodes the pair and
//! appends its programs. Once every pair is in, end times are inferred from
//! the next program on the same channel.
//!
//! A pair that is missing a member, is empty, cannot be read or fails to
//! decode is recorded in [`Schedule::skipped`] and the walk continues. Only
//! an unreadable alias file or archive directory aborts the build.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::alias::AliasTable;
use crate::archive::ArchiveReader;
use crate::charset::{CharsetConverter, EncodingConverter};
use crate::error::{JtvError, Result};
use crate::record;

/// Suffix of index members.
pub const NDX_SUFFIX: &[u8] = b".ndx";

/// Suffix of program text members.
pub const PDT_SUFFIX: &[u8] = b".pdt";

/// One program on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Display name after alias resolution.
    pub channel_name: String,
    /// Position in the alias table, `None` for unaliased channels.
    pub channel_index: Option<usize>,
    /// Title bytes in the archive's content codepage.
    pub program_title: Vec<u8>,
    /// Unix seconds, timezone correction applied.
    pub start_time: i64,
    /// Unix seconds; `start_time + 1` until the next program is known.
    pub end_time: i64,
}

impl ScheduleEntry {
    fn same_channel(&self, other: &ScheduleEntry) -> bool {
        self.channel_index == other.channel_index && self.channel_name == other.channel_name
    }
}

/// Why a member pair contributed nothing.
#[derive(Debug)]
pub enum SkipReason {
    /// The `.pdt` companion of an `.ndx` member is absent.
    MissingCompanion,
    /// One of the two members has no data.
    EmptyMember,
    /// The archive could not produce a member's data.
    ReadFailed(anyhow::Error),
    /// The records did not decode.
    Decode(JtvError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCompanion => f.write_str("missing .pdt companion"),
            SkipReason::EmptyMember => f.write_str("empty member"),
            SkipReason::ReadFailed(e) => write!(f, "read failed: {e:#}"),
            SkipReason::Decode(e) => write!(f, "decode failed: {e}"),
        }
    }
}

/// A member pair left out of the schedule.
#[derive(Debug)]
pub struct SkippedPair {
    /// Raw name of the `.ndx` member.
    pub index_member: Vec<u8>,
    pub reason: SkipReason,
}

impl SkippedPair {
    pub fn index_member_lossy(&self) -> String {
        String::from_utf8_lossy(&self.index_member).into_owned()
    }
}

/// All programs decoded from one archive.
#[derive(Debug, Default)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
    skipped: Vec<SkippedPair>,
    content_codepage: String,
}

impl Schedule {
    /// Wrap already decoded entries; end times are left as they are.
    pub fn from_entries(entries: Vec<ScheduleEntry>, content_codepage: &str) -> Self {
        Self {
            entries,
            skipped: Vec::new(),
            content_codepage: content_codepage.to_string(),
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ScheduleEntry> {
        self.entries
    }

    pub fn skipped(&self) -> &[SkippedPair] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    /// Codepage of [`ScheduleEntry::program_title`].
    pub fn content_codepage(&self) -> &str {
        &self.content_codepage
    }

    /// Distinct channel names in schedule order.
    pub fn channels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.channel_name.as_str()) {
                names.push(&entry.channel_name);
            }
        }
        names
    }

    /// Programs of one channel, matched by display name ignoring case.
    pub fn for_channel(&self, name: &str) -> impl Iterator<Item = &ScheduleEntry> + '_ {
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.channel_name.to_lowercase() == wanted)
    }

    /// Make every channel one contiguous run in ascending start time.
    ///
    /// Channels keep the order of their first appearance. A channel split
    /// over several pairs (one file per day, or member names differing only
    /// in case that resolve to the same alias) is merged into a single run.
    /// The sort is stable, so programs sharing a start time keep their
    /// archive order.
    pub fn group_by_channel(&mut self) {
        let keys: Vec<(usize, i64)> = {
            let mut rank: HashMap<(Option<usize>, &str), usize> = HashMap::new();
            let keys = self
                .entries
                .iter()
                .map(|e| {
                    let next = rank.len();
                    let channel = *rank
                        .entry((e.channel_index, e.channel_name.as_str()))
                        .or_insert(next);
                    (channel, e.start_time)
                })
                .collect();
            keys
        };

        let mut keyed: Vec<_> = keys
            .into_iter()
            .zip(std::mem::take(&mut self.entries))
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        self.entries = keyed.into_iter().map(|(_, entry)| entry).collect();
    }

    /// Close each program at the start of the next one on its channel.
    ///
    /// For every adjacent pair on the same channel the earlier end time
    /// becomes the later start time minus one second. Two neighbours belong
    /// to the same channel only when both the alias index and the display
    /// name match, so unaliased channels (index `None`) are never linked to
    /// each other unless their names are equal. The last program of a
    /// channel run keeps its provisional end time. Entries are neither
    /// moved nor removed; call [`Schedule::group_by_channel`] first when
    /// runs may be split or unordered.
    pub fn infer_end_times(&mut self) {
        for i in 1..self.entries.len() {
            let (done, rest) = self.entries.split_at_mut(i);
            let (prev, next) = (&mut done[i - 1], &rest[0]);
            if prev.same_channel(next) {
                prev.end_time = next.start_time - 1;
            }
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a [`Schedule`] from an archive.
pub struct ScheduleBuilder {
    aliases: AliasTable,
    tz_correction: i32,
    converter: Box<dyn CharsetConverter>,
}

impl ScheduleBuilder {
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            tz_correction: 0,
            converter: Box::new(EncodingConverter),
        }
    }

    /// Hours added to every start time.
    pub fn tz_correction(mut self, hours: i32) -> Self {
        self.tz_correction = hours;
        self
    }

    /// Converter used to turn member filenames into channel keys.
    pub fn converter(mut self, converter: impl CharsetConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Walk `archive` and decode every complete member pair.
    ///
    /// Fails only when the member list cannot be read.
    pub async fn build<A: ArchiveReader + ?Sized>(&self, archive: &A) -> Result<Schedule> {
        let members = archive.list_members().await.map_err(JtvError::Archive)?;

        let mut schedule = Schedule {
            content_codepage: self.aliases.content_codepage().to_string(),
            ..Default::default()
        };

        for ndx_name in members.iter().filter(|name| name.ends_with(NDX_SUFFIX)) {
            match self.load_pair(archive, ndx_name).await {
                Ok(entries) => schedule.entries.extend(entries),
                Err(reason) => {
                    warn!(
                        member = %String::from_utf8_lossy(ndx_name),
                        %reason,
                        "skipping channel"
                    );
                    schedule.skipped.push(SkippedPair {
                        index_member: ndx_name.clone(),
                        reason,
                    });
                }
            }
        }

        schedule.group_by_channel();
        schedule.infer_end_times();
        debug!(
            programs = schedule.len(),
            skipped = schedule.skipped.len(),
            "schedule built"
        );
        Ok(schedule)
    }

    /// Read and decode one pair, or say why it was skipped.
    async fn load_pair<A: ArchiveReader + ?Sized>(
        &self,
        archive: &A,
        ndx_name: &[u8],
    ) -> std::result::Result<Vec<ScheduleEntry>, SkipReason> {
        let stem = &ndx_name[..ndx_name.len() - NDX_SUFFIX.len()];
        let pdt_name = [stem, PDT_SUFFIX].concat();

        let exists = archive
            .member_exists(&pdt_name)
            .await
            .map_err(SkipReason::ReadFailed)?;
        if !exists {
            return Err(SkipReason::MissingCompanion);
        }

        let ndx = read_member(archive, ndx_name).await?;
        if ndx.is_empty() {
            return Err(SkipReason::EmptyMember);
        }
        let pdt = read_member(archive, &pdt_name).await?;
        if pdt.is_empty() {
            return Err(SkipReason::EmptyMember);
        }

        let key = self.channel_key(stem);
        let resolved = self.aliases.lookup(&key);
        debug!(
            key = %key,
            channel = resolved.display_name,
            index = ?resolved.index,
            records = record::record_count(&ndx),
            "decoding channel"
        );

        record::decode(
            resolved.display_name,
            &ndx,
            &pdt,
            resolved.index,
            self.tz_correction,
        )
        .map_err(SkipReason::Decode)
    }

    /// Channel key of a member stem: directories dropped, filename codepage decoded.
    fn channel_key(&self, stem: &[u8]) -> String {
        let base = match stem.iter().rposition(|&b| b == b'/') {
            Some(slash) => &stem[slash + 1..],
            None => stem,
        };
        let codepage = self.aliases.filename_codepage();
        self.converter.decode(codepage, base).unwrap_or_else(|e| {
            debug!(error = %e, "falling back to lossy member name");
            String::from_utf8_lossy(base).into_owned()
        })
    }
}

async fn read_member<A: ArchiveReader + ?Sized>(
    archive: &A,
    name: &[u8],
) -> std::result::Result<Vec<u8>, SkipReason> {
    match archive.read_member(name).await {
        Ok(Some(data)) => Ok(data),
        Ok(None) => Err(SkipReason::MissingCompanion),
        Err(e) => Err(SkipReason::ReadFailed(e)),
    }
}

/// Load the alias table and build the schedule of `archive` in one call.
///
/// With `alias_source` set to `None` every channel keeps its archive name.
pub async fn build<A: ArchiveReader + ?Sized>(
    archive: &A,
    alias_source: Option<&Path>,
    tz_correction: i32,
) -> Result<Schedule> {
    let aliases = match alias_source {
        Some(path) => AliasTable::load(path)?,
        None => AliasTable::default(),
    };
    ScheduleBuilder::new(aliases)
        .tz_correction(tz_correction)
        .build(archive)
        .await
}
