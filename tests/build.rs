mod common;

use std::path::Path;
use std::sync::Arc;

use common::{ZipBuilder, channel};
use jtvzip::record::NDX_HEADER_SIZE;
use jtvzip::{
    AliasTable, ArchiveReader, JtvError, LocalFileReader, MemoryReader, ScheduleBuilder,
    SkipReason, ZipArchive, build,
};

// 2024-03-01T06:00:00Z and onwards
const T0: i64 = 1_709_272_800;

fn write_archive(dir: &Path, name: &str, bytes: Vec<u8>) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn builds_schedule_from_zip_file() {
    let (ntv_ndx, ntv_pdt) = channel(&[(T0, "Morning"), (T0 + 3600, "News"), (T0 + 5400, "Film")]);
    let (rtr_ndx, rtr_pdt) = channel(&[(T0, "Weather"), (T0 + 600, "Sport")]);
    let zip = ZipBuilder::new()
        .deflated("NTV.ndx", ntv_ndx)
        .deflated("NTV.pdt", ntv_pdt)
        .stored("rtr.ndx", rtr_ndx)
        .stored("rtr.pdt", rtr_pdt)
        .finish();

    let dir = tempfile::tempdir().unwrap();
    let zip_path = write_archive(dir.path(), "tvprog.zip", zip);
    let alias_path = dir.path().join("channel.alias.rc");
    std::fs::write(&alias_path, "cp_content = CP1251\nRTR = Russia 1\nntv = NTV\n").unwrap();

    let reader = Arc::new(LocalFileReader::new(&zip_path).unwrap());
    let archive = ZipArchive::open(reader).await.unwrap();
    let schedule = build(&archive, Some(&alias_path), 0).await.unwrap();

    assert!(schedule.skipped().is_empty());
    assert_eq!(schedule.channels(), vec!["NTV", "Russia 1"]);

    let summary: Vec<_> = schedule
        .iter()
        .map(|e| (e.channel_index, e.start_time, e.end_time))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some(1), T0, T0 + 3599),
            (Some(1), T0 + 3600, T0 + 5399),
            (Some(1), T0 + 5400, T0 + 5401),
            (Some(0), T0, T0 + 599),
            (Some(0), T0 + 600, T0 + 601),
        ]
    );
    assert_eq!(schedule.entries()[1].program_title, b"News");
}

#[tokio::test]
async fn entry_count_follows_index_length() {
    let (mut ndx, pdt) = channel(&[(T0, "a"), (T0 + 60, "b"), (T0 + 120, "c")]);
    ndx.extend_from_slice(&[1, 2, 3, 4, 5]);
    let expected = (ndx.len() - NDX_HEADER_SIZE) / 16;

    let zip = ZipBuilder::new().stored("x.ndx", ndx).stored("x.pdt", pdt).finish();
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();
    let schedule = build(&archive, None, 0).await.unwrap();

    assert_eq!(expected, 3);
    assert_eq!(schedule.len(), expected);
}

#[tokio::test]
async fn bad_pairs_do_not_stop_the_build() {
    let (good_ndx, good_pdt) = channel(&[(T0, "Kept"), (T0 + 60, "Also kept")]);
    let (mut bad_ndx, bad_pdt) = channel(&[(T0, "Lost")]);
    // Point the only record far past the text data.
    bad_ndx[NDX_HEADER_SIZE + 8..NDX_HEADER_SIZE + 16].copy_from_slice(&1_000_000u64.to_le_bytes());
    let (orphan_ndx, _) = channel(&[(T0, "Orphan")]);
    let (crc_ndx, crc_pdt) = channel(&[(T0, "Damaged")]);

    let zip = ZipBuilder::new()
        .stored("bad.ndx", bad_ndx)
        .stored("bad.pdt", bad_pdt)
        .stored("orphan.ndx", orphan_ndx)
        .damaged("crc.ndx", crc_ndx)
        .stored("crc.pdt", crc_pdt)
        .deflated("good.ndx", good_ndx)
        .deflated("good.pdt", good_pdt)
        .comment(b"daily schedule")
        .finish();
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();

    let schedule = ScheduleBuilder::new(AliasTable::default())
        .build(&archive)
        .await
        .unwrap();

    assert_eq!(schedule.len(), 2);
    assert!(schedule.iter().all(|e| e.channel_name == "good"));

    let reasons: Vec<_> = schedule
        .skipped()
        .iter()
        .map(|s| (s.index_member_lossy(), &s.reason))
        .collect();
    assert_eq!(reasons.len(), 3);
    assert_eq!(reasons[0].0, "bad.ndx");
    assert!(matches!(reasons[0].1, SkipReason::Decode(JtvError::CorruptRecord { .. })));
    assert_eq!(reasons[1].0, "orphan.ndx");
    assert!(matches!(reasons[1].1, SkipReason::MissingCompanion));
    assert_eq!(reasons[2].0, "crc.ndx");
    assert!(matches!(reasons[2].1, SkipReason::ReadFailed(_)));
}

#[tokio::test]
async fn empty_members_are_skipped() {
    let (ndx, _) = channel(&[(T0, "x")]);
    let zip = ZipBuilder::new()
        .stored("a.ndx", ndx)
        .stored("a.pdt", Vec::<u8>::new())
        .finish();
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();

    let schedule = build(&archive, None, 0).await.unwrap();
    assert!(schedule.is_empty());
    assert!(matches!(schedule.skipped()[0].reason, SkipReason::EmptyMember));
}

#[tokio::test]
async fn zip_archive_reader_capabilities() {
    let zip = ZipBuilder::new()
        .stored("dir/", Vec::<u8>::new())
        .deflated("dir/a.pdt", b"hello hello hello".to_vec())
        .finish();
    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();

    assert_eq!(archive.list_members().await.unwrap(), vec![b"dir/a.pdt".to_vec()]);
    assert!(archive.member_exists(b"dir/a.pdt").await.unwrap());
    assert!(!archive.member_exists(b"dir/").await.unwrap());
    assert_eq!(
        archive.read_member(b"dir/a.pdt").await.unwrap(),
        Some(b"hello hello hello".to_vec())
    );
    assert_eq!(archive.read_member(b"missing").await.unwrap(), None);
}

#[tokio::test]
async fn not_a_zip_is_fatal() {
    let result = ZipArchive::open(Arc::new(MemoryReader::new(b"definitely not a zip file".to_vec()))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn encrypted_members_skip_only_their_pair() {
    let (good_ndx, good_pdt) = channel(&[(T0, "Open")]);
    let (locked_ndx, locked_pdt) = channel(&[(T0, "Locked")]);
    let zip = ZipBuilder::new()
        .encrypted("readme.txt", b"secret".to_vec())
        .encrypted("locked.ndx", locked_ndx)
        .stored("locked.pdt", locked_pdt)
        .stored("open.ndx", good_ndx)
        .stored("open.pdt", good_pdt)
        .finish();

    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();
    assert!(archive.member_exists(b"readme.txt").await.unwrap());
    assert!(archive.read_member(b"readme.txt").await.is_err());

    let schedule = build(&archive, None, 0).await.unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule.entries()[0].program_title, b"Open");
    assert_eq!(schedule.skipped().len(), 1);
    assert_eq!(schedule.skipped()[0].index_member_lossy(), "locked.ndx");
    assert!(matches!(schedule.skipped()[0].reason, SkipReason::ReadFailed(_)));
}

#[tokio::test]
async fn member_size_past_archive_end_is_rejected() {
    let (good_ndx, good_pdt) = channel(&[(T0, "Fine")]);
    let (huge_ndx, huge_pdt) = channel(&[(T0, "Huge")]);
    let zip = ZipBuilder::new()
        .oversized("huge.ndx", huge_ndx, 0xFFFF_FFF0)
        .stored("huge.pdt", huge_pdt)
        .stored("fine.ndx", good_ndx)
        .stored("fine.pdt", good_pdt)
        .finish();

    let archive = ZipArchive::open(Arc::new(MemoryReader::new(zip))).await.unwrap();
    let err = archive.read_member(b"huge.ndx").await.unwrap_err();
    assert!(format!("{err:#}").contains("past the end of the archive"));

    let schedule = build(&archive, None, 0).await.unwrap();
    assert_eq!(schedule.channels(), vec!["fine"]);
    assert_eq!(schedule.skipped()[0].index_member_lossy(), "huge.ndx");
    assert!(matches!(schedule.skipped()[0].reason, SkipReason::ReadFailed(_)));
}
