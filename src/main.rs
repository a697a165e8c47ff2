//! Command-line viewer for JTV schedule archives.
//!
//! Reads a local or remote (HTTP Range) archive, builds the schedule and
//! prints it channel by channel with a date line whenever the day changes.

use anyhow::{Context, Result, bail};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use jtvzip::charset::decode_lossy;
use jtvzip::{
    AliasTable, Cli, EncodingConverter, HttpRangeReader, LocalFileReader, ReadAt, Schedule,
    ScheduleBuilder, ZipArchive,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let aliases = load_aliases(&cli)?;
    let formats = Formats::new(&cli.date_format, &cli.time_format)?;

    let schedule = if cli.is_http_url() {
        let reader = Arc::new(HttpRangeReader::new(cli.file.clone()).await?);
        let schedule = load_schedule(reader.clone(), aliases, &cli).await?;
        info!(bytes = reader.transferred_bytes(), "remote archive read");
        schedule
    } else {
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.file))?);
        load_schedule(reader, aliases, &cli).await?
    };

    if cli.show_skipped {
        for skipped in schedule.skipped() {
            eprintln!("skipped {}: {}", skipped.index_member_lossy(), skipped.reason);
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.list_channels {
        list_channels(&mut out, &schedule, &cli)?;
    } else {
        print_schedule(&mut out, &schedule, &cli, &formats)?;
    }
    out.flush()?;

    Ok(())
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the alias table named on the command line, or the default one if present.
fn load_aliases(cli: &Cli) -> Result<AliasTable> {
    let (path, explicit) = cli.alias_path();
    let path = Path::new(path);

    let table = if explicit || path.exists() {
        AliasTable::load(path)?
    } else {
        debug!(path = %path.display(), "no alias file, channels keep archive names");
        AliasTable::default()
    };

    Ok(table.with_codepages(cli.cp_zip_fn.as_deref(), cli.cp_content.as_deref()))
}

async fn load_schedule<R: ReadAt + 'static>(
    reader: Arc<R>,
    aliases: AliasTable,
    cli: &Cli,
) -> Result<Schedule> {
    let archive = ZipArchive::open(reader)
        .await
        .with_context(|| format!("Cannot read archive {}", cli.file))?;

    let schedule = ScheduleBuilder::new(aliases)
        .tz_correction(cli.tz_correction)
        .build(&archive)
        .await?;

    info!(
        programs = schedule.len(),
        channels = schedule.channels().len(),
        skipped = schedule.skipped().len(),
        "schedule loaded"
    );
    Ok(schedule)
}

/// Validated strftime formats.
struct Formats<'a> {
    date: Vec<Item<'a>>,
    time: Vec<Item<'a>>,
}

impl<'a> Formats<'a> {
    fn new(date: &'a str, time: &'a str) -> Result<Self> {
        Ok(Self {
            date: parse_format(date)?,
            time: parse_format(time)?,
        })
    }
}

fn parse_format(fmt: &str) -> Result<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        bail!("Invalid date/time format: {}", fmt);
    }
    Ok(items)
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).with_context(|| format!("Time {} out of range", secs))
}

fn print_schedule(out: &mut impl Write, schedule: &Schedule, cli: &Cli, formats: &Formats<'_>) -> Result<()> {
    let converter = EncodingConverter;
    let mut current_channel: Option<&str> = None;
    let mut current_day: Option<NaiveDate> = None;

    for entry in schedule.iter().filter(|e| cli.wants_channel(&e.channel_name)) {
        if current_channel != Some(entry.channel_name.as_str()) {
            writeln!(out, "Channel {} :", entry.channel_name)?;
            current_channel = Some(entry.channel_name.as_str());
            current_day = None;
        }

        let start = timestamp(entry.start_time)?;
        if current_day != Some(start.date_naive()) {
            writeln!(out, "{}", start.format_with_items(formats.date.iter()))?;
            current_day = Some(start.date_naive());
        }

        let title = decode_lossy(&converter, schedule.content_codepage(), &entry.program_title);
        if cli.show_end {
            let end = timestamp(entry.end_time)?;
            writeln!(
                out,
                "{} - {} {}",
                start.format_with_items(formats.time.iter()),
                end.format_with_items(formats.time.iter()),
                title
            )?;
        } else {
            writeln!(out, "{} {}", start.format_with_items(formats.time.iter()), title)?;
        }
    }

    Ok(())
}

fn list_channels(out: &mut impl Write, schedule: &Schedule, cli: &Cli) -> Result<()> {
    for name in schedule.channels().into_iter().filter(|n| cli.wants_channel(n)) {
        writeln!(out, "{}\t{}", name, schedule.for_channel(name).count())?;
    }
    Ok(())
}
