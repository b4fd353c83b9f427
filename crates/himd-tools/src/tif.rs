use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use flate2::read::GzDecoder;
use unicode_width::UnicodeWidthStr;

use himd::{ParseError, TifImage, TrackInfo};

/// Read an image from a path or stdin ('-'), transparently decompressing
/// gzip input (detected by `.gz` extension or the gzip magic bytes).
pub fn read_tif_as_vec(path: &Path) -> Result<Vec<u8>> {
    let data = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?
    };

    let is_gzip = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
        || data.starts_with(&[0x1f, 0x8b]);

    if is_gzip {
        let mut decoder = GzDecoder::new(Cursor::new(data));
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .context("gzip decompression failed")?;
        Ok(out)
    } else {
        Ok(data)
    }
}

fn open_image(path: &Path, bytes: Vec<u8>) -> Result<TifImage> {
    TifImage::new(bytes).with_context(|| format!("not a track index image: {}", path.display()))
}

/// Pad a &str to a target display width (columns) using unicode-width to
/// account for fullwidth characters (e.g. Japanese titles).
fn pad_to_width(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn format_string_field(field: Option<Result<String, ParseError>>) -> String {
    match field {
        None => String::new(),
        Some(Ok(s)) => s,
        Some(Err(e)) => format!("<{}>", e),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Print summary information for an image.
pub fn info(path: &Path, bytes: Vec<u8>, limit: usize) -> Result<()> {
    let image = open_image(path, bytes)?;

    let mut present = 0usize;
    let mut missing = 0usize;
    let mut uploadable = 0usize;
    let mut seconds = 0u64;
    let mut codecs: BTreeMap<String, usize> = BTreeMap::new();
    for (_, track) in image.tracks() {
        match track {
            Ok(t) => {
                present += 1;
                seconds += u64::from(t.seconds);
                if image.is_uploadable_with_limit(&t, limit) {
                    uploadable += 1;
                }
                *codecs.entry(t.codec_name().trim().to_string()).or_default() += 1;
            }
            Err(_) => missing += 1,
        }
    }

    let codec_summary = if codecs.is_empty() {
        "(none)".to_string()
    } else {
        codecs
            .iter()
            .map(|(name, count)| format!("{}:{}", name, count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let rows: Vec<(&str, String)> = vec![
        ("file", path.display().to_string()),
        ("image_size", format!("{} (0x{:X})", image.len(), image.len())),
        ("track_count", image.track_count().to_string()),
        ("tracks_present", present.to_string()),
        ("tracks_unreadable", missing.to_string()),
        ("tracks_uploadable", uploadable.to_string()),
        (
            "total_duration",
            format!("{} ({} s)", format_duration(seconds), seconds),
        ),
        ("codecs", codec_summary),
    ];

    let width = rows
        .iter()
        .map(|(k, _)| UnicodeWidthStr::width(*k))
        .max()
        .unwrap_or(0);
    for (k, v) in rows {
        println!("{}  {}", pad_to_width(k, width), v);
    }
    Ok(())
}

fn track_row(image: &TifImage, position: u16, track: &TrackInfo, limit: usize) -> Vec<Cell> {
    let strings = image.track_strings(track);
    let blocks = match image.total_blocks_with_limit(track, limit) {
        Ok(n) => n.to_string(),
        Err(e) => format!("<{}>", e),
    };
    vec![
        Cell::new(position + 1).set_alignment(CellAlignment::Right),
        Cell::new(track.index).set_alignment(CellAlignment::Right),
        Cell::new(track.track_number).set_alignment(CellAlignment::Right),
        Cell::new(format_string_field(strings.title)),
        Cell::new(format_string_field(strings.artist)),
        Cell::new(format_string_field(strings.album)),
        Cell::new(track.codec_name()),
        Cell::new(format_duration(u64::from(track.seconds))).set_alignment(CellAlignment::Right),
        Cell::new(blocks).set_alignment(CellAlignment::Right),
        Cell::new(if image.is_uploadable_with_limit(track, limit) {
            "yes"
        } else {
            "no"
        }),
    ]
}

/// Print every slot of the slot map as a table.
pub fn tracks(path: &Path, bytes: Vec<u8>, limit: usize) -> Result<()> {
    let image = open_image(path, bytes)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#", "Record", "No", "Title", "Artist", "Album", "Codec", "Time", "Blocks", "Upload",
    ]);

    for (position, track) in image.tracks() {
        match track {
            Ok(t) => {
                table.add_row(track_row(&image, position, &t, limit));
            }
            Err(e) => {
                tracing::debug!(position, error = %e, "skipping slot");
                table.add_row(vec![
                    Cell::new(position + 1).set_alignment(CellAlignment::Right),
                    Cell::new(image.track_slot(position).map(|i| i.to_string()).unwrap_or_default()),
                    Cell::new(""),
                    Cell::new(format!("<{}>", e)),
                ]);
            }
        }
    }
    println!("{}", table);
    Ok(())
}

/// Decode and print one string record.
pub fn string(path: &Path, bytes: Vec<u8>, index: u16, raw: bool) -> Result<()> {
    let image = open_image(path, bytes)?;

    if raw {
        let s = image
            .decode_string_raw(index)
            .with_context(|| format!("string {}", index))?;
        println!("type: {} ({:?})", s.kind, s.category());
        println!("chunks: {}", s.chunk_count());
        for (i, chunk) in s.bytes.chunks(himd::tif::STRING_PAYLOAD_LEN).enumerate() {
            println!("{:4}: {}", i, hex(chunk));
        }
    } else {
        let s = image
            .decode_string(index)
            .with_context(|| format!("string {}", index))?;
        println!("type: {} ({:?})", s.kind, s.category());
        println!("encoding: {}", s.encoding);
        println!("{}", s.text);
    }
    Ok(())
}

/// Print the fragment chain of one track record.
pub fn fragments(path: &Path, bytes: Vec<u8>, track: u16, limit: usize) -> Result<()> {
    let image = open_image(path, bytes)?;
    let info = image
        .decode_track(track)
        .with_context(|| format!("track record {}", track))?;

    println!(
        "track {}: {} key={} ekb=0x{:08X}",
        info.index,
        info.codec_name(),
        hex(&info.key),
        info.ekb_num
    );
    match info.frames_per_block() {
        Some(frames) => println!("frame size {} bytes, {} frames/block", info.frame_size(), frames),
        None => println!("frame size variable (not block aligned)"),
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Fragment", "Type", "Blocks", "Frames", "Count", "Key", "Next",
    ]);
    for fragment in image.walk_fragments(info.first_fragment).with_step_limit(limit) {
        let f = fragment.with_context(|| format!("fragment chain of track {}", track))?;
        table.add_row(vec![
            Cell::new(f.index),
            Cell::new(f.fragment_type),
            Cell::new(format!("{}..={}", f.first_block, f.last_block)),
            Cell::new(format!("{}..={}", f.first_frame, f.last_frame)),
            Cell::new(
                f.block_count()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "invalid".into()),
            ),
            Cell::new(hex(&f.key)),
            Cell::new(f.next),
        ]);
    }
    println!("{}", table);
    Ok(())
}
