//! Preview command handler

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use studio_preview::{Config, FileRecord, Preview, UploadSession};

/// Options of `spv preview`.
pub struct PreviewArgs {
    pub files: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub no_worker: bool,
    pub timeout: u64,
    pub json: bool,
}

/// Run an upload session over `args.files` and report the previews.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: PreviewArgs) -> Result<()> {
    let config = apply_overrides(Config::load()?, &args)?;
    let mut session = UploadSession::new(config);

    for path in &args.files {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
        let name = file_name(path);
        if session.add_file(&name, guess_mime(path), bytes).is_none() {
            eprintln!("Skipping {}: not an image", name);
        }
    }

    if session.is_empty() {
        bail!("No image files to preview");
    }

    let finished = session.wait_all(Duration::from_secs(args.timeout));

    if let Some(dir) = &args.out {
        write_previews(&session, dir)?;
    }

    if args.json {
        let records: Vec<&FileRecord> = session.files().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_table(&session);
    }

    if !finished {
        bail!("Timed out after {}s waiting for previews", args.timeout);
    }
    Ok(())
}

/// Fold command-line overrides into the loaded config.
pub(crate) fn apply_overrides(mut config: Config, args: &PreviewArgs) -> Result<Config> {
    if let Some(n) = args.concurrency {
        config = config.with_concurrency(n);
    }
    if args.no_worker {
        config = config.without_worker();
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
    Ok(config)
}

/// MIME type from the file extension; unknown extensions are not images.
pub(crate) fn guess_mime(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Short label for the kind of preview being shown.
pub(crate) fn preview_kind(preview: Option<&Preview>) -> &'static str {
    match preview {
        Some(Preview::Encoded(_)) => "downscaled",
        Some(Preview::Source(_)) => "original",
        Some(Preview::Remote(_)) => "remote",
        None => "pending",
    }
}

fn print_table(session: &UploadSession) {
    println!("{:<32} {:>10} {:>8}  {:<10} {:>10}", "FILE", "SIZE", "MB", "PREVIEW", "URL SIZE");
    for record in session.files() {
        let preview = session.preview(record.id).and_then(|p| p.display());
        let url_len = record.preview.as_ref().map_or(0, |p| p.len()) as u64;
        println!(
            "{:<32} {:>10} {:>8}  {:<10} {:>10}",
            super::truncate_string(&record.name, 32),
            humansize::format_size(record.size, humansize::BINARY),
            record.size_label(),
            preview_kind(preview),
            humansize::format_size(url_len, humansize::BINARY),
        );
    }
}

fn write_previews(session: &UploadSession, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    let records: Vec<&FileRecord> = session.files().collect();
    for (record, name) in records.iter().zip(output_names(&records)) {
        let Some(src) = &record.preview else {
            continue;
        };
        let path = dir.join(name);
        fs::write(&path, src).with_context(|| format!("Failed to write preview: {:?}", path))?;
    }
    Ok(())
}

/// Output file name per record: `<name>.txt`, or `<name>.<id>.txt` when
/// an earlier record already took that name.
pub(crate) fn output_names(records: &[&FileRecord]) -> Vec<String> {
    let mut taken = HashSet::new();
    records
        .iter()
        .map(|record| {
            let plain = format!("{}.txt", record.name);
            if taken.insert(plain.clone()) {
                plain
            } else {
                let unique = format!("{}.{}.txt", record.name, record.id);
                taken.insert(unique.clone());
                unique
            }
        })
        .collect()
}
