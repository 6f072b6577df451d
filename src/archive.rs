//! Batch conversion of Markdown archives.
//!
//! Takes a zip archive (e.g. a Notion export), extracts it into a temporary
//! directory, recursively unpacks nested archives, converts every Markdown
//! file it finds, and repackages the produced `.docx` files into a single
//! output archive. One failing file never fails the batch.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::markdown::MarkdownConverter;

/// Outcome of a batch conversion.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Output file names that were produced and packaged
    pub converted: Vec<String>,

    /// Source files that failed to convert, with the reason
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of successfully converted files.
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    /// Number of files that failed to convert.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Check if every discovered file converted.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A single file that failed to convert.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Source file name within the archive
    pub file: String,

    /// Failure description
    pub reason: String,
}

/// Convert every Markdown file in `input_zip` and write the produced `.docx`
/// files into `output_zip`.
///
/// Each Markdown file resolves images against its own directory. Returns an
/// error only for document-independent failures: an unreadable archive, an
/// archive with no Markdown files, or an unwritable output.
pub fn convert_archive(input_zip: &Path, output_zip: &Path) -> Result<BatchReport> {
    let file = fs::File::open(input_zip)?;
    let mut archive = ZipArchive::new(file)?;

    // Dropped on every exit path.
    let workdir = tempfile::tempdir()?;
    archive.extract(workdir.path())?;

    extract_nested_archives(workdir.path());

    let mut md_files = Vec::new();
    find_files_with_extension(workdir.path(), "md", &mut md_files);
    md_files.sort();
    if md_files.is_empty() {
        return Err(Error::NoMarkdownFiles);
    }
    log::info!("found {} markdown files in archive", md_files.len());

    let outdir = tempfile::tempdir()?;
    let mut report = BatchReport::default();

    for md_file in &md_files {
        let stem = md_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let docx_name = format!("{}.docx", stem);
        let out_path = outdir.path().join(&docx_name);

        let converter = MarkdownConverter::new();
        match converter.convert_file(md_file, &out_path) {
            Ok(()) => {
                log::debug!("converted {}", md_file.display());
                report.converted.push(docx_name);
            }
            Err(e) => {
                log::warn!("failed to convert {}: {}", md_file.display(), e);
                report.failed.push(BatchFailure {
                    file: md_file
                        .strip_prefix(workdir.path())
                        .unwrap_or(md_file)
                        .display()
                        .to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    write_output_archive(outdir.path(), &report.converted, output_zip)?;
    log::info!(
        "batch complete: {} converted, {} failed",
        report.converted_count(),
        report.failed_count()
    );
    Ok(report)
}

/// Extract nested zip archives next to themselves, each into a directory
/// named after the archive. Nested archives that fail to open are skipped.
fn extract_nested_archives(dir: &Path) {
    let mut nested = Vec::new();
    find_files_with_extension(dir, "zip", &mut nested);

    for zip_path in nested {
        let target = zip_path.with_extension("");
        let result = fs::File::open(&zip_path)
            .map_err(Error::from)
            .and_then(|f| ZipArchive::new(f).map_err(Error::from))
            .and_then(|mut a| a.extract(&target).map_err(Error::from));
        match result {
            Ok(()) => log::debug!("extracted nested archive {}", zip_path.display()),
            Err(e) => log::warn!(
                "failed to extract nested archive {}: {}",
                zip_path.display(),
                e
            ),
        }
    }
}

/// Recursively collect files whose extension matches (case-insensitive).
fn find_files_with_extension(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            find_files_with_extension(&path, extension, out);
        } else if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        {
            out.push(path);
        }
    }
}

/// Zip the produced files into the output archive.
fn write_output_archive(dir: &Path, names: &[String], output: &Path) -> Result<()> {
    let file = fs::File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in names {
        writer.start_file(name.clone(), options)?;
        let data = fs::read(dir.join(name))?;
        writer.write_all(&data)?;
    }
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_files_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), "# a").unwrap();
        fs::write(dir.path().join("sub/b.MD"), "# b").unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();

        let mut found = Vec::new();
        find_files_with_extension(dir.path(), "md", &mut found);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_archive(
            &dir.path().join("missing.zip"),
            &dir.path().join("out.zip"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_invalid_archive_is_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.zip");
        fs::write(&bad, b"this is not a zip file").unwrap();

        let err = convert_archive(&bad, &dir.path().join("out.zip")).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }
}
