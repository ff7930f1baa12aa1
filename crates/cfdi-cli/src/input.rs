//! Input collection: files, directories, glob patterns and zip archives.

use std::fs::File;
use std::path::{Path, PathBuf};

use glob::glob;
use tempfile::TempDir;
use tracing::{debug, warn};

/// XML documents to dispatch, in order. Archive contents live in a
/// temporary directory removed when this value is dropped.
pub struct Inputs {
    pub files: Vec<PathBuf>,
    _scratch: Option<TempDir>,
}

/// Expand every input argument into the XML files to dispatch.
///
/// Arguments keep their order. Directories and glob patterns expand to
/// their `.xml` and `.zip` files sorted by path; archives expand to their
/// `.xml` entries. Explicit files with any other extension are ignored.
pub fn collect(inputs: &[String]) -> anyhow::Result<Inputs> {
    let mut scratch: Option<TempDir> = None;
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        let expanded = if path.is_file() {
            if is_input(path) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            }
        } else if path.is_dir() {
            let pattern = format!("{}/**/*", glob::Pattern::escape(input));
            expand(&pattern)?
        } else {
            expand(input)?
        };

        if expanded.is_empty() {
            warn!("No XML or zip files matched {}", input);
        }

        for file in expanded {
            if has_extension(&file, "zip") {
                if scratch.is_none() {
                    scratch = Some(tempfile::tempdir()?);
                }
                let root = scratch.as_ref().map(|d| d.path().to_path_buf()).unwrap_or_default();
                let dest = archive_dir(&root, &file, files.len());
                let entries = unzip(&file, &dest)?;
                debug!("Extracted {} entries from {}", entries.len(), file.display());
                files.extend(entries.into_iter().filter(|p| has_extension(p, "xml")));
            } else {
                files.push(file);
            }
        }
    }

    Ok(Inputs {
        files,
        _scratch: scratch,
    })
}

/// Extract `archive` into `dest` and return the regular files produced,
/// sorted by path.
pub fn unzip(archive: &Path, dest: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    zip.extract(dest)?;

    let mut files = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        if let Some(name) = entry.enclosed_name() {
            files.push(dest.join(name));
        }
    }

    files.sort();
    Ok(files)
}

fn expand(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_input(p))
        .collect();
    files.sort();
    Ok(files)
}

/// One subdirectory per archive so equal entry names never collide.
fn archive_dir(root: &Path, archive: &Path, index: usize) -> PathBuf {
    let stem = archive
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("archive");
    root.join(format!("{:04}-{}", index, stem))
}

fn is_input(path: &Path) -> bool {
    has_extension(path, "xml") || has_extension(path, "zip")
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
