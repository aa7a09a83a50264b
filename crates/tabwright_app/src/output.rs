use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use engine_logging::engine_info;
use tabwright_engine::AtomicFileWriter;

const FILE_STAMP: &str = "%Y%m%d-%H%M%S";
const HEADER_STAMP: &str = "%Y-%m-%d %H:%M:%S";

/// One point in time, formatted for file names and document headers.
#[derive(Debug, Clone)]
pub struct Stamp {
    pub file: String,
    pub header: String,
}

impl Stamp {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    fn at(time: DateTime<Local>) -> Self {
        Self {
            file: time.format(FILE_STAMP).to_string(),
            header: time.format(HEADER_STAMP).to_string(),
        }
    }
}

/// Writes `{prefix}-{stamp}.md` into `dir` and logs where it went.
pub fn write_document(
    dir: &Path,
    prefix: &str,
    stamp: &Stamp,
    content: &str,
) -> anyhow::Result<PathBuf> {
    let filename = format!("{prefix}-{}.md", stamp.file);
    let path = AtomicFileWriter::new(dir.to_path_buf())
        .write(&filename, content)
        .with_context(|| format!("could not write {filename} to {}", dir.display()))?;
    engine_info!("Wrote {}", path.display());
    Ok(path)
}

pub fn read_input(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("could not read {what} {}", path.display()))
}
