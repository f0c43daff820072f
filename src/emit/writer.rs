//! Writing rendered workflows to disk

use crate::core::{PipelineError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Write `text` to `path`, creating missing parent directories.
///
/// An existing file is overwritten. If writing fails after the file was
/// created, the partial file is removed.
pub fn write_to_file(text: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            debug!("Creating directory {}", parent.display());
            fs::create_dir_all(parent).map_err(|source| PipelineError::IoWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    write_through(text, path, SyncOnFlush)?;
    info!("Wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}

/// Create `path` and write `text` through the writer `wrap` builds around the
/// file. The file is removed again if writing or flushing fails.
fn write_through<W, F>(text: &str, path: &Path, wrap: F) -> Result<()>
where
    W: Write,
    F: FnOnce(File) -> W,
{
    let file = File::create(path).map_err(|source| PipelineError::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = wrap(file);
    let written = writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush());

    // Release the handle before any cleanup
    drop(writer);

    if let Err(source) = written {
        discard_partial(path);
        return Err(PipelineError::IoWrite {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// File writer whose flush reaches the disk
struct SyncOnFlush(File);

impl Write for SyncOnFlush {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.sync_all()
    }
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove partial file {}: {}", path.display(), e);
    }
}
