use std::fs;
use std::io;
use std::path::Path;

/// Write `bytes` to `path` through a temp file in the same directory,
/// then rename into place. The previous artifact is never left partially
/// overwritten. Parent directories are created if absent.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, bytes)?;
    fs::rename(tmp, path)?;
    Ok(())
}
