use std::fs;
use std::io;
use std::path::Path;

/// Total size in bytes of the regular files under `path`, recursively.
///
/// Symbolic links are neither followed nor counted. A regular file reports
/// its own size.
pub fn folder_size(path: &Path) -> io::Result<u64> {
    let meta = fs::symlink_metadata(path)?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        return Ok(0);
    }
    if file_type.is_file() {
        return Ok(meta.len());
    }
    if !file_type.is_dir() {
        return Ok(0);
    }

    let mut total = 0u64;
    for entry in fs::read_dir(path)? {
        total += folder_size(&entry?.path())?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), [0u8; 10]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b"), [0u8; 20]).unwrap();
        assert_eq!(folder_size(dir.path()).unwrap(), 30);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), [0u8; 10]).unwrap();
        fs::write(dir.path().join("b"), [0u8; 20]).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();
        assert_eq!(folder_size(dir.path()).unwrap(), 30);
    }

    #[test]
    fn test_empty_dir_and_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(folder_size(dir.path()).unwrap(), 0);

        let file = dir.path().join("f");
        fs::write(&file, [1u8; 7]).unwrap();
        assert_eq!(folder_size(&file).unwrap(), 7);
    }

    #[test]
    fn test_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(folder_size(&dir.path().join("nope")).is_err());
    }
}
