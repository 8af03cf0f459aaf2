//! Document loading guards
//!
//! Any readable path can be loaded. The only guard is a cap on the size
//! the loader is willing to read and parse.

use std::path::Path;

/// Maximum document size that can be loaded (1MB)
pub const MAX_FILE_SIZE_BYTES: usize = 1024 * 1024;

pub struct Sandbox {
    max_file_size: usize,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
        }
    }

    pub fn with_max_file_size(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn check_size(&self, bytes: usize) -> Result<(), SandboxError> {
        if bytes > self.max_file_size {
            return Err(SandboxError::FileTooLarge(bytes, self.max_file_size));
        }
        Ok(())
    }

    /// Reads `path` unless its metadata already reports it as too large.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>, SandboxError> {
        let len = std::fs::metadata(path).map_err(SandboxError::Io)?.len();
        self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        let bytes = std::fs::read(path).map_err(SandboxError::Io)?;
        self.check_size(bytes.len())?;
        Ok(bytes)
    }
}

#[derive(Debug)]
pub enum SandboxError {
    Io(std::io::Error),
    FileTooLarge(usize, usize),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::Io(e) => write!(f, "{}", e),
            SandboxError::FileTooLarge(size, max) => {
                write!(f, "File of {} bytes exceeds maximum size of {} bytes", size, max)
            }
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandboxError::Io(e) => Some(e),
            SandboxError::FileTooLarge(..) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit() {
        let sandbox = Sandbox::with_max_file_size(10);
        assert!(sandbox.check_size(10).is_ok());
        assert!(matches!(sandbox.check_size(11), Err(SandboxError::FileTooLarge(11, 10))));
    }

    #[test]
    fn reads_any_path_below_the_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let path = dir.path().join("my..form.txt");
        std::fs::write(&path, "<window/>").expect("write");

        let sandbox = Sandbox::with_max_file_size(16);
        let climbing = dir.path().join("sub").join("..").join("my..form.txt");
        assert_eq!(sandbox.read(&climbing).expect("read"), b"<window/>");

        std::fs::write(&path, "<window></window>").expect("write");
        assert!(matches!(sandbox.read(&path), Err(SandboxError::FileTooLarge(17, 16))));
        assert!(matches!(sandbox.read(&dir.path().join("gone.xml")), Err(SandboxError::Io(_))));
    }
}
