use super::{FileSystem, Result};
use crate::error;
use crate::lang::ast::FileMode;
use crate::mach::MAX_FILE_LEN;
use std::collections::HashMap;
use std::convert::TryFrom;

/// Files kept in memory for the life of the session.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: HashMap<String, Vec<u8>>,
    handles: HashMap<i64, OpenFile>,
    last_handle: i64,
}

#[derive(Debug)]
struct OpenFile {
    path: String,
    mode: FileMode,
    position: usize,
}

impl MemoryFileSystem {
    pub fn new() -> MemoryFileSystem {
        MemoryFileSystem::default()
    }

    /// Preload a file.
    pub fn with_file(mut self, path: &str, contents: &[u8]) -> MemoryFileSystem {
        self.files.insert(path.to_string(), contents.to_vec());
        self
    }

    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    fn handle(&self, handle: i64) -> Result<&OpenFile> {
        self.handles
            .get(&handle)
            .ok_or_else(|| error!(BadFileNumber; &format!("No open file #{}", handle)))
    }

    fn handle_mut(&mut self, handle: i64) -> Result<&mut OpenFile> {
        self.handles
            .get_mut(&handle)
            .ok_or_else(|| error!(BadFileNumber; &format!("No open file #{}", handle)))
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&mut self, path: &str, mode: FileMode) -> Result<i64> {
        let position = match mode {
            FileMode::Read => {
                if !self.files.contains_key(path) {
                    return Err(error!(FileNotFound; path));
                }
                0
            }
            FileMode::Write => {
                self.files.insert(path.to_string(), vec![]);
                0
            }
            FileMode::Append => self.files.entry(path.to_string()).or_default().len(),
            FileMode::ReadWrite => {
                self.files.entry(path.to_string()).or_default();
                0
            }
        };
        self.last_handle += 1;
        self.handles.insert(
            self.last_handle,
            OpenFile {
                path: path.to_string(),
                mode,
                position,
            },
        );
        Ok(self.last_handle)
    }

    fn close(&mut self, handle: i64) -> Result<()> {
        match self.handles.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(error!(BadFileNumber; &format!("No open file #{}", handle))),
        }
    }

    fn read_bytes(&mut self, handle: i64, count: usize) -> Result<Vec<u8>> {
        let (path, position) = {
            let file = self.handle(handle)?;
            if file.mode == FileMode::Write || file.mode == FileMode::Append {
                return Err(error!(BadFileMode; "File not open for reading"));
            }
            (file.path.clone(), file.position)
        };
        let data = self.files.get(&path).map(Vec::as_slice).unwrap_or(&[]);
        let start = position.min(data.len());
        let end = start.saturating_add(count).min(data.len());
        let bytes = data[start..end].to_vec();
        self.handle_mut(handle)?.position = end;
        Ok(bytes)
    }

    fn write_bytes(&mut self, handle: i64, data: &[u8]) -> Result<()> {
        let file = self.handle(handle)?;
        if file.mode == FileMode::Read {
            return Err(error!(BadFileMode; "File not open for writing"));
        }
        let (path, position) = (file.path.clone(), file.position);
        match position.checked_add(data.len()) {
            Some(end) if end <= MAX_FILE_LEN => {}
            _ => return Err(error!(OutOfMemory; "File too large")),
        }
        let contents = self.files.entry(path).or_default();
        if contents.len() < position {
            contents.resize(position, 0);
        }
        let overlap = (contents.len() - position).min(data.len());
        contents[position..position + overlap].copy_from_slice(&data[..overlap]);
        contents.extend_from_slice(&data[overlap..]);
        self.handle_mut(handle)?.position = position + data.len();
        Ok(())
    }

    fn seek(&mut self, handle: i64, position: u64) -> Result<()> {
        let file = self.handle_mut(handle)?;
        file.position = match usize::try_from(position) {
            Ok(position) if position <= MAX_FILE_LEN => position,
            _ => return Err(error!(IllegalFunctionCall; "Seek position out of range")),
        };
        Ok(())
    }

    fn tell(&self, handle: i64) -> Result<u64> {
        Ok(self.handle(handle)?.position as u64)
    }

    fn eof(&self, handle: i64) -> Result<bool> {
        let file = self.handle(handle)?;
        let len = self.files.get(&file.path).map_or(0, Vec::len);
        Ok(file.position >= len)
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        match self.files.get(path) {
            Some(contents) => Ok(contents.clone()),
            None => Err(error!(FileNotFound; path)),
        }
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        if data.len() > MAX_FILE_LEN {
            return Err(error!(OutOfMemory; "File too large"));
        }
        self.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_handles_are_monotonic() {
        let mut fs = MemoryFileSystem::new();
        let a = fs.open("a", FileMode::Write).unwrap();
        let b = fs.open("b", FileMode::Write).unwrap();
        assert_eq!((a, b), (1, 2));
        fs.close(a).unwrap();
        assert_eq!(fs.open("c", FileMode::Write).unwrap(), 3);
        assert!(fs.close(a).unwrap_err().is(ErrorCode::BadFileNumber));
    }

    #[test]
    fn test_write_then_read() {
        let mut fs = MemoryFileSystem::new();
        let h = fs.open("data", FileMode::Write).unwrap();
        fs.write_bytes(h, b"hello").unwrap();
        assert!(fs.read_bytes(h, 1).unwrap_err().is(ErrorCode::BadFileMode));
        fs.close(h).unwrap();
        let h = fs.open("data", FileMode::Read).unwrap();
        assert_eq!(fs.read_bytes(h, 2).unwrap(), b"he".to_vec());
        assert_eq!(fs.tell(h).unwrap(), 2);
        assert!(!fs.eof(h).unwrap());
        assert_eq!(fs.read_bytes(h, 99).unwrap(), b"llo".to_vec());
        assert!(fs.eof(h).unwrap());
    }

    #[test]
    fn test_append_and_overwrite() {
        let mut fs = MemoryFileSystem::new().with_file("log", b"ab");
        let h = fs.open("log", FileMode::Append).unwrap();
        fs.write_bytes(h, b"cd").unwrap();
        assert_eq!(fs.contents("log"), Some(&b"abcd"[..]));
        let h = fs.open("log", FileMode::ReadWrite).unwrap();
        fs.seek(h, 1).unwrap();
        fs.write_bytes(h, b"XYZW").unwrap();
        assert_eq!(fs.contents("log"), Some(&b"aXYZW"[..]));
    }

    #[test]
    fn test_missing_file() {
        let mut fs = MemoryFileSystem::new();
        assert!(fs.open("nope", FileMode::Read).unwrap_err().is(ErrorCode::FileNotFound));
        assert!(fs.read_file("nope").is_err());
    }
}
