//! Stream Handles
//!
//! Direction-tagged, shared references to host I/O resources. Cloning a
//! handle duplicates the reference; the resource itself is never copied.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ErrorKind, Result};

type Shared<T> = Arc<Mutex<T>>;

fn lock<'a, T: ?Sized>(inner: &'a Mutex<T>, label: &str) -> Result<MutexGuard<'a, T>> {
    inner
        .lock()
        .map_err(|_| ErrorKind::StreamUnavailable(format!("{} is poisoned", label)))
}

/// Readable stream handle
#[derive(Clone)]
pub struct InStream {
    inner: Shared<Box<dyn Read + Send>>,
    label: Arc<str>,
}

impl InStream {
    pub fn new(reader: impl Read + Send + 'static, label: impl Into<Arc<str>>) -> Self {
        InStream {
            inner: Arc::new(Mutex::new(Box::new(reader))),
            label: label.into(),
        }
    }

    /// Host-facing description, e.g. the file path
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read exactly `size` bytes, failing if the stream ends first
    pub fn read_exact(&self, size: usize) -> Result<Vec<u8>> {
        let mut reader = lock(&self.inner, &self.label)?;
        let mut buffer = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            match reader.read(&mut buffer[filled..]) {
                Ok(0) => {
                    return Err(ErrorKind::EndOfStream {
                        expected: size,
                        got: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(buffer)
    }

    /// Read until end of stream
    pub fn read_to_end(&self) -> Result<Vec<u8>> {
        let mut reader = lock(&self.inner, &self.label)?;
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    pub fn same_stream(&self, other: &InStream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

/// Writable stream handle
#[derive(Clone)]
pub struct OutStream {
    inner: Shared<Box<dyn Write + Send>>,
    label: Arc<str>,
}

impl OutStream {
    pub fn new(writer: impl Write + Send + 'static, label: impl Into<Arc<str>>) -> Self {
        OutStream {
            inner: Arc::new(Mutex::new(Box::new(writer))),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append all bytes and flush, so output survives a later abort
    pub fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = lock(&self.inner, &self.label)?;
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn same_stream(&self, other: &OutStream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl fmt::Debug for InStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InStream").field(&self.label).finish()
    }
}

impl fmt::Debug for OutStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OutStream").field(&self.label).finish()
    }
}

impl PartialEq for InStream {
    fn eq(&self, other: &Self) -> bool {
        self.same_stream(other)
    }
}

impl PartialEq for OutStream {
    fn eq(&self, other: &Self) -> bool {
        self.same_stream(other)
    }
}

impl Eq for InStream {}
impl Eq for OutStream {}

impl Hash for InStream {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl Hash for OutStream {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}
