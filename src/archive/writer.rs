//! Scoped archive file sink.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use log::debug;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::config::ARCHIVE_WRITE_BUFFER_SIZE;

/// A finalized archive: flushed, synced and closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedArchive {
    /// Archive location
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
}

/// Buffered writer over an exclusively created archive file.
///
/// The file exists only while the writer is open or after [`finish`] succeeds.
/// [`discard`], a failed `finish`, or dropping the writer (for example when the
/// surrounding future is cancelled) closes the handle and removes the file.
///
/// [`finish`]: ArchiveWriter::finish
/// [`discard`]: ArchiveWriter::discard
#[derive(Debug)]
pub struct ArchiveWriter {
    path: PathBuf,
    inner: Option<BufWriter<File>>,
    bytes: u64,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Kept,
    Removed,
}

impl ArchiveWriter {
    /// Creates the file at `path`; fails if it already exists.
    ///
    /// On unix the file is created with mode 0600, since archives hold
    /// database contents.
    pub async fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);
        let file = options.open(&path).await?;
        debug!("Opened archive {}", path.display());
        Ok(Self {
            path,
            inner: Some(BufWriter::with_capacity(ARCHIVE_WRITE_BUFFER_SIZE, file)),
            bytes: 0,
            state: State::Open,
        })
    }

    /// Archive location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes accepted so far (buffered bytes included).
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Flushes, syncs and closes the file, keeping it on disk.
    ///
    /// On error the file is removed before returning.
    pub async fn finish(mut self) -> io::Result<FinishedArchive> {
        let mut writer = self.inner.take().ok_or_else(closed)?;
        writer.flush().await?;
        let file = writer.into_inner();
        file.sync_all().await?;
        drop(file);
        self.state = State::Kept;
        Ok(FinishedArchive {
            path: self.path.clone(),
            bytes: self.bytes,
        })
    }

    /// Closes and removes the file. Removal errors are logged and swallowed.
    pub async fn discard(mut self) {
        drop(self.inner.take());
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Failed to remove partial archive {}: {}", self.path.display(), e);
            }
        }
        self.state = State::Removed;
    }

    fn writer(&mut self) -> io::Result<Pin<&mut BufWriter<File>>> {
        self.inner.as_mut().map(Pin::new).ok_or_else(closed)
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "archive writer is closed")
}

impl AsyncWrite for ArchiveWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = match this.writer() {
            Ok(writer) => writer.poll_write(cx, buf),
            Err(e) => return Poll::Ready(Err(e)),
        };
        if let Poll::Ready(Ok(n)) = poll {
            this.bytes += n as u64;
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().writer() {
            Ok(writer) => writer.poll_flush(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().writer() {
            Ok(writer) => writer.poll_shutdown(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.state == State::Open {
            drop(self.inner.take());
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("Failed to remove partial archive {}: {}", self.path.display(), e);
                }
            }
        }
    }
}
