use chrono::{DateTime, Utc};
use scenerep_geometry::Representation;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::BinaryRepError;
use crate::header::{self, MAGIC, SUFFIX, VERSION};

/// zstd level used for the payload.
const PAYLOAD_COMPRESSION_LEVEL: i32 = 3;

/// Mode a [`BinaryRep`] file is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

enum Stream {
    Read(BufReader<File>),
    /// Writes go to a staging file renamed over the target on a clean close.
    Write {
        writer: BufWriter<File>,
        staging: PathBuf,
    },
}

/// Binary representation cache file.
///
/// The handle is `Closed` until [`open`](Self::open) succeeds and returns to
/// `Closed` on [`close`](Self::close). The composite operations
/// [`rep_is_up_to_date`](Self::rep_is_up_to_date), [`load_rep`](Self::load_rep)
/// and [`save`](Self::save) run the whole open/transfer/close cycle.
pub struct BinaryRep {
    path: PathBuf,
    stream: Option<Stream>,
    /// First I/O or decode error seen on the attached stream.
    stream_error: Option<io::Error>,
}

impl Clone for BinaryRep {
    /// Clones the target path only; the clone starts closed.
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            stream: None,
            stream_error: None,
        }
    }
}

impl std::fmt::Debug for BinaryRep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryRep")
            .field("path", &self.path)
            .field("open", &self.open_mode())
            .finish()
    }
}

impl BinaryRep {
    /// Create a closed handle on `path`, appending the cache suffix if missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: with_suffix(path.as_ref()),
            stream: None,
            stream_error: None,
        }
    }

    /// The cache file extension, without the dot.
    pub fn suffix() -> &'static str {
        SUFFIX
    }

    /// Cache file path, suffix included.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retarget a closed handle.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        assert!(
            self.stream.is_none(),
            "BinaryRep::set_path called on {} while open",
            self.path.display()
        );
        self.path = with_suffix(path.as_ref());
    }

    /// True while a stream is attached.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Mode of the attached stream, `None` when closed.
    pub fn open_mode(&self) -> Option<OpenMode> {
        match self.stream {
            Some(Stream::Read(_)) => Some(OpenMode::Read),
            Some(Stream::Write { .. }) => Some(OpenMode::Write),
            None => None,
        }
    }

    /// Check whether the cached representation is up to date against `time_stamp`.
    ///
    /// `Ok(false)` means the cache is stale. A missing file, a foreign header
    /// or a stream error while reading the time stamp is an error, never
    /// `false`.
    pub fn rep_is_up_to_date(&mut self, time_stamp: DateTime<Utc>) -> Result<bool, BinaryRepError> {
        let _span = tracing::debug_span!("rep_is_up_to_date", path = %self.path.display()).entered();
        self.open(OpenMode::Read)?;
        if !self.header_is_ok() {
            self.close();
            tracing::warn!("binary rep not recognised: {}", self.path.display());
            return Err(self.unsupported("file not recognised"));
        }
        let fresh = self.time_stamp_ok(time_stamp);
        if !self.close() {
            tracing::warn!("error while checking binary rep {}", self.path.display());
            return Err(self.unsupported("stream error while checking"));
        }
        Ok(fresh)
    }

    /// Load the cached representation.
    ///
    /// The stored time stamp is consumed but not checked.
    pub fn load_rep(&mut self) -> Result<Representation, BinaryRepError> {
        let _span = tracing::debug_span!("load_rep", path = %self.path.display()).entered();
        self.open(OpenMode::Read)?;
        if !self.header_is_ok() {
            self.close();
            tracing::warn!("binary rep not supported: {}", self.path.display());
            return Err(self.unsupported("file not supported"));
        }
        self.read_time_stamp();
        let rep = self.read_payload();
        if !self.close() {
            tracing::warn!("error while loading binary rep {}", self.path.display());
            return Err(self.unsupported("stream error while loading"));
        }
        rep.ok_or_else(|| self.unsupported("missing payload"))
    }

    /// Serialize `rep` to the cache file. Returns false if the file could not
    /// be opened or the transfer did not complete cleanly.
    pub fn save(&mut self, rep: &Representation) -> bool {
        match self.try_save(rep) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save binary rep {}: {e}", self.path.display());
                false
            }
        }
    }

    /// Like [`save`](Self::save), with the failure cause.
    pub fn try_save(&mut self, rep: &Representation) -> Result<(), BinaryRepError> {
        let _span = tracing::debug_span!("save", path = %self.path.display()).entered();
        self.open(OpenMode::Write)?;
        let written = {
            let writer = self.writer("save");
            header::write_header(writer, rep.last_modified())
                .and_then(|()| encode_payload(writer, rep))
        };
        if let Err(e) = written {
            self.record(e);
        }
        self.finish().map_err(BinaryRepError::Io)
    }

    /// Attach a stream on the cache file.
    ///
    /// Reading a missing file fails with [`BinaryRepError::NotFound`] and
    /// leaves the handle closed.
    ///
    /// # Panics
    /// If the handle is already open.
    pub fn open(&mut self, mode: OpenMode) -> Result<(), BinaryRepError> {
        assert!(
            self.stream.is_none(),
            "BinaryRep::open called on {} while already open",
            self.path.display()
        );
        let stream = match mode {
            OpenMode::Read => {
                let file = File::open(&self.path).map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        tracing::debug!("binary rep {} does not exist", self.path.display());
                        BinaryRepError::NotFound {
                            path: self.path.clone(),
                        }
                    } else {
                        BinaryRepError::Io(e)
                    }
                })?;
                Stream::Read(BufReader::new(file))
            }
            OpenMode::Write => {
                let staging = staging_path(&self.path);
                let file = File::create(&staging)?;
                Stream::Write {
                    writer: BufWriter::new(file),
                    staging,
                }
            }
        };
        tracing::debug!(?mode, "opened binary rep {}", self.path.display());
        self.stream = Some(stream);
        self.stream_error = None;
        Ok(())
    }

    /// Read the magic number and version; true iff both match exactly.
    ///
    /// # Panics
    /// If the handle is not open for reading.
    pub fn header_is_ok(&mut self) -> bool {
        let read = {
            let reader = self.reader("header_is_ok");
            header::read_magic(reader)
                .and_then(|magic| Ok((magic, header::read_version(reader)?)))
        };
        match read {
            Ok((magic, version)) => {
                let ok = magic == MAGIC && version == VERSION;
                if !ok {
                    tracing::debug!(%magic, version, "binary rep header mismatch");
                }
                ok
            }
            Err(e) => {
                self.record(e);
                false
            }
        }
    }

    /// Read the stored time stamp; true iff it is not later than `time_stamp`.
    ///
    /// # Panics
    /// If the handle is not open for reading.
    pub fn time_stamp_ok(&mut self, time_stamp: DateTime<Utc>) -> bool {
        match self.read_time_stamp() {
            Some(stored) => stored <= time_stamp,
            None => false,
        }
    }

    /// Detach the stream and release the file. Returns true iff the stream saw
    /// no error.
    ///
    /// # Panics
    /// If the handle is not open.
    pub fn close(&mut self) -> bool {
        match self.finish() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("binary rep {} closed with error: {e}", self.path.display());
                false
            }
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        let stream = self.stream.take().unwrap_or_else(|| {
            panic!(
                "BinaryRep::close called on {} while not open",
                self.path.display()
            )
        });
        let mut status = match self.stream_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        };
        if let Stream::Write { writer, staging } = stream {
            if status.is_ok() {
                status = writer
                    .into_inner()
                    .map_err(io::IntoInnerError::into_error)
                    .and_then(|file| file.sync_all());
            }
            status = status.and_then(|()| fs::rename(&staging, &self.path));
            if status.is_err() {
                // Best effort; the staging file is never mistaken for a cache file.
                let _ = fs::remove_file(&staging);
            }
        }
        status
    }

    fn read_time_stamp(&mut self) -> Option<DateTime<Utc>> {
        let read = header::read_time_stamp(self.reader("time_stamp_ok"));
        match read {
            Ok(stored) => Some(stored),
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    fn read_payload(&mut self) -> Option<Representation> {
        let decoded = decode_payload(self.reader("load_rep")).and_then(|rep| {
            rep.validate()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            Ok(rep)
        });
        match decoded {
            Ok(rep) => Some(rep),
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    fn reader(&mut self, op: &str) -> &mut BufReader<File> {
        match self.stream.as_mut() {
            Some(Stream::Read(reader)) => reader,
            _ => panic!(
                "BinaryRep::{op} requires {} to be open for reading",
                self.path.display()
            ),
        }
    }

    fn writer(&mut self, op: &str) -> &mut BufWriter<File> {
        match self.stream.as_mut() {
            Some(Stream::Write { writer, .. }) => writer,
            _ => panic!(
                "BinaryRep::{op} requires {} to be open for writing",
                self.path.display()
            ),
        }
    }

    fn record(&mut self, e: io::Error) {
        if self.stream_error.is_none() {
            self.stream_error = Some(e);
        }
    }

    fn unsupported(&self, reason: &str) -> BinaryRepError {
        BinaryRepError::UnsupportedFormat {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

fn encode_payload<W: Write>(w: &mut W, rep: &Representation) -> io::Result<()> {
    let mut encoder = zstd::Encoder::new(w, PAYLOAD_COMPRESSION_LEVEL)?;
    ciborium::into_writer(rep, &mut encoder).map_err(|e| io::Error::other(e.to_string()))?;
    encoder.finish()?;
    Ok(())
}

fn decode_payload(r: &mut BufReader<File>) -> io::Result<Representation> {
    let decoder = zstd::Decoder::with_buffer(r)?.single_frame();
    ciborium::from_reader(decoder)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

fn with_suffix(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == SUFFIX) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(SUFFIX);
        PathBuf::from(name)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
