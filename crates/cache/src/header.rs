use chrono::{DateTime, Utc};
use std::io::{self, Read, Write};
use uuid::{Uuid, uuid};

/// Extension carried by every cache file.
pub const SUFFIX: &str = "BSRep";

/// Magic number identifying the binary rep format family.
pub const MAGIC: Uuid = uuid!("d6f97789-36a9-4c2e-b667-0e66c27f839f");

/// Format version. Files with any other version are rejected.
pub const VERSION: u32 = 100;

pub(crate) fn write_header<W: Write>(w: &mut W, time_stamp: DateTime<Utc>) -> io::Result<()> {
    w.write_all(MAGIC.as_bytes())?;
    w.write_all(&VERSION.to_be_bytes())?;
    write_time_stamp(w, time_stamp)
}

pub(crate) fn write_time_stamp<W: Write>(w: &mut W, time_stamp: DateTime<Utc>) -> io::Result<()> {
    w.write_all(&time_stamp.timestamp().to_be_bytes())?;
    w.write_all(&time_stamp.timestamp_subsec_nanos().to_be_bytes())
}

pub(crate) fn read_magic<R: Read>(r: &mut R) -> io::Result<Uuid> {
    let mut bytes = [0u8; 16];
    r.read_exact(&mut bytes)?;
    Ok(Uuid::from_bytes(bytes))
}

pub(crate) fn read_version<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}

pub(crate) fn read_time_stamp<R: Read>(r: &mut R) -> io::Result<DateTime<Utc>> {
    let mut secs = [0u8; 8];
    let mut nanos = [0u8; 4];
    r.read_exact(&mut secs)?;
    r.read_exact(&mut nanos)?;
    let secs = i64::from_be_bytes(secs);
    let nanos = u32::from_be_bytes(nanos);
    DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("time stamp out of range: {secs}s {nanos}ns"),
        )
    })
}
