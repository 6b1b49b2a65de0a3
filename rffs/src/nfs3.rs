use std::{error, ffi::OsStr, fmt, io};

use bitflags::bitflags;

/// Maximum length of an NFS3 file handle.
pub const NFS3_FHSIZE: usize = 64;

/// Non-success status of an operation, the NFS3 status space of this
/// filesystem. Disk-level failures keep their cause for logging.
#[derive(Debug)]
pub enum Error {
	/// The superblock failed validation at mount.
	BadImage,
	/// Wrong handle length, inode out of range, or unknown inode type.
	BadHandle,
	/// The operation requires a directory.
	NotDir,
	/// The name does not exist in the directory.
	NoEnt,
	/// The credentials do not grant the required access (EPERM).
	NotOwner,
	/// An output buffer could not be allocated.
	NoMem,
	/// A disk read failed, or an on-disk structure had to be rejected.
	Io(io::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::BadImage => write!(f, "bad super block"),
			Self::BadHandle => write!(f, "bad file handle"),
			Self::NotDir => write!(f, "not a directory"),
			Self::NoEnt => write!(f, "no such file or directory"),
			Self::NotOwner => write!(f, "permission denied"),
			Self::NoMem => write!(f, "out of memory"),
			Self::Io(e) => write!(f, "i/o error: {e}"),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Self::Io(e)
	}
}

/// Opaque NFS3 file handle.
///
/// This filesystem hands out 4-byte handles carrying the inode number in
/// big-endian order, independent of the disk byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nfs3Handle {
	len: usize,
	buf: [u8; NFS3_FHSIZE],
}

impl Nfs3Handle {
	/// Wrap handle bytes received from a client.
	pub fn new(bytes: &[u8]) -> Self {
		assert!(bytes.len() <= NFS3_FHSIZE);
		let mut buf = [0u8; NFS3_FHSIZE];
		buf[0..bytes.len()].copy_from_slice(bytes);
		Self {
			len: bytes.len(),
			buf,
		}
	}

	pub(crate) fn from_inum(inum: u32) -> Self {
		Self::new(&inum.to_be_bytes())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.buf[0..self.len]
	}

	pub(crate) fn inum(&self) -> Result<u32, Error> {
		let bytes: [u8; 4] = self
			.as_bytes()
			.try_into()
			.map_err(|_| Error::BadHandle)?;
		Ok(u32::from_be_bytes(bytes))
	}
}

/// NFS3 file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nfs3FileType {
	Reg,
	Dir,
	Block,
	Char,
	Symlink,
	Socket,
	Fifo,
}

/// Seconds/nanoseconds pair, as carried in the inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nfs3Time {
	pub sec:  u32,
	pub nsec: u32,
}

/// File attributes returned by `getattr` and `access`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfs3Attr {
	pub kind:   Nfs3FileType,
	pub mode:   u32,
	pub nlink:  u32,
	pub uid:    u32,
	pub gid:    u32,
	pub size:   u64,
	pub used:   u64,
	pub major:  u32,
	pub minor:  u32,
	pub fsid:   u64,
	pub fileid: u64,
	pub atime:  Nfs3Time,
	pub mtime:  Nfs3Time,
	pub ctime:  Nfs3Time,
}

bitflags! {
	/// NFS3 ACCESS request/reply bits.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct Access: u32 {
		const READ = 0x0001;
		const LOOKUP = 0x0002;
		const MODIFY = 0x0004;
		const EXTEND = 0x0008;
		const DELETE = 0x0010;
		const EXECUTE = 0x0020;
	}
}

/// AUTH_UNIX credentials presented with a request.
#[derive(Debug, Clone, Default)]
pub struct AuthUnix {
	pub uid:    u32,
	pub gid:    u32,
	pub groups: Vec<u32>,
}

impl AuthUnix {
	pub fn new(uid: u32, gid: u32, groups: Vec<u32>) -> Self {
		Self {
			uid,
			gid,
			groups,
		}
	}

	pub fn in_group(&self, gid: u32) -> bool {
		self.groups.contains(&gid)
	}
}

/// One directory entry surfaced by `readdir`.
#[derive(Debug)]
pub struct Nfs3Entry<'a> {
	pub fileid: u32,
	pub name:   &'a OsStr,
	/// Offset of the record following this entry; feeding it back resumes
	/// the listing right after this entry.
	pub cookie: u64,
}

/// Appends directory entries to the caller's reply encoding.
///
/// The encoding is opaque to the filesystem; it only cares whether the
/// entry fit.
pub trait EntryPacker {
	/// Append one entry. Returning false means there was no room; the
	/// directory walk stops without advancing past the entry.
	fn pack(&mut self, entry: &Nfs3Entry<'_>) -> bool;
}

impl<F: FnMut(&Nfs3Entry<'_>) -> bool> EntryPacker for F {
	fn pack(&mut self, entry: &Nfs3Entry<'_>) -> bool {
		self(entry)
	}
}
