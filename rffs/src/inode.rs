use crate::{
	data::*,
	nfs3::{AuthUnix, Error, Nfs3Attr, Nfs3FileType, Nfs3Time},
};

impl Inode {
	/// NFS3 file type of this inode. Whiteouts and unknown modes have no
	/// mapping and poison the handle.
	pub fn kind(&self) -> Result<Nfs3FileType, Error> {
		match self.mode & IFMT {
			IFIFO => Ok(Nfs3FileType::Fifo),
			IFCHR => Ok(Nfs3FileType::Char),
			IFDIR => Ok(Nfs3FileType::Dir),
			IFBLK => Ok(Nfs3FileType::Block),
			IFREG => Ok(Nfs3FileType::Reg),
			IFLNK => Ok(Nfs3FileType::Symlink),
			IFSOCK => Ok(Nfs3FileType::Socket),
			_ => Err(Error::BadHandle),
		}
	}

	pub fn is_dir(&self) -> bool {
		self.mode & IFMT == IFDIR
	}

	pub fn perm(&self) -> u16 {
		self.mode & 0o7777
	}

	pub fn as_attr(&self, inum: u32, bsize: u32) -> Result<Nfs3Attr, Error> {
		let kind = self.kind()?;
		let (major, minor) = match kind {
			Nfs3FileType::Block | Nfs3FileType::Char => {
				let rdev = self.db[0] as u32;
				// The minor mask keeps bits 16..31; existing clients see
				// the historical decode.
				((rdev >> 8) & 0xff, rdev & 0xffff00ff)
			}
			_ => (0, 0),
		};
		Ok(Nfs3Attr {
			kind,
			mode: self.perm() as u32,
			nlink: self.nlink as u16 as u32,
			uid: self.uid,
			gid: self.gid,
			size: self.size,
			used: self.blocks as u32 as u64 * bsize as u64,
			major,
			minor,
			fsid: 0,
			fileid: inum as u64,
			atime: Nfs3Time {
				sec:  self.atime as u32,
				nsec: self.atimensec as u32,
			},
			mtime: Nfs3Time {
				sec:  self.mtime as u32,
				nsec: self.mtimensec as u32,
			},
			ctime: Nfs3Time {
				sec:  self.ctime as u32,
				nsec: self.ctimensec as u32,
			},
		})
	}

	/// Permission triad that applies to the caller: owner, group (primary
	/// or supplementary), or other. uid 0 gets no shortcut.
	pub(crate) fn have(&self, au: &AuthUnix) -> u16 {
		let mut have = self.mode & 0o777;
		if self.uid == au.uid {
			have >>= 6;
		} else if self.gid == au.gid || au.in_group(self.gid) {
			have >>= 3;
		}
		have
	}

	pub(crate) fn check_perm(&self, au: &AuthUnix, need: u16) -> Result<(), Error> {
		if (self.have(au) & need) != need {
			return Err(Error::NotOwner);
		}
		Ok(())
	}

	/// Target bytes of a fast symlink, which overlay `db` and `ib`.
	pub(crate) fn shortlink(&self) -> [u8; SLLEN] {
		let mut buf = [0u8; SLLEN];
		for (i, v) in self.db.iter().chain(self.ib.iter()).enumerate() {
			buf[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
		}
		buf
	}
}
