use std::{
	ffi::{OsStr, OsString},
	fs::File,
	io,
	os::unix::ffi::OsStringExt,
	path::Path,
};

mod blocks;
mod dir;
mod file;
mod inode;
mod symlink;

use crate::{
	blockreader::{Backend, BlockReader},
	data::*,
	decoder::Decoder,
	nfs3::*,
};

macro_rules! sbassert {
	($e:expr) => {
		if !($e) {
			log::error!("superblock rejected: {}", stringify!($e));
			return Err(Error::BadImage);
		}
	};
}

/// Mount-time configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MountOptions {
	/// Validate every cylinder group block at mount instead of on first
	/// use.
	pub check_groups: bool,
}

/// Summary of a mounted filesystem's geometry.
#[derive(Debug, Clone)]
pub struct Info {
	/// Number of blocks.
	pub nblock: u64,

	/// Number of fragments.
	pub nfrag: u64,

	/// Number of data fragments.
	pub ndfrag: u64,

	/// Block size.
	pub bsize: u32,

	/// Fragment size.
	pub fsize: u32,

	/// Number of cylinder groups.
	pub ncg: u32,
}

/// Read-only interpreter for a Berkeley Fast Filesystem (FFS/UFS1) image.
///
/// The geometry and the cylinder group table are fixed at mount; every
/// operation is a sequence of reads against the backing medium.
pub struct Ffs<R: Backend> {
	file:       Decoder<BlockReader<R>>,
	sb:         Superblock,
	bpg:        u64,
	nblock:     u64,
	cg:         Vec<Cylgrp>,
	hole_skips: u64,
}

impl<R: Backend> std::fmt::Debug for Ffs<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Ffs").finish()
	}
}

impl Ffs<File> {
	pub fn open(path: &Path) -> Result<Self, Error> {
		let file = BlockReader::open(path)?;
		Self::new(file)
	}
}

impl<R: Backend> Ffs<R> {
	pub fn new(file: BlockReader<R>) -> Result<Self, Error> {
		Self::with_options(file, MountOptions::default())
	}

	pub fn with_options(file: BlockReader<R>, opts: MountOptions) -> Result<Self, Error> {
		// Probe the magic number before trusting anything else.
		let mut file = Decoder::new(file);
		let magic: i32 = file.decode_at(SBOFF + MAGIC_OFFSET)?;
		if magic != FS_MAGIC {
			log::error!("bad superblock magic: {magic:#x}");
			return Err(Error::BadImage);
		}

		let sb: Superblock = file.decode_at(SBOFF)?;
		log::debug!("superblock: {sb:#?}");

		sbassert!(sb.ncg > 0);
		sbassert!(matches!(sb.frag, 1 | 2 | 4 | 8));
		sbassert!(sb.bsize > 0 && (sb.bsize as u32).is_power_of_two());
		sbassert!(sb.fsize == sb.bsize / sb.frag);
		sbassert!(sb.ipg > 0);
		sbassert!(sb.fpg > 0);
		sbassert!(sb.size > 0);
		sbassert!(sb.inopb == sb.bsize as u32 / INOSZ as u32);
		sbassert!(sb.cgoffset >= 0);

		let bpg = sb.blocks_per_group();
		sbassert!(bpg > 0);
		let nblock = sb.nblock();

		log::info!(
			"ffs: {nblock} {}-byte blocks, {} cylinder groups",
			sb.bsize,
			sb.ncg
		);

		// Lay out each cylinder group's regions from the fragment offsets
		// the superblock carries.
		let frag = sb.frag as u64;
		let cg = (0..sb.ncg as u64)
			.map(|i| {
				let bno = bpg * i + sb.cgoffset as u64 * (i & !(sb.cgmask as u64));
				Cylgrp {
					bno,
					cgbno: bno + sb.cblkno as u64 / frag,
					ibno: bno + sb.iblkno as u64 / frag,
					dbno: bno + sb.dblkno as u64 / frag,
				}
			})
			.collect();

		let mut s = Self {
			file,
			sb,
			bpg,
			nblock,
			cg,
			hole_skips: 0,
		};
		if opts.check_groups {
			s.check_groups()?;
		}
		Ok(s)
	}

	fn check_groups(&mut self) -> Result<(), Error> {
		let frag = self.sb.frag as u32;
		for i in 0..self.cg.len() {
			let cgblk: CgBlk = self.file.decode_at(self.cg[i].cgbno * self.bsize())?;
			if cgblk.magic != CG_MAGIC {
				log::error!("cg {i}: bad cylinder group magic: {:#x}", cgblk.magic);
				return Err(Error::BadImage);
			}
			if cgblk.ndblk % frag != 0 && i != self.cg.len() - 1 {
				log::error!(
					"cg {i}: fractional number of blocks in non-last cylinder group: {}",
					cgblk.ndblk
				);
				return Err(Error::BadImage);
			}
		}
		Ok(())
	}

	/// Get filesystem geometry.
	pub fn info(&self) -> Info {
		let sb = &self.sb;
		Info {
			nblock: self.nblock,
			nfrag:  sb.size as u64,
			ndfrag: sb.dsize as u64,
			bsize:  sb.bsize as u32,
			fsize:  sb.fsize as u32,
			ncg:    sb.ncg,
		}
	}

	/// How many whole-free blocks [`read_block`](Self::read_block) has
	/// skipped over the life of this mount.
	pub fn hole_skips(&self) -> u64 {
		self.hole_skips
	}

	/// Handle of the filesystem root directory.
	pub fn root(&self) -> Nfs3Handle {
		Nfs3Handle::from_inum(ROOT_INO)
	}

	pub(crate) fn bsize(&self) -> u64 {
		self.sb.bsize as u64
	}

	pub(crate) fn fsize(&self) -> u64 {
		self.sb.fsize as u64
	}
}
