//! Builds small UFS1 images in memory for the integration tests.
//!
//! The geometry is fixed: 4096-byte blocks split into eight 512-byte
//! fragments, 256 blocks per cylinder group, 128 inodes per group. The
//! cylinder group block sits at block 4 of each group, the inode table at
//! block 5, and data starts at block 10.

use std::io::Cursor;

use rffs::{BlockReader, Ffs, MountOptions};

pub const BSIZE: usize = 4096;
pub const FSIZE: usize = 512;
pub const FRAG: usize = 8;
pub const BPG: usize = 256;
pub const FPG: usize = 2048;
pub const IPG: u32 = 128;
pub const INOPB: u32 = 32;
pub const CBLKNO: usize = 32;
pub const IBLKNO: usize = 40;
pub const DBLKNO: usize = 80;

pub const IFDIR: u16 = 0o040000;
pub const IFREG: u16 = 0o100000;
pub const IFLNK: u16 = 0o120000;
pub const IFCHR: u16 = 0o020000;

const SBOFF: usize = 8192;
const FMAPOFF: usize = 256;

pub struct ImageBuilder {
	buf: Vec<u8>,
	ncg: u32,
}

impl ImageBuilder {
	pub fn new(ncg: u32) -> Self {
		let nfrag = ncg as usize * FPG;
		let mut b = Self {
			buf: vec![0u8; nfrag * FSIZE],
			ncg,
		};

		// superblock
		b.put_u32(SBOFF + 8, 16); // sblkno
		b.put_u32(SBOFF + 12, CBLKNO as u32); // cblkno
		b.put_u32(SBOFF + 16, IBLKNO as u32); // iblkno
		b.put_u32(SBOFF + 20, DBLKNO as u32); // dblkno
		b.put_u32(SBOFF + 24, 0); // cgoffset
		b.put_u32(SBOFF + 28, 0xffff_ffff); // cgmask
		b.put_u32(SBOFF + 36, nfrag as u32); // size
		b.put_u32(SBOFF + 40, (nfrag - ncg as usize * DBLKNO) as u32); // dsize
		b.put_u32(SBOFF + 44, ncg); // ncg
		b.put_u32(SBOFF + 48, BSIZE as u32); // bsize
		b.put_u32(SBOFF + 52, FSIZE as u32); // fsize
		b.put_u32(SBOFF + 56, FRAG as u32); // frag
		b.put_u32(SBOFF + 96, 3); // fragshift
		b.put_u32(SBOFF + 104, 8192); // sbsize
		b.put_u32(SBOFF + 120, INOPB); // inopb
		b.put_u32(SBOFF + 172, 128); // spc
		b.put_u32(SBOFF + 180, 16); // cpg
		b.put_u32(SBOFF + 184, IPG); // ipg
		b.put_u32(SBOFF + 188, FPG as u32); // fpg
		b.put_u32(SBOFF + 1372, 0x011954); // magic

		// cylinder group blocks; the fragment bitmap starts all-allocated
		for i in 0..ncg {
			let off = Self::cg_off(i);
			b.put_u32(off + 4, 0x090255); // magic
			b.put_u32(off + 12, i); // cgx
			b.put_u32(off + 20, FPG as u32); // ndblk
			b.put_u32(off + 96, FMAPOFF as u32); // freeoff
		}

		b
	}

	fn cg_off(i: u32) -> usize {
		(i as usize * BPG + CBLKNO / FRAG) * BSIZE
	}

	fn put_u16(&mut self, off: usize, v: u16) {
		self.buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
	}

	fn put_u32(&mut self, off: usize, v: u32) {
		self.buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
	}

	fn put_u64(&mut self, off: usize, v: u64) {
		self.buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
	}

	/// Write one on-disk inode.
	pub fn inode(&mut self, inum: u32, spec: &InodeSpec) {
		let grp = (inum / IPG) as usize;
		let ioff = inum % IPG;
		let blk = grp * BPG + IBLKNO / FRAG + (ioff / INOPB) as usize;
		let off = blk * BSIZE + (ioff % INOPB) as usize * 128;

		self.put_u16(off, spec.mode);
		self.put_u16(off + 2, spec.nlink);
		self.put_u64(off + 8, spec.size);
		self.put_u32(off + 16, 1000 + inum); // atime
		self.put_u32(off + 20, 11); // atimensec
		self.put_u32(off + 24, 2000 + inum); // mtime
		self.put_u32(off + 28, 22); // mtimensec
		self.put_u32(off + 32, 3000 + inum); // ctime
		self.put_u32(off + 36, 33); // ctimensec
		match &spec.shortlink {
			Some(text) => {
				self.buf[off + 40..off + 40 + text.len()].copy_from_slice(text);
			}
			None => {
				for (k, db) in spec.db.iter().enumerate() {
					self.put_u32(off + 40 + k * 4, *db as u32);
				}
				for (k, ib) in spec.ib.iter().enumerate() {
					self.put_u32(off + 88 + k * 4, *ib as u32);
				}
			}
		}
		self.put_u32(off + 104, spec.blocks as u32);
		self.put_u32(off + 112, spec.uid);
		self.put_u32(off + 116, spec.gid);
	}

	/// Write raw bytes starting at a fragment.
	pub fn data(&mut self, frag: u32, bytes: &[u8]) {
		let off = frag as usize * FSIZE;
		self.buf[off..off + bytes.len()].copy_from_slice(bytes);
	}

	/// Write a directory chunk of `chunk` bytes at `frag`. The last
	/// record's length runs to the end of the chunk.
	pub fn dir_data(&mut self, frag: u32, entries: &[(u32, &[u8])], chunk: usize) {
		let mut out: Vec<u8> = Vec::new();
		for (idx, (ino, name)) in entries.iter().enumerate() {
			let base = 8 + name.len() + 1;
			let reclen = if idx == entries.len() - 1 {
				chunk - out.len()
			} else {
				(base + 3) & !3
			};
			let start = out.len();
			out.extend_from_slice(&ino.to_le_bytes());
			out.extend_from_slice(&(reclen as u16).to_le_bytes());
			out.extend_from_slice(&(name.len() as u16).to_le_bytes());
			out.extend_from_slice(name);
			out.resize(start + reclen, 0u8);
		}
		assert_eq!(out.len(), chunk);
		self.data(frag, &out);
	}

	/// Poke the allocation byte of block `bno` in its group's fragment
	/// bitmap. Set bits mark free fragments.
	pub fn set_fmap(&mut self, bno: usize, val: u8) {
		let grp = (bno / BPG) as u32;
		let o = bno % BPG;
		self.buf[Self::cg_off(grp) + FMAPOFF + o] = val;
	}

	/// Overwrite a cylinder group's magic number.
	pub fn corrupt_cg_magic(&mut self, i: u32) {
		let off = Self::cg_off(i);
		self.put_u32(off + 4, 0xdeadbeef);
	}

	pub fn fs(self) -> Ffs<Cursor<Vec<u8>>> {
		self.fs_with(MountOptions::default()).unwrap()
	}

	pub fn fs_with(
		self,
		opts: MountOptions,
	) -> Result<Ffs<Cursor<Vec<u8>>>, rffs::Error> {
		let ncg = self.ncg;
		assert!(ncg > 0);
		Ffs::with_options(BlockReader::new(Cursor::new(self.buf), BSIZE), opts)
	}
}

#[derive(Clone)]
pub struct InodeSpec {
	pub mode:      u16,
	pub nlink:     u16,
	pub uid:       u32,
	pub gid:       u32,
	pub size:      u64,
	pub blocks:    i32,
	pub db:        [i32; 12],
	pub ib:        [i32; 3],
	pub shortlink: Option<Vec<u8>>,
}

impl Default for InodeSpec {
	fn default() -> Self {
		Self {
			mode:      0,
			nlink:     1,
			uid:       0,
			gid:       0,
			size:      0,
			blocks:    0,
			db:        [0; 12],
			ib:        [0; 3],
			shortlink: None,
		}
	}
}
