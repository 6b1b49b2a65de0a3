use super::*;

/// Byte index into the fragment bitmap holding block-in-group `o`'s field.
fn fmap_index(frag: u64, o: u64) -> u64 {
	match frag {
		8 => o,
		4 => o >> 1,
		2 => o >> 2,
		1 => o >> 3,
		_ => unreachable!("invalid fragment count: {frag}"),
	}
}

/// Extract the `frag`-bit allocation field for block-in-group `o` from its
/// bitmap byte. A set bit means the fragment is free.
fn fmap_avail(byte: u8, frag: u64, o: u64) -> u8 {
	match frag {
		8 => byte,
		4 => (byte >> ((o & 1) * 4)) & 0xf,
		2 => (byte >> ((o & 3) * 2)) & 0x3,
		1 => (byte >> (o & 7)) & 0x1,
		_ => unreachable!("invalid fragment count: {frag}"),
	}
}

impl<R: Backend> Ffs<R> {
	/// Read block `bno`, zeroing any fragment its cylinder group marks
	/// free. Returns `None` when the whole block is free and thus holds no
	/// valid data.
	pub fn read_block(&mut self, bno: u64) -> Result<Option<Vec<u8>>, Error> {
		log::trace!("read_block({bno});");
		let i = bno / self.bpg;
		let o = bno % self.bpg;
		if i >= self.cg.len() as u64 {
			return Ok(None);
		}

		let frag = self.sb.frag as u64;
		let cgo = self.cg[i as usize].cgbno * self.bsize();
		let cgblk: CgBlk = self.file.decode_at(cgo)?;
		if cgblk.magic != CG_MAGIC {
			log::warn!("read_block({bno}): bad cylinder group magic in cg {i}");
			return Ok(None);
		}

		let byte: u8 = self
			.file
			.decode_at(cgo + cgblk.fmapoff as u64 + fmap_index(frag, o))?;
		let avail = fmap_avail(byte, frag, o);

		if avail == ((1u16 << frag) - 1) as u8 {
			self.hole_skips += 1;
			return Ok(None);
		}

		let bs = self.bsize() as usize;
		let mut buf = Vec::new();
		buf.try_reserve_exact(bs).map_err(|_| Error::NoMem)?;
		buf.resize(bs, 0u8);
		self.file.read_at(bno * self.bsize(), &mut buf)?;

		// partially allocated block: the free fragments read as zeros
		let fsize = self.fsize() as usize;
		for k in 0..frag as usize {
			if avail & (1 << k) != 0 {
				buf[k * fsize..(k + 1) * fsize].fill(0u8);
			}
		}
		Ok(Some(buf))
	}

	/// Read `size` bytes of data starting at fragment `fragno`. `None`
	/// marks a hole or a pointer that cannot be followed.
	pub(crate) fn read_data(
		&mut self,
		fragno: u32,
		size: usize,
	) -> Result<Option<Vec<u8>>, Error> {
		if fragno == 0 {
			return Ok(None);
		}
		if fragno as u64 >= self.sb.size as u64 {
			log::error!(
				"read_data: request for fragment {fragno:#x}; nfrag {:#x}",
				self.sb.size
			);
			return Ok(None);
		}

		let want = size.max(self.fsize() as usize);
		let mut buf = Vec::new();
		buf.try_reserve_exact(want).map_err(|_| Error::NoMem)?;
		buf.resize(want, 0u8);
		self.file.read_at(fragno as u64 * self.fsize(), &mut buf)?;
		Ok(Some(buf))
	}

	/// Resolve logical file block `lbno` of `ino` to its data fragments
	/// and read `size` bytes of them. Only first-level indirection is
	/// addressable; anything beyond is out of range.
	pub(crate) fn file_block(
		&mut self,
		ino: &Inode,
		lbno: u64,
		size: usize,
	) -> Result<Option<Vec<u8>>, Error> {
		if lbno < NDADDR as u64 {
			return self.read_data(ino.db[lbno as usize] as u32, size);
		}
		let bno = lbno - NDADDR as u64;
		let ppb = self.bsize() / 4;
		if bno / ppb >= NIADDR as u64 {
			log::warn!("file_block {lbno}: too big");
			return Ok(None);
		}

		let bs = self.bsize() as usize;
		let Some(ind) = self.read_data(ino.ib[(bno / ppb) as usize] as u32, bs)? else {
			return Ok(None);
		};
		let off = (bno % ppb) as usize * 4;
		let mut ptr = [0u8; 4];
		ptr.copy_from_slice(&ind[off..off + 4]);
		drop(ind);
		self.read_data(u32::from_le_bytes(ptr), size)
	}
}
