use super::*;

impl<R: Backend> Ffs<R> {
	/// Read up to `count` bytes of the file behind `h` starting at
	/// `offset`. A single call never crosses a block boundary, so the
	/// returned data may be shorter than asked for; holes read back as
	/// zeros. Also reports whether the data ends at the end of the file.
	pub fn readfile(
		&mut self,
		au: &AuthUnix,
		h: &Nfs3Handle,
		count: u32,
		offset: u64,
	) -> Result<(Vec<u8>, bool), Error> {
		log::trace!("readfile(count={count}, offset={offset});");
		let (_, ino) = self.handle_inode(h)?;
		ino.check_perm(au, AREAD)?;

		if offset >= ino.size {
			return Ok((Vec::new(), true));
		}

		let bs = self.bsize();
		let mut count = count as u64;
		if offset + count > ino.size {
			count = ino.size - offset;
		}
		if count > 0 && offset / bs != (offset + count - 1) / bs {
			count = bs - offset % bs;
		}

		let off = (offset % bs) as usize;
		let fsize = self.fsize() as usize;
		let mut want = off + count as usize;
		if want % fsize != 0 {
			want += fsize - want % fsize;
		}

		let mut data = Vec::new();
		data.try_reserve_exact(count as usize)
			.map_err(|_| Error::NoMem)?;

		match self.file_block(&ino, offset / bs, want)? {
			None => {
				// sparse range: reads back as zeros
				data.resize(count as usize, 0u8);
			}
			Some(b) => {
				let n = (count as usize).min(b.len().saturating_sub(off));
				data.extend_from_slice(&b[off..off + n]);
				count = n as u64;
			}
		}

		let eof = offset + count == ino.size;
		Ok((data, eof))
	}
}
