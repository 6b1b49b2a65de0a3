use super::*;

impl<R: Backend> Ffs<R> {
	/// Read the target of the symbolic link behind `h`. Short targets live
	/// inline in the inode's pointer bytes; longer ones occupy the first
	/// data block.
	pub fn readlink(&mut self, au: &AuthUnix, h: &Nfs3Handle) -> Result<OsString, Error> {
		log::trace!("readlink({:02x?});", h.as_bytes());
		let (_, ino) = self.handle_inode(h)?;
		ino.check_perm(au, AREAD)?;

		if ino.size > MAXSYMLINKLEN {
			return Err(symlink_err("oversized symlink"));
		}
		let len = ino.size as usize;

		if ino.blocks != 0 {
			let Some(b) = self.file_block(&ino, 0, len)? else {
				return Err(symlink_err("symlink without data"));
			};
			let text = &b[0..len];
			if text.contains(&0) {
				return Err(symlink_err("symlink target contains NUL"));
			}
			return Ok(OsString::from_vec(text.to_vec()));
		}

		// fast symlink: the target overlays the pointer arrays
		if len > SLLEN {
			return Err(symlink_err("fast symlink too long"));
		}
		let sl = ino.shortlink();
		Ok(OsString::from_vec(sl[0..len].to_vec()))
	}
}

fn symlink_err(msg: &'static str) -> Error {
	Error::Io(io::Error::new(io::ErrorKind::InvalidData, msg))
}
