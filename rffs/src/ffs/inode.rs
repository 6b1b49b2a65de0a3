use super::*;

impl<R: Backend> Ffs<R> {
	/// Fetch inode `inum` from its cylinder group's inode table. The
	/// returned record is a copy; it never borrows from a disk buffer.
	pub(crate) fn read_inode(&mut self, inum: u32) -> Result<Inode, Error> {
		log::trace!("read_inode({inum});");
		let i = (inum / self.sb.ipg) as usize;
		let ioff = inum % self.sb.ipg;
		if i >= self.cg.len() {
			return Err(Error::BadHandle);
		}

		let inopb = self.sb.inopb;
		let blk = self.cg[i].ibno + (ioff / inopb) as u64;
		let off = blk * self.bsize() + (ioff % inopb) as u64 * INOSZ as u64;
		let ino = self.file.decode_at(off)?;
		Ok(ino)
	}

	pub(crate) fn handle_inode(&mut self, h: &Nfs3Handle) -> Result<(u32, Inode), Error> {
		let inum = h.inum()?;
		let ino = self.read_inode(inum)?;
		Ok((inum, ino))
	}

	/// Get the attributes of the file behind `h`. Anyone can getattr.
	pub fn getattr(&mut self, _au: &AuthUnix, h: &Nfs3Handle) -> Result<Nfs3Attr, Error> {
		log::trace!("getattr({:02x?});", h.as_bytes());
		let (inum, ino) = self.handle_inode(h)?;
		ino.as_attr(inum, self.sb.bsize as u32)
	}

	/// Report which of the wanted access bits the credentials hold on the
	/// file behind `h`, along with its attributes.
	pub fn access(
		&mut self,
		au: &AuthUnix,
		h: &Nfs3Handle,
		want: Access,
	) -> Result<(Access, Nfs3Attr), Error> {
		log::trace!("access({want:?});");
		let (inum, ino) = self.handle_inode(h)?;
		let have = ino.have(au);

		let mut got = Access::empty();
		if want.contains(Access::READ) && have & AREAD != 0 {
			got |= Access::READ;
		}
		if want.contains(Access::LOOKUP) && ino.is_dir() && have & AEXEC != 0 {
			got |= Access::LOOKUP;
		}
		if want.contains(Access::EXECUTE) && !ino.is_dir() && have & AEXEC != 0 {
			got |= Access::EXECUTE;
		}

		Ok((got, ino.as_attr(inum, self.sb.bsize as u32)?))
	}
}
