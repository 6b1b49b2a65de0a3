use std::{
	fs::File,
	io::{self, BufRead, Read, Result as IoResult, Seek, SeekFrom},
	os::unix::fs::MetadataExt,
	path::Path,
};

pub trait Backend: Read + Seek {}

impl<T: Read + Seek> Backend for T {}

/// Block-level Abstraction Layer.
///
/// `BlockReader` maps random access reads onto block-sized reads of the
/// backing medium. The medium is never written.
pub struct BlockReader<T: Backend> {
	inner: T,
	block: Vec<u8>,
	idx:   usize,
}

impl BlockReader<File> {
	pub fn open(path: &Path) -> IoResult<Self> {
		let file = File::open(path)?;
		let bs = file.metadata()?.blksize() as usize;
		Ok(BlockReader::new(file, bs))
	}
}

impl<T: Backend> BlockReader<T> {
	pub fn new(inner: T, bs: usize) -> Self {
		let block = vec![0u8; bs];
		Self {
			inner,
			block,
			idx: bs,
		}
	}

	fn refill(&mut self) -> IoResult<()> {
		self.block.fill(0u8);
		let mut num = 0;
		while num < self.block.len() {
			match self.inner.read(&mut self.block[num..])? {
				0 => break,
				n => num += n,
			}
		}
		if num == 0 {
			return Err(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				"read past end of medium",
			));
		}
		if num < self.block.len() {
			// Tail block of the medium; the rest stays zeroed.
			log::warn!("BlockReader::refill(): short read, num={num}");
		}
		self.idx = 0;
		Ok(())
	}

	fn buffered(&self) -> usize {
		self.block.len() - self.idx
	}

	fn refill_if_empty(&mut self) -> IoResult<()> {
		if self.buffered() == 0 {
			self.refill()?;
		}
		Ok(())
	}

	/// Get the underlying block size.
	pub fn blksize(&self) -> usize {
		self.block.len()
	}
}

impl<T: Backend> Read for BlockReader<T> {
	fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
		self.refill_if_empty()?;
		let num = buf.len().min(self.buffered());
		let buf = &mut buf[0..num];
		buf.copy_from_slice(&self.block[self.idx..(self.idx + num)]);
		self.idx += num;
		Ok(num)
	}
}

impl<T: Backend> BufRead for BlockReader<T> {
	fn fill_buf(&mut self) -> IoResult<&[u8]> {
		self.refill_if_empty()?;
		Ok(&self.block[self.idx..])
	}

	fn consume(&mut self, amt: usize) {
		assert!(amt <= self.buffered());
		self.idx += amt;
	}
}

impl<T: Backend> Seek for BlockReader<T> {
	fn seek(&mut self, pos: SeekFrom) -> IoResult<u64> {
		let bs = self.blksize() as u64;
		match pos {
			SeekFrom::Start(pos) => {
				let real = self.inner.seek(SeekFrom::Start(pos / bs * bs))?;
				let rem = pos - real;
				assert!(rem < bs);

				self.refill()?;
				self.idx = rem as usize;

				Ok(real + rem)
			}
			SeekFrom::Current(offset) => {
				let real = self.inner.stream_position()?;
				let cur = real as i64 - self.block.len() as i64 + self.idx as i64;
				let newidx = offset + self.idx as i64;
				if newidx >= 0 && newidx < self.blksize() as i64 {
					// The data is already buffered; just adjust the pointer
					self.idx = newidx as usize;
					Ok((cur + offset) as u64)
				} else if cur + offset < 0 {
					Err(io::Error::new(
						io::ErrorKind::InvalidInput,
						"seek before start of medium",
					))
				} else {
					self.seek(SeekFrom::Start((cur + offset) as u64))
				}
			}
			SeekFrom::End(_) => Err(io::Error::new(
				io::ErrorKind::Unsupported,
				"SeekFrom::End",
			)),
		}
	}
}
