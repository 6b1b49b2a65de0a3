use std::io::{BufRead, Error, ErrorKind, Result, Seek, SeekFrom};

use bincode::{
	config::{Configuration, Fixint, LittleEndian, NoLimit},
	Decode,
};

/// Decodes on-disk structures from a seekable byte source.
///
/// Every multi-byte field is read little-endian, the byte order of the FFS
/// images this crate serves; host byte order never enters the picture.
pub struct Decoder<T: BufRead> {
	inner:  T,
	config: Configuration<LittleEndian, Fixint, NoLimit>,
}

impl<T: BufRead> Decoder<T> {
	pub fn new(inner: T) -> Self {
		let config = bincode::config::standard()
			.with_fixed_int_encoding()
			.with_little_endian();
		Self {
			inner,
			config,
		}
	}

	pub fn decode<X: Decode>(&mut self) -> Result<X> {
		bincode::decode_from_std_read(&mut self.inner, self.config)
			.map_err(|_| Error::new(ErrorKind::InvalidInput, "failed to decode"))
	}

	pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
		self.inner.read_exact(buf)
	}
}

impl<T: BufRead + Seek> Decoder<T> {
	pub fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<()> {
		self.seek(pos)?;
		self.read(buf)
	}

	pub fn decode_at<X: Decode>(&mut self, pos: u64) -> Result<X> {
		self.seek(pos)?;
		self.decode()
	}

	pub fn seek(&mut self, pos: u64) -> Result<()> {
		self.inner.seek(SeekFrom::Start(pos))?;
		Ok(())
	}
}
