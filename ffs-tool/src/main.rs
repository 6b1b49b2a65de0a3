use std::{
	ffi::OsStr,
	io::{self, Write},
	os::unix::ffi::OsStrExt,
};

use anyhow::{Context, Result};
use clap::Parser;
use rffs::{AuthUnix, Backend, BlockReader, Ffs, Nfs3Entry, Nfs3Handle};

use crate::cli::{Cli, Command};

mod cli;

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::builder()
		.filter_level(cli.verbose.log_level_filter())
		.init();

	let file = BlockReader::open(&cli.image).context("failed to open image")?;
	let mut fs = Ffs::with_options(file, cli.options()).context("failed to mount image")?;
	log::debug!("mounted {}", cli.image.display());
	let au = cli.auth();

	match &cli.command {
		Command::Info => info(&fs),
		Command::Ls { path } => ls(&mut fs, &au, path),
		Command::Cat { path } => cat(&mut fs, &au, path),
		Command::Stat { path } => stat(&mut fs, &au, path),
		Command::Readlink { path } => readlink(&mut fs, &au, path),
	}
}

/// Walk an absolute path from the root directory, one lookup per component.
fn resolve<R: Backend>(fs: &mut Ffs<R>, au: &AuthUnix, path: &OsStr) -> Result<Nfs3Handle> {
	let mut h = fs.root();
	for comp in path.as_bytes().split(|b| *b == b'/') {
		if comp.is_empty() {
			continue;
		}
		let name = OsStr::from_bytes(comp);
		h = fs
			.lookup(au, &h, name)
			.with_context(|| format!("lookup of {:?} failed", name.to_string_lossy()))?;
	}
	Ok(h)
}

fn info<R: Backend>(fs: &Ffs<R>) -> Result<()> {
	let info = fs.info();
	println!("block size:      {}", info.bsize);
	println!("fragment size:   {}", info.fsize);
	println!("blocks:          {}", info.nblock);
	println!("fragments:       {}", info.nfrag);
	println!("data fragments:  {}", info.ndfrag);
	println!("cylinder groups: {}", info.ncg);
	Ok(())
}

fn ls<R: Backend>(fs: &mut Ffs<R>, au: &AuthUnix, path: &OsStr) -> Result<()> {
	let h = resolve(fs, au, path)?;
	let mut cookie = 0;
	loop {
		let mut entries = Vec::new();
		let eof = fs.readdir(au, &h, cookie, &mut |e: &Nfs3Entry<'_>| {
			entries.push((e.fileid, e.name.to_owned(), e.cookie));
			true
		})?;
		for (fileid, name, _) in &entries {
			println!("{fileid}\t{}", name.to_string_lossy());
		}
		match entries.last() {
			Some(last) if !eof => cookie = last.2,
			_ => break,
		}
	}
	Ok(())
}

fn cat<R: Backend>(fs: &mut Ffs<R>, au: &AuthUnix, path: &OsStr) -> Result<()> {
	let h = resolve(fs, au, path)?;
	let mut out = io::stdout().lock();
	let mut offset = 0;
	loop {
		let (data, eof) = fs.readfile(au, &h, 1 << 16, offset)?;
		out.write_all(&data)?;
		offset += data.len() as u64;
		if eof || data.is_empty() {
			break;
		}
	}
	Ok(())
}

fn stat<R: Backend>(fs: &mut Ffs<R>, au: &AuthUnix, path: &OsStr) -> Result<()> {
	let h = resolve(fs, au, path)?;
	let attr = fs.getattr(au, &h)?;
	println!("fileid: {}", attr.fileid);
	println!("type:   {:?}", attr.kind);
	println!("mode:   {:04o}", attr.mode);
	println!("nlink:  {}", attr.nlink);
	println!("uid:    {}", attr.uid);
	println!("gid:    {}", attr.gid);
	println!("size:   {}", attr.size);
	println!("used:   {}", attr.used);
	println!("rdev:   {}, {}", attr.major, attr.minor);
	println!("atime:  {}.{:09}", attr.atime.sec, attr.atime.nsec);
	println!("mtime:  {}.{:09}", attr.mtime.sec, attr.mtime.nsec);
	println!("ctime:  {}.{:09}", attr.ctime.sec, attr.ctime.nsec);
	Ok(())
}

fn readlink<R: Backend>(fs: &mut Ffs<R>, au: &AuthUnix, path: &OsStr) -> Result<()> {
	let h = resolve(fs, au, path)?;
	let target = fs.readlink(au, &h)?;
	let mut out = io::stdout().lock();
	out.write_all(target.as_bytes())?;
	out.write_all(b"\n")?;
	Ok(())
}
