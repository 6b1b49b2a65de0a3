//! Read-only interpreter for the classic Berkeley Fast File System
//! (FFS/UFS1), exposed through NFS3-style operations: resolve the root,
//! get attributes, check access, look up a name, list a directory, read a
//! file, read a symbolic link.

mod blockreader;
mod data;
mod decoder;
mod ffs;
mod inode;
mod nfs3;

pub use crate::{
	blockreader::{Backend, BlockReader},
	ffs::{Ffs, Info, MountOptions},
	nfs3::{
		Access, AuthUnix, EntryPacker, Error, Nfs3Attr, Nfs3Entry, Nfs3FileType, Nfs3Handle,
		Nfs3Time, NFS3_FHSIZE,
	},
};
