use std::{ffi::OsString, path::PathBuf};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rffs::{AuthUnix, MountOptions};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
	/// Path to the filesystem image
	pub image: PathBuf,

	#[command(flatten)]
	pub verbose: Verbosity<WarnLevel>,

	/// Numeric uid presented to the permission checks
	#[arg(short, long, default_value_t = 0)]
	pub uid: u32,

	/// Numeric gid presented to the permission checks
	#[arg(short, long, default_value_t = 0)]
	pub gid: u32,

	/// Supplementary groups presented to the permission checks
	#[arg(short = 'G', long, value_delimiter(','))]
	pub groups: Vec<u32>,

	/// Validate every cylinder group while mounting
	#[arg(long)]
	pub strict: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Print the filesystem geometry
	Info,
	/// List a directory
	Ls {
		#[arg(default_value = "/")]
		path: OsString,
	},
	/// Write a file's contents to stdout
	Cat { path: OsString },
	/// Print a file's attributes
	Stat { path: OsString },
	/// Print a symbolic link's target
	Readlink { path: OsString },
}

impl Cli {
	pub fn auth(&self) -> AuthUnix {
		AuthUnix::new(self.uid, self.gid, self.groups.clone())
	}

	pub fn options(&self) -> MountOptions {
		MountOptions {
			check_groups: self.strict,
		}
	}
}
