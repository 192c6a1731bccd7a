//! `fsptool`: a demonstration CLI over `fsphost`'s security and mount-point
//! building blocks. Covers three sub-commands (`lsvol`, `id`, `perm`) without
//! building out their full option grammar — there is no driver to query for
//! real mounted volumes outside a live Windows session, so `lsvol` reports
//! in-use drive letters as this process sees them.
//!
//! A `clap::Parser` derive, `env_logger::init()`, then a dispatch on the
//! parsed command.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fsptool", version, author)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List volume-device aliases (drive letters currently in use).
    Lsvol,
    /// Translate a POSIX uid/gid into its mapped SID.
    Id { uid: u32 },
    /// Print a POSIX `uid:gid:mode` triple as a security descriptor summary.
    Perm { identity: String },
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let code = match args.command {
        Command::Lsvol => run_lsvol(),
        Command::Id { uid } => run_id(uid),
        Command::Perm { identity } => run_perm(&identity),
    };
    std::process::exit(code);
}

fn run_lsvol() -> i32 {
    for letter in 'A'..='Z' {
        if drive_letter_in_use(letter) {
            println!(r"\\.\{letter}:");
        }
    }
    0
}

fn run_id(uid: u32) -> i32 {
    match fsphost::translate_identity(uid) {
        Some(sid) => {
            println!("{sid}");
            0
        }
        None => {
            eprintln!("fsptool: id: no SID mapped for uid {uid}");
            1
        }
    }
}

fn run_perm(identity: &str) -> i32 {
    let parts: Vec<&str> = identity.splitn(3, ':').collect();
    let [uid, gid, mode] = match parts[..] {
        [uid, gid, mode] => [uid, gid, mode],
        _ => {
            eprintln!("fsptool: perm: expected UID:GID:MODE, got {identity:?}");
            return 2;
        }
    };
    let (Ok(uid), Ok(gid), Ok(mode)) = (uid.parse::<u32>(), gid.parse::<u32>(), u32::from_str_radix(mode, 8)) else {
        eprintln!("fsptool: perm: expected UID:GID:MODE, got {identity:?}");
        return 2;
    };
    let sd = fsphost::build_security_descriptor(fsphost::PosixIdentity { uid, gid, mode });
    println!("{}", fsphost::describe_security(&sd));
    0
}

#[cfg(windows)]
fn drive_letter_in_use(letter: char) -> bool {
    use windows_sys::Win32::Storage::FileSystem::GetLogicalDrives;
    let index = (letter.to_ascii_uppercase() as u8).saturating_sub(b'A');
    // SAFETY: no arguments, returns a plain bitmask.
    let mask = unsafe { GetLogicalDrives() };
    mask & (1 << index) != 0
}

#[cfg(not(windows))]
fn drive_letter_in_use(_letter: char) -> bool {
    false
}
