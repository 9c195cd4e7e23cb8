use std::io::Write;

use anyhow::{Context, Result};
use minivsfs::image::FormatOptions;
use minivsfs::ops::{add_to_image, format_image, open_image};
use minivsfs::{FsError, Image, NodeKind};
use tracing::{debug, info, warn};

use crate::cli::{AddArgs, CatArgs, CheckArgs, FormatArgs, LsArgs};

/// Outcome of a command that completed without an operational error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    IssuesFound,
}

pub fn format(args: &FormatArgs) -> Result<Status> {
    let options = FormatOptions { seed: args.seed };
    let report = format_image(&args.image, args.size_kib, args.inodes, &options)?;
    for region in report.layout.regions() {
        debug!(
            region = region.name,
            start = region.start,
            end = region.end(),
            "region"
        );
    }
    Ok(Status::Ok)
}

pub fn add(args: &AddArgs) -> Result<Status> {
    add_to_image(&args.input, &args.output, &args.file)?;
    Ok(Status::Ok)
}

/// `ls` prints one line per root entry: inode, kind, size, optional digest, name.
pub fn ls(args: &LsArgs, out: &mut impl Write) -> Result<Status> {
    let image = open_image(&args.image)?;
    for entry in image.list_root()? {
        let kind = match entry.node_kind() {
            Some(NodeKind::Dir) => "dir",
            Some(NodeKind::File) => "file",
            None => "?",
        };
        let size = match image.inode(entry.inode) {
            Ok(inode) => inode.size_bytes.to_string(),
            Err(err) => {
                warn!("{}: entry '{}': {err}", args.image.display(), entry.name_lossy());
                "-".to_owned()
            }
        };
        if args.digest && entry.node_kind() == Some(NodeKind::File) {
            let digest = match image.file_metadata(entry.inode) {
                Ok(meta) => meta.checksum_hex(),
                Err(err) => {
                    warn!("{}: entry '{}': {err}", args.image.display(), entry.name_lossy());
                    "-".to_owned()
                }
            };
            writeln!(
                out,
                "{:>4} {kind:<4} {size:>8} {digest} {}",
                entry.inode,
                entry.name_lossy()
            )?;
        } else {
            writeln!(
                out,
                "{:>4} {kind:<4} {size:>8} {}",
                entry.inode,
                entry.name_lossy()
            )?;
        }
    }
    Ok(Status::Ok)
}

pub fn cat(args: &CatArgs, out: &mut impl Write) -> Result<Status> {
    let image = open_image(&args.image)?;
    let ino = image
        .lookup(args.name.as_bytes())
        .with_context(|| format!("no entry named '{}' in {}", args.name, args.image.display()))?;
    if image.inode(ino)?.kind() != Some(NodeKind::File) {
        return Err(FsError::NotFound)
            .with_context(|| format!("'{}' is not a regular file", args.name));
    }
    let data = image.read_file(ino)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &data)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote '{}' ({} bytes) -> {}", args.name, data.len(), path.display());
        }
        None => {
            out.write_all(&data)?;
            out.flush()?;
        }
    }
    Ok(Status::Ok)
}

pub fn check(args: &CheckArgs) -> Result<Status> {
    let image = open_image(&args.image)?;
    let issues = image.verify();
    if issues.is_empty() {
        info!("{}: {}", args.image.display(), clean_summary(&image));
        return Ok(Status::Ok);
    }
    for issue in &issues {
        warn!("{}: {issue}", args.image.display());
    }
    Ok(Status::IssuesFound)
}

/// `clean_summary` describes a consistent image by its remaining capacity.
fn clean_summary(image: &Image) -> String {
    let layout = image.layout();
    format!(
        "clean, free inodes={}/{} free blocks={}/{}",
        image.free_inodes(),
        layout.inode_count,
        image.free_blocks(),
        layout.data_region_blocks
    )
}

/// `error_kind` names the class of a failed command for the final error line.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<FsError>() {
        Some(e) if e.is_capacity() => "capacity",
        Some(e) if e.is_exhaustion() => "exhausted",
        Some(FsError::Config(_)) => "config",
        Some(_) => "image",
        None => "io",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn format_into(dir: &Path) -> std::path::PathBuf {
        let image = dir.join("fs.img");
        let args = FormatArgs {
            image: image.clone(),
            size_kib: 256,
            inodes: 128,
            seed: 7,
        };
        assert_eq!(format(&args).expect("format"), Status::Ok);
        image
    }

    fn add_host_file(image: &Path, file: &Path) {
        let args = AddArgs {
            input: image.to_path_buf(),
            output: image.to_path_buf(),
            file: file.to_path_buf(),
        };
        assert_eq!(add(&args).expect("add"), Status::Ok);
    }

    #[test]
    fn ls_lists_dot_entries_and_added_files() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let host = dir.path().join("hello.txt");
        std::fs::write(&host, b"hello").expect("write");
        add_host_file(&image, &host);

        let mut out = Vec::new();
        let args = LsArgs {
            image,
            digest: false,
        };
        ls(&args, &mut out).expect("ls");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" ."));
        assert!(lines[1].ends_with(" .."));
        assert!(lines[2].contains("file"));
        assert!(lines[2].ends_with(" hello.txt"));
    }

    #[test]
    fn ls_digest_prints_sha256() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let host = dir.path().join("abc");
        std::fs::write(&host, b"abc").expect("write");
        add_host_file(&image, &host);

        let mut out = Vec::new();
        ls(&LsArgs { image, digest: true }, &mut out).expect("ls");
        let text = String::from_utf8(out).expect("utf8");
        assert!(
            text.contains("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn cat_streams_contents_or_writes_file() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let host = dir.path().join("data.bin");
        let payload: Vec<u8> = (0..9000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&host, &payload).expect("write");
        add_host_file(&image, &host);

        let mut out = Vec::new();
        let args = CatArgs {
            image: image.clone(),
            name: "data.bin".into(),
            output: None,
        };
        cat(&args, &mut out).expect("cat");
        assert_eq!(out, payload);

        let target = dir.path().join("copy.bin");
        let args = CatArgs {
            image,
            name: "data.bin".into(),
            output: Some(target.clone()),
        };
        cat(&args, &mut Vec::new()).expect("cat to file");
        assert_eq!(std::fs::read(target).expect("read"), payload);
    }

    #[test]
    fn cat_rejects_missing_and_directory_names() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        for name in ["missing", "."] {
            let args = CatArgs {
                image: image.clone(),
                name: name.into(),
                output: None,
            };
            let err = cat(&args, &mut Vec::new()).unwrap_err();
            assert_eq!(err.downcast_ref::<FsError>(), Some(&FsError::NotFound));
        }
    }

    #[test]
    fn check_reports_clean_and_tampered_images() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let args = CheckArgs {
            image: image.clone(),
        };
        assert_eq!(check(&args).expect("check"), Status::Ok);

        // flip a byte inside the root inode (block 3, first record)
        let mut bytes = std::fs::read(&image).expect("read");
        bytes[3 * 4096 + 40] ^= 0xFF;
        std::fs::write(&image, &bytes).expect("write");
        assert_eq!(check(&args).expect("check"), Status::IssuesFound);
    }

    #[test]
    fn clean_summary_reports_free_capacity() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let host = dir.path().join("two-blocks");
        std::fs::write(&host, vec![7u8; 4097]).expect("write");
        add_host_file(&image, &host);

        let opened = open_image(&image).expect("open");
        assert_eq!(
            clean_summary(&opened),
            "clean, free inodes=126/128 free blocks=54/57"
        );
    }

    #[test]
    fn ls_marks_entries_with_unallocated_inodes() {
        let dir = TempDir::new().expect("tempdir");
        let image = format_into(dir.path());
        let host = dir.path().join("gone");
        std::fs::write(&host, b"bye").expect("write");
        add_host_file(&image, &host);

        // clear inode 2 in the inode bitmap (block 1, bit 1)
        let mut bytes = std::fs::read(&image).expect("read");
        bytes[4096] &= !0b10;
        std::fs::write(&image, &bytes).expect("write");

        let mut out = Vec::new();
        ls(&LsArgs { image, digest: true }, &mut out).expect("ls");
        let text = String::from_utf8(out).expect("utf8");
        let line = text.lines().last().expect("entry line");
        assert!(line.contains(" - - gone"));
    }

    #[test]
    fn error_kind_classifies_failures() {
        let capacity = anyhow::Error::new(FsError::DirectoryFull);
        assert_eq!(error_kind(&capacity), "capacity");
        let exhausted = anyhow::Error::new(FsError::NoSpace { need: 3, free: 1 })
            .context("cannot add");
        assert_eq!(error_kind(&exhausted), "exhausted");
        assert_eq!(error_kind(&anyhow::Error::new(FsError::Config("x".into()))), "config");
        assert_eq!(error_kind(&anyhow::Error::new(FsError::NotFound)), "image");
        assert_eq!(error_kind(&anyhow::anyhow!("disk on fire")), "io");
    }

    #[test]
    fn format_rejects_unaligned_size() {
        let dir = TempDir::new().expect("tempdir");
        let args = FormatArgs {
            image: dir.path().join("bad.img"),
            size_kib: 182,
            inodes: 128,
            seed: 0,
        };
        let err = format(&args).unwrap_err();
        assert!(matches!(err.downcast_ref::<FsError>(), Some(FsError::Config(_))));
        assert!(!args.image.exists());
    }
}
