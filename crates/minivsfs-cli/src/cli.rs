use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "minivsfs", author, version, about = "Build and inspect MiniVSFS images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a fresh image holding only the root directory.
    Format(FormatArgs),

    /// Copy a host file into the root directory of an image.
    Add(AddArgs),

    /// List the root directory.
    Ls(LsArgs),

    /// Print a stored file's contents.
    Cat(CatArgs),

    /// Recompute checksums and cross-check allocation state.
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    #[arg(long, env = "MINIVSFS_IMAGE")]
    pub image: PathBuf,

    #[arg(long, env = "MINIVSFS_SIZE_KIB")]
    pub size_kib: u64,

    #[arg(long, env = "MINIVSFS_INODES")]
    pub inodes: u64,

    #[arg(long, env = "MINIVSFS_SEED", default_value_t = 0)]
    pub seed: u64,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long, env = "MINIVSFS_INPUT")]
    pub input: PathBuf,

    #[arg(long, env = "MINIVSFS_OUTPUT")]
    pub output: PathBuf,

    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct LsArgs {
    #[arg(long, env = "MINIVSFS_IMAGE")]
    pub image: PathBuf,

    /// Also print each file's SHA-256 digest.
    #[arg(long)]
    pub digest: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CatArgs {
    #[arg(long, env = "MINIVSFS_IMAGE")]
    pub image: PathBuf,

    #[arg(long)]
    pub name: String,

    /// Write to this path instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(long, env = "MINIVSFS_IMAGE")]
    pub image: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_with_default_seed() {
        let cli = Cli::try_parse_from([
            "minivsfs", "format", "--image", "fs.img", "--size-kib", "180", "--inodes", "128",
        ])
        .expect("parse");
        let Command::Format(args) = cli.command else {
            panic!("expected format");
        };
        assert_eq!(args.image, PathBuf::from("fs.img"));
        assert_eq!(args.size_kib, 180);
        assert_eq!(args.inodes, 128);
        assert_eq!(args.seed, 0);
    }

    #[test]
    fn parses_add() {
        let cli = Cli::try_parse_from([
            "minivsfs", "add", "--input", "a.img", "--output", "b.img", "--file", "notes.txt",
        ])
        .expect("parse");
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.input, PathBuf::from("a.img"));
        assert_eq!(args.output, PathBuf::from("b.img"));
        assert_eq!(args.file, PathBuf::from("notes.txt"));
    }

    #[test]
    fn parses_read_side_commands() {
        let cli = Cli::try_parse_from(["minivsfs", "ls", "--image", "fs.img", "--digest"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Ls(LsArgs { digest: true, .. })));

        let cli = Cli::try_parse_from(["minivsfs", "cat", "--image", "fs.img", "--name", "x"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Cat(CatArgs { output: None, .. })));

        let cli = Cli::try_parse_from(["minivsfs", "check", "--image", "fs.img"]).expect("parse");
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn rejects_non_numeric_size() {
        let err = Cli::try_parse_from([
            "minivsfs", "format", "--image", "fs.img", "--size-kib", "big", "--inodes", "128",
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_missing_file_argument() {
        let err = Cli::try_parse_from(["minivsfs", "add", "--input", "a", "--output", "b"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
