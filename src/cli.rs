use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tree-squeeze",
    about = "Compress every JPEG and PNG under a directory with TinyPNG, in place",
    long_about = "tree-squeeze walks a directory tree depth-first, detects JPEG and PNG files by \
                  their content, sends each one to the TinyPNG (Tinify) service and overwrites it \
                  with the compressed result. Settings are read from .env, then .env.local, then \
                  the environment, then the flags below. Running without flags is the normal mode.",
    version,
    after_help = "ENVIRONMENT:\n  \
    API_KEY               TinyPNG API key\n  \
    ROOT_DIRECTORY        Directory to process\n  \
    REQUEST_TIMEOUT_SECS  Deadline for each request to the service\n\n\
    EXAMPLES:\n  \
    tree-squeeze\n  \
    tree-squeeze --root ./public/images --verbose"
)]
pub struct Args {
    #[arg(
        long,
        env = "API_KEY",
        hide_env_values = true,
        help = "TinyPNG API key"
    )]
    pub api_key: Option<String>,

    #[arg(
        short = 'r',
        long = "root",
        env = "ROOT_DIRECTORY",
        help = "Root directory to process",
        long_help = "Directory whose JPEG and PNG files are compressed in place, \
                     including every subdirectory."
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "timeout",
        env = "REQUEST_TIMEOUT_SECS",
        help = "Per-request timeout in seconds (default: 60)",
        long_help = "Deadline for each request to the compression service. \
                     A request that exceeds it counts as a failed image."
    )]
    pub timeout: Option<u64>,

    #[arg(short = 'q', long, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        conflicts_with = "quiet",
        help = "Also print skipped entries and per-image sizes"
    )]
    pub verbose: bool,
}
