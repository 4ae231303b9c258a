use clap::Parser;
use std::path::PathBuf;

/// Reachability-filtered CVE scanner for dynamically linked Debian/Ubuntu
/// executables.
#[derive(Parser, Debug)]
#[command(name = "goscan")]
#[command(about = "Trace a program's shared-library usage and cross-reference known CVEs")]
#[command(version)]
pub struct Cli {
    /// Directory holding trace output, logs, and the VulnStore file.
    /// Defaults to the platform cache dir.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding the flat-text CVE corpus.
    #[arg(long, value_name = "PATH")]
    pub corpus_dir: Option<PathBuf>,

    /// Host Ubuntu codename, overriding `lsb_release` detection.
    #[arg(long, value_name = "CODENAME")]
    pub codename: Option<String>,

    /// The target program and its arguments.
    #[arg(trailing_var_arg = true, required = true)]
    pub target: Vec<String>,
}
