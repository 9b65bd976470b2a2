//! Recolorize CLI Tool
//!
//! Command-line interface for recoloring the main object of photos with the
//! recolorize library.

#[cfg(feature = "cli")]
use recolorize::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
