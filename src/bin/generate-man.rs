// Generates man pages for ridgeline and its subcommands.
// Usage: generate-man [output-dir]   (defaults to ./man)

use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;

use ridgeline::cli::Cli;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();

    let mut buffer: Vec<u8> = Vec::new();
    Man::new(cmd.clone()).render(&mut buffer)?;
    std::fs::write(out_dir.join("ridgeline.1"), &buffer)?;

    for sub in cmd.get_subcommands() {
        let mut buffer: Vec<u8> = Vec::new();
        Man::new(sub.clone()).render(&mut buffer)?;
        std::fs::write(
            out_dir.join(format!("ridgeline-{}.1", sub.get_name())),
            &buffer,
        )?;
    }

    println!("Wrote man pages to {}", out_dir.display());
    Ok(())
}
