use std::io::Write;
use std::path::Path;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use vromfs::{decode_blk, parse_container, resolve_dictionary, Dict, Entry, Options};

#[derive(Parser, Debug)]
#[command(name = "vromfs CLI")]
#[command(about, author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a list of entry names in the container
    #[command(arg_required_else_help = true)]
    Ls {
        /// ".vromfs.bin" file
        file: String,
    },
    /// Print parsed header, framing and directory statistics
    #[command(arg_required_else_help = true)]
    Debug {
        /// ".vromfs.bin" file
        file: String,
    },
    /// Extract every entry to an output directory
    #[command(arg_required_else_help = true)]
    Extract {
        /// ".vromfs.bin" file
        file: String,
        /// Outbound directory
        #[arg(short, long, value_name = "DIR")]
        out: Option<String>,
        /// Overwrite files without prompting
        #[arg(short, long, default_value_t = false, value_name = "TRUE|FALSE")]
        force: bool,
    },
    /// Emit a JSON index of entry names and content digests
    #[command(arg_required_else_help = true)]
    Metadata {
        /// ".vromfs.bin" file
        file: String,
        /// Output JSON file
        #[arg(short, long, value_name = "FILE")]
        out: String,
    },
}

#[derive(Serialize)]
struct MetadataOutput {
    version: u32,
    filelist: Vec<MetadataEntry>,
}

#[derive(Serialize)]
struct MetadataEntry {
    filename: String,
    hash: String,
}

pub fn main() -> Result<()> {
    let stdout = console::Term::stdout();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ls { file } => command_ls(stdout, file)?,
        Commands::Debug { file } => command_debug(stdout, file)?,
        Commands::Extract { file, out, force } => command_extract(file, out, force)?,
        Commands::Metadata { file, out } => command_metadata(file, out)?,
    }

    Ok(())
}

fn read_container(file: &str) -> Result<vromfs::Container> {
    let bytes = std::fs::read(file).into_diagnostic()?;
    parse_container(&bytes, &Options::default()).into_diagnostic()
}

fn command_ls(stdout: console::Term, file: String) -> Result<()> {
    let container = read_container(&file)?;
    for entry in &container.directory.entries {
        stdout.write_line(&entry.name).into_diagnostic()?;
    }
    Ok(())
}

fn command_debug(stdout: console::Term, file: String) -> Result<()> {
    let container = read_container(&file)?;

    let text = format!(
        "Magic: {:?}\nPlatform: {:?}\nExtended header: {:#?}\nFraming: {:?}\nDigest present: {}\nTail length: {}\nEntries: {}",
        container.header.magic,
        container.header.platform_tag,
        container.ext_header,
        container.framing,
        container.digest.is_some(),
        container.tail.len(),
        container.directory.entries.len(),
    );
    stdout.write_line(&text).into_diagnostic()?;

    for (index, entry) in container.directory.entries.iter().enumerate() {
        let text = format!(
            "Index: {index};\nName: {};\nSize: {} bytes;",
            entry.name,
            entry.payload.len()
        );
        stdout.write_line(&text).into_diagnostic()?;
    }

    Ok(())
}

fn command_extract(file: String, out: Option<String>, force: bool) -> Result<()> {
    let out = out.unwrap_or_else(|| format!("{file}_u"));
    std::fs::create_dir_all(&out).into_diagnostic()?;

    let container = read_container(&file)?;
    let dict = resolve_dictionary(&container.directory).into_diagnostic()?;

    let bar = indicatif::ProgressBar::new(container.directory.entries.len() as u64);
    bar.set_style(get_bar_style()?);

    for entry in &container.directory.entries {
        bar.set_message(entry.name.clone());

        let path = Path::new(&out).join(&entry.name);
        if !force && path.exists() {
            let message = format!("File \"{}\" exists. Overwrite it?", path.display());
            if !dialoguer::Confirm::new()
                .with_prompt(message)
                .interact()
                .into_diagnostic()?
            {
                bar.inc(1);
                continue;
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }

        let payload = extracted_payload(entry, dict.as_ref())?;
        let mut output = std::fs::File::create(path).into_diagnostic()?;
        output.write_all(&payload).into_diagnostic()?;
        bar.inc(1);
    }

    bar.finish();
    Ok(())
}

fn command_metadata(file: String, out: String) -> Result<()> {
    let container = read_container(&file)?;

    let filelist = container
        .directory
        .entries
        .iter()
        .map(|entry| MetadataEntry {
            filename: entry.name.to_lowercase(),
            hash: hex_digest(&entry.payload),
        })
        .collect();

    let output = MetadataOutput {
        version: 1,
        filelist,
    };

    let file = std::fs::File::create(out).into_diagnostic()?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &output).into_diagnostic()?;
    writer.flush().into_diagnostic()?;
    Ok(())
}

/// Runs `.blk` entries through [`decode_blk`]; everything else is extracted
/// as its raw, container-level payload.
fn extracted_payload(entry: &Entry, dict: Option<&Dict>) -> Result<Vec<u8>> {
    if entry.name.ends_with(".blk") {
        decode_blk(entry, dict, Options::default().max_decompressed_size).into_diagnostic()
    } else {
        Ok(entry.payload.clone())
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    use md5::{Digest, Md5};
    let digest = Md5::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn get_bar_style() -> Result<indicatif::ProgressStyle> {
    Ok(
        indicatif::ProgressStyle::with_template("[{bar:32}] {pos:>7}/{len:7} {msg}")
            .into_diagnostic()?
            .progress_chars("=>-"),
    )
}
