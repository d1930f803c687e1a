//! Build automation tasks for nftmeta
//!
//! - Generating the CLI reference from the clap definitions

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for nftmeta", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<nftmeta_cli::Cli>();

    let content = format!(
        r#"# nftmeta CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

`nftmeta` prepares an NFT collection directory for hosting. It reads the
collection (`factory.csv` + `tokens.csv`, or `factory.json`,
`defaultToken.json` and `*.token.json`), hashes every static resource,
rewrites local media to content-addressed URLs and publishes the metadata
documents.

## Installation

```bash
cargo install --path crates/nftmeta-cli
```

## Quick Start

```bash
# Map environment names to base URLs
echo '{{ "prod": "https://cdn.example.com" }}' > config.json

# Process a collection
nftmeta process ./my-collection --env prod

# Inspect a single file
nftmeta hash ./my-collection/images/product.png
nftmeta classify product.png
```

## Output

Relative to the collection directory:

- `generated_media/` - media copies named `{{hash}}.{{ext}}`
- `generated_metadata/` - factory, default token and token documents
- `upload.json` - upload plan: published documents, staged media, destination URLs

## Commands

{}

## Environment Variables

- `NFTMETA_ENV` - Environment name (same as `--env`)
- `NFTMETA_ENV_URL` - Environment base URL (same as `--env-url`)
- `NFTMETA_ENVIRONMENTS__<NAME>` - Add or override a registry entry
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`, `LOG_FILE_PREFIX`, `LOG_FILTER` - Logging

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());
    Ok(())
}
