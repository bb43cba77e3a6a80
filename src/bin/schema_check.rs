//! Schema Check CLI
//!
//! Loads a schema document, reports the first error, and can dump the
//! resulting schema or its class order.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use class_schema::config::OutputFormat;
use class_schema::{Loader, Schema, SchemaConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-check")]
#[command(about = "Validate class-hierarchy schema documents")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema document
    Check {
        /// Schema document (.toml or .json)
        schema: PathBuf,
    },

    /// Print the loaded schema as JSON
    Dump {
        schema: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print classes in generation order, one `group<TAB>class` per line
    Order { schema: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = config_path(cli.config.as_deref())?;
    let config = SchemaConfig::load_from(config_path).context("failed to load configuration")?;
    let loader = Loader::new(config.load_options());

    match cli.command {
        Commands::Check { schema } => {
            let loaded = load(&loader, &schema)?;
            println!(
                "✅ {} - {} classes in {} groups",
                schema.display(),
                loaded.len(),
                loaded.groups().len()
            );
            if let Some(root) = loaded.root() {
                println!("   root: {}", root.name);
            }
            if !loaded.includes.is_empty() {
                println!("   includes: {}", loaded.includes.iter().cloned().collect::<Vec<_>>().join(", "));
            }
            for cls in &loaded {
                let marker = if cls.is_final() { "" } else { " (abstract)" };
                println!("   - {}{}", cls.name, marker);
            }
            Ok(())
        }

        Commands::Dump { schema, output } => {
            let loaded = load(&loader, &schema)?;
            let json = match config.output.format {
                OutputFormat::Pretty => serde_json::to_string_pretty(&loaded)?,
                OutputFormat::Compact => serde_json::to_string(&loaded)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("📄 Schema written to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }

        Commands::Order { schema } => {
            let loaded = load(&loader, &schema)?;
            for cls in &loaded {
                println!("{}\t{}", cls.group, cls.name);
            }
            Ok(())
        }
    }
}

/// `--config` as the `&str` the config layer takes
fn config_path(path: Option<&Path>) -> anyhow::Result<Option<&str>> {
    path.map(|p| {
        p.to_str()
            .with_context(|| format!("config path is not valid UTF-8: {}", p.display()))
    })
    .transpose()
}

fn load(loader: &Loader, path: &Path) -> anyhow::Result<Schema> {
    loader
        .load_file(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_passes_utf8() {
        assert_eq!(config_path(None).unwrap(), None);
        assert_eq!(
            config_path(Some(Path::new("conf/class-schema.toml"))).unwrap(),
            Some("conf/class-schema.toml")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_config_path_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"conf/\xff.toml"));
        let err = config_path(Some(path)).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
