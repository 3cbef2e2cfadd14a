//! Command-line interface for the harvester.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{DeletionPolicy, HarvestConfig};
use crate::error::{HarvesterError, Result};
use crate::formats::MetadataFormatRegistry;
use crate::harvester::Harvester;
use crate::http::HttpFetcher;
use crate::identify::fetch_repository_name;
use crate::output::{self, OutputFormat};

/// OAI-PMH Harvester - Harvest metadata records and map them to canonical documents.
#[derive(Parser)]
#[command(name = "oaipmh-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest records and write them as canonical documents.
    Harvest(HarvestArgs),

    /// List the metadata formats a repository offers.
    Formats {
        /// OAI-PMH endpoint URL
        host_url: String,
    },

    /// Print the display name of a repository.
    Identify {
        /// OAI-PMH endpoint URL
        host_url: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct HarvestArgs {
    /// YAML file with harvest settings; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OAI-PMH endpoint URL
    #[arg(long)]
    pub host: Option<String>,

    /// Metadata prefix (e.g. oai_dc, oai_datacite)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Only records changed on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only records changed on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Only records in this set
    #[arg(long)]
    pub set: Option<String>,

    /// Logo URL added to every document
    #[arg(long)]
    pub logo_url: Option<String>,

    /// View URL template; `{identifier}` is replaced by the record identifier
    #[arg(long)]
    pub view_url: Option<String>,

    /// Classify each record by its declared schema
    #[arg(long)]
    pub mixed_schemas: bool,

    /// Emit tombstone documents for deleted records
    #[arg(long)]
    pub emit_tombstones: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output file extension, else json)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl HarvestArgs {
    /// Merge the configuration file with the command-line flags.
    pub fn to_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_yaml_file(path)?,
            None => HarvestConfig::default(),
        };

        let overrides = [
            (&mut config.host_url, &self.host),
            (&mut config.metadata_prefix, &self.prefix),
            (&mut config.from, &self.from),
            (&mut config.until, &self.until),
            (&mut config.set, &self.set),
            (&mut config.logo_url, &self.logo_url),
            (&mut config.view_url, &self.view_url),
        ];
        for (field, value) in overrides {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        if self.mixed_schemas {
            config.mixed_schemas = true;
        }
        if self.emit_tombstones {
            config.deletion_policy = DeletionPolicy::EmitTombstone;
        }

        Ok(config.normalized())
    }

    fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_else(|| {
            self.output
                .as_deref()
                .map(OutputFormat::from_path)
                .unwrap_or_default()
        })
    }
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Harvest(args) => harvest_command(&args),
        Commands::Formats { host_url } => formats_command(&host_url),
        Commands::Identify { host_url } => identify_command(&host_url),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the harvest command.
fn harvest_command(args: &HarvestArgs) -> Result<()> {
    // Validate local settings before making HTTP requests
    let config = args.to_config()?;
    config.validate_dates()?;
    let Some(host) = config.host().map(str::to_string) else {
        return Err(HarvesterError::config("No host URL configured", Vec::new()));
    };

    eprintln!(
        "{} {} ({})",
        style("Harvesting").bold(),
        style(&host).cyan(),
        style(config.prefix().unwrap_or("no prefix")).green()
    );

    let pb = spinner();
    pb.set_message("Resolving metadata formats...");

    let mut harvester = Harvester::new(HttpFetcher::new()?, config);
    pb.set_message(format!("Harvesting {}...", harvester.provider_name()));

    let mut documents = Vec::new();
    let report = harvester.harvest_each(|doc| {
        documents.push(doc);
        pb.set_message(format!("Harvested {} documents", documents.len()));
        Ok(())
    });
    pb.finish_and_clear();
    let report = report?;

    eprintln!("  Repository: {}", style(harvester.provider_name()).green());
    eprintln!("  Documents: {}", report.documents);
    if let Some(expected) = report.expected_size {
        eprintln!("  Announced: {expected}");
    }
    if report.deleted > 0 {
        eprintln!("  Deleted: {}", report.deleted);
    }
    if report.skipped > 0 {
        eprintln!("  Skipped: {}", style(report.skipped).yellow().bold());
    }
    if report.aborted {
        eprintln!("  {}", style("Aborted").red().bold());
    }

    let format = args.output_format();
    match &args.output {
        Some(path) => {
            let path = output::save(&documents, format, path)?;
            eprintln!();
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{}", output::render(&documents, format)?),
    }

    Ok(())
}

/// Execute the formats command.
fn formats_command(host_url: &str) -> Result<()> {
    let fetcher = HttpFetcher::new()?;
    let registry = MetadataFormatRegistry::load(&fetcher, host_url);

    if registry.is_empty() {
        return Err(HarvesterError::config(
            format!("{host_url} did not advertise any metadata formats"),
            Vec::new(),
        ));
    }

    for prefix in registry.prefixes() {
        match registry.resolve(&prefix) {
            Some(schema) => println!("{} {prefix} ({schema})", style("✓").green()),
            None => println!(
                "  {prefix} {}",
                style(registry.schema_url(&prefix).unwrap_or_default()).dim()
            ),
        }
    }

    Ok(())
}

/// Execute the identify command.
fn identify_command(host_url: &str) -> Result<()> {
    let fetcher = HttpFetcher::new()?;
    println!("{}", fetch_repository_name(&fetcher, host_url));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parse_harvest() {
        let cli = Cli::parse_from([
            "oaipmh-harvester",
            "harvest",
            "--host",
            "https://example.org/oai",
            "--prefix",
            "oai_dc",
            "--from",
            "2020-01-01",
        ]);

        let Commands::Harvest(args) = cli.command else {
            panic!("expected harvest command");
        };
        assert_eq!(args.host.as_deref(), Some("https://example.org/oai"));
        assert_eq!(args.prefix.as_deref(), Some("oai_dc"));
        assert_eq!(args.from.as_deref(), Some("2020-01-01"));
        assert!(!args.mixed_schemas);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_formats() {
        let cli = Cli::parse_from(["oaipmh-harvester", "-v", "formats", "https://example.org/oai"]);

        assert!(cli.verbose);
        let Commands::Formats { host_url } = cli.command else {
            panic!("expected formats command");
        };
        assert_eq!(host_url, "https://example.org/oai");
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host_url: https://example.org/oai\nmetadata_prefix: oai_dc\nset: physics\nlogo_url: ''"
        )
        .unwrap();

        let args = HarvestArgs {
            config: Some(file.path().to_path_buf()),
            prefix: Some("oai_datacite".to_string()),
            emit_tombstones: true,
            ..HarvestArgs::default()
        };
        let config = args.to_config().unwrap();

        assert_eq!(config.host(), Some("https://example.org/oai"));
        assert_eq!(config.prefix(), Some("oai_datacite"));
        assert_eq!(config.set.as_deref(), Some("physics"));
        assert_eq!(config.logo_url, None);
        assert_eq!(config.deletion_policy, DeletionPolicy::EmitTombstone);
    }

    #[test]
    fn test_output_format_from_extension() {
        let args = HarvestArgs {
            output: Some(PathBuf::from("out.yml")),
            ..HarvestArgs::default()
        };
        assert_eq!(args.output_format(), OutputFormat::Yaml);

        let args = HarvestArgs {
            output: Some(PathBuf::from("out.yml")),
            format: Some(OutputFormat::Json),
            ..HarvestArgs::default()
        };
        assert_eq!(args.output_format(), OutputFormat::Json);
    }
}
