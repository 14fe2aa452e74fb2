use std::path::PathBuf;

use tracing::info;

use clap::{Parser, Subcommand};

use anyhow::anyhow;

use waav_live_console::{ConsoleConfig, ConversationLog, ExportSnapshot, Template};

/// WaaV Live Console - realtime audio/video session console
#[derive(Parser, Debug)]
#[command(name = "waav-live-console")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available templates
    Templates,

    /// Print a template's tool declarations as JSON
    Tools {
        /// Template to print (defaults to the configured one)
        #[arg(short = 't', long = "template")]
        template: Option<Template>,
    },

    /// Write an export file for a fresh workspace
    Export {
        /// Template to export (defaults to the configured one)
        #[arg(short = 't', long = "template")]
        template: Option<Template>,

        /// Output directory (defaults to the configured export dir)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = &cli.config {
        println!("Loading configuration from {}", config_path.display());
        ConsoleConfig::from_file(config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ConsoleConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    match cli.command {
        Some(Commands::Templates) => {
            for template in Template::ALL {
                let marker = if template == config.template { "*" } else { " " };
                println!(
                    "{marker} {:<20} {} tools",
                    template.as_str(),
                    template.tools().len()
                );
            }
        }
        Some(Commands::Tools { template }) => {
            let mut workspace = config.workspace();
            if let Some(template) = template {
                workspace.select_template(template);
            }
            let json = serde_json::to_string_pretty(workspace.tools().tools())
                .map_err(|e| anyhow!("Failed to serialize tools: {}", e))?;
            println!("{json}");
        }
        Some(Commands::Export { template, output }) => {
            let mut workspace = config.workspace();
            if let Some(template) = template {
                workspace.select_template(template);
            }
            let dir = output.unwrap_or_else(|| config.export_dir.clone());
            let path = ExportSnapshot::capture(&workspace, &ConversationLog::new())
                .write_to_dir(&dir)
                .map_err(|e| anyhow!("Failed to export: {}", e))?;
            println!("Export written to {}", path.display());
        }
        None => {
            info!(
                template = %config.template,
                model = %config.model,
                voice = %config.voice,
                "Console configuration loaded"
            );
            println!("template: {}", config.template);
            println!("model:    {}", config.model);
            println!("voice:    {}", config.voice);
            println!("api key:  {}", if config.api_key.is_some() { "set" } else { "not set" });
        }
    }

    Ok(())
}
