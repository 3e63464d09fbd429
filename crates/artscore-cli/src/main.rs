mod commands;

use std::path::PathBuf;

use artscore_core::models::ScoreLabel;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "artscore",
    version,
    about = "Art analysis relay: forwards artwork images to a vision model and extracts SMI / RI scores"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay (POST /analyze, prompt file, static assets)
    Serve {
        /// TOML config file; defaults apply when it doesn't exist
        #[arg(long, env = "ARTSCORE_CONFIG", default_value = "artscore.toml")]
        config: PathBuf,
        /// Score convention to request and extract (overrides the config file)
        #[arg(long, value_enum)]
        variant: Option<Variant>,
        /// Listening port (overrides PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Extract a score from saved model output, read from FILE or stdin
    Extract {
        #[arg(long, value_enum, default_value_t = Variant::Smi)]
        variant: Variant,
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Smi,
    Ri,
}

impl From<Variant> for ScoreLabel {
    fn from(value: Variant) -> Self {
        match value {
            Variant::Smi => ScoreLabel::Smi,
            Variant::Ri => ScoreLabel::Ri,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("ARTSCORE_LOG").unwrap_or_else(|_| {
            "artscore_cli=info,artscore_core=info,artscore_server=info".into()
        }))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            variant,
            port,
        } => commands::serve::run(&config, variant.map(Into::into), port).await,
        Commands::Extract { variant, file } => {
            commands::extract::run(variant.into(), file.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
