//! TrustNet CLI

mod identity;
mod shell;

use clap::{Parser, Subcommand};
use identity::FileIdentityProvider;
use shell::TerminalNavigator;
use std::path::PathBuf;
use std::sync::Arc;
use tn_core::report::{self, ReportFormat};
use tn_core::{
    DetectConfig, DetectionWorkflow, FlowOutcome, ImageUpload, RemoteClassifier,
    RoleResolutionFlow, ScanStatus, ScanType, SimulatedClassifier,
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tn-scan")]
#[command(about = "TrustNet phishing detection tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan content for phishing threats
    Scan {
        /// Scan type (url, image, email, qr, file)
        #[arg(short = 't', long = "type", default_value = "url")]
        scan_type: String,

        /// Text content to analyze (all types except image)
        #[arg(short, long)]
        input: Option<String>,

        /// Image to upload (image scans)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Base URL of the remote classifier
        #[arg(long)]
        classifier_url: Option<String>,

        /// Simulated classifier latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List supported scan types
    Types,

    /// Resolve the role of a signed-in identity and print the redirect
    Session {
        /// Identity JSON file ({"loaded", "signed_in", "metadata"})
        #[arg(long)]
        identity: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }

    let code = match cli.command {
        Commands::Scan {
            scan_type,
            input,
            file,
            classifier_url,
            latency_ms,
            format,
        } => cmd_scan(scan_type, input, file, classifier_url, latency_ms, format).await,
        Commands::Types => {
            cmd_types();
            0
        }
        Commands::Session { identity } => cmd_session(identity).await,
    };

    std::process::exit(code);
}

async fn cmd_scan(
    scan_type: String,
    input: Option<String>,
    file: Option<PathBuf>,
    classifier_url: Option<String>,
    latency_ms: Option<u64>,
    format: String,
) -> i32 {
    let scan_type: ScanType = match scan_type.parse() {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    let format: ReportFormat = match format.parse() {
        Ok(f) => f,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let mut config = DetectConfig::default();
    if let Some(url) = classifier_url {
        config.classifier_base_url = url;
    }
    if let Some(ms) = latency_ms {
        config.simulated_latency_ms = ms;
    }

    let remote = match RemoteClassifier::new(&config) {
        Ok(remote) => remote,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    let mut workflow =
        DetectionWorkflow::new(Arc::new(remote), Arc::new(SimulatedClassifier::new(&config)));
    workflow.select_type(scan_type);

    if let Some(text) = input {
        workflow.set_input(text);
    }
    if let Some(path) = file {
        if !path.exists() {
            error!("File not found: {}", path.display());
            return 1;
        }
        match ImageUpload::from_path(&path) {
            Ok(image) => workflow.set_image(Some(image)),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return 1;
            }
        }
    }

    if !workflow.can_scan() {
        warn!(
            "Nothing to scan: {} needs {}",
            scan_type.label(),
            if scan_type.takes_image() { "--file" } else { "--input" }
        );
    }

    info!("Running {}", scan_type.label());
    let result = workflow.run_scan().await.clone();

    match report::generate_report(scan_type, &result, format) {
        Ok(content) => println!("{}", content),
        Err(e) => {
            error!("Failed to generate report: {}", e);
            return 1;
        }
    }

    exit_code(result.status)
}

fn exit_code(status: ScanStatus) -> i32 {
    match status {
        ScanStatus::Safe => 0,
        ScanStatus::Threat => 2,
        ScanStatus::Error | ScanStatus::Pending => 1,
    }
}

fn cmd_types() {
    println!("\nScan Types\n{}", "=".repeat(50));
    for scan_type in ScanType::ALL {
        println!(
            "  {:<6} {:<16} {}",
            scan_type.id(),
            scan_type.label(),
            scan_type.placeholder()
        );
    }
}

async fn cmd_session(identity_path: PathBuf) -> i32 {
    let provider = match FileIdentityProvider::open(&identity_path) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to load identity {}: {}", identity_path.display(), e);
            return 1;
        }
    };
    let navigator = TerminalNavigator::new();
    let mut flow = RoleResolutionFlow::new();

    match flow.evaluate(&provider.identity(), &provider, &navigator).await {
        FlowOutcome::Waiting => {
            println!("Session is still loading");
            1
        }
        FlowOutcome::Redirected(route) | FlowOutcome::Settled(route) => {
            println!("{}", route.path());
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_args() {
        let cli = Cli::parse_from(["tn-scan", "scan", "-t", "image", "--file", "x.png"]);
        match cli.command {
            Commands::Scan { scan_type, file, format, .. } => {
                assert_eq!(scan_type, "image");
                assert_eq!(file, Some(PathBuf::from("x.png")));
                assert_eq!(format, "text");
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_scan_format_flag() {
        let cli = Cli::parse_from(["tn-scan", "scan", "-t", "email", "--format", "json"]);
        match cli.command {
            Commands::Scan { format, .. } => {
                assert_eq!(format.parse::<ReportFormat>().ok(), Some(ReportFormat::Json));
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ScanStatus::Safe), 0);
        assert_eq!(exit_code(ScanStatus::Threat), 2);
        assert_eq!(exit_code(ScanStatus::Error), 1);
    }
}
