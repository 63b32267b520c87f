//! kubeanalyzer (ka) - Kubernetes cluster health analysis

use anyhow::Result;
use clap::Parser;
use kubeanalyzer::cli::{Cli, Command};
use kubeanalyzer::commands;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let result = match cli.command {
        Command::Analyze(ref args) => {
            commands::run_analyze(
                cli.context.as_deref(),
                cli.config.as_deref(),
                args,
                cli.output,
            )
            .await
        }
        Command::Render(ref args) => commands::run_render(args, cli.output),
        Command::Formats => commands::list_formats(cli.output),
        Command::Completions(ref args) => {
            generate_completions(args.shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_configuration_error() { 2 } else { 1 });
    }

    Ok(())
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ka", &mut std::io::stdout());
}
