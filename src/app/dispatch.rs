use crate::app::commands::{USAGE, handle_funnel_command};
use crate::app::status::{collect_report, render_report};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::plugins::ExtensionRegistry;
use crate::runtime::tunnel::{
    AgentRunner, EventSink, FUNNEL_EXTENSION, FunnelApi, FunnelService, HostnameChange,
    LogEventSink, TailscaleCli,
};
use anyhow::Result;
use clap::CommandFactory;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let runner: Arc<dyn AgentRunner> = Arc::new(TailscaleCli::new(config.agent_binary.clone()));
    let events: Arc<dyn EventSink> = Arc::new(LogEventSink);
    let registry = ExtensionRegistry::new();

    match command {
        Commands::Run => run_foreground(config, runner, events, registry).await,
        Commands::Status { json } => {
            // One-shot: no monitor, and never expose just to report status.
            let config = Config {
                poll_interval_seconds: 0,
                expose: None,
                ..config
            };
            let service = FunnelService::init(config, runner, events, registry).await;
            let report = collect_report(&service).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_report(&report));
            }
            Ok(())
        }
    }
}

async fn run_foreground(
    config: Config,
    runner: Arc<dyn AgentRunner>,
    events: Arc<dyn EventSink>,
    registry: Arc<ExtensionRegistry>,
) -> Result<()> {
    let service = FunnelService::init(config, runner, events, Arc::clone(&registry)).await;

    if let Some(api) = registry.get::<Arc<dyn FunnelApi>>(FUNNEL_EXTENSION) {
        api.on_hostname_change(Arc::new(|change: &HostnameChange| -> Result<()> {
            let url = change.public_url.as_deref().unwrap_or("no active funnel");
            println!(
                "Hostname changed: {} → {} ({url})",
                change.old_hostname, change.new_hostname
            );
            Ok(())
        }));
    }

    println!("tailfunnel running. {USAGE}, stats, quit");

    // Every console exit path falls through to shutdown.
    run_console(&service, BufReader::new(tokio::io::stdin())).await;
    service.shutdown().await;
    Ok(())
}

/// Serve console commands from `input` until EOF, `quit`, Ctrl-C or a read
/// error. Never tears the service down itself.
pub async fn run_console<R>(service: &FunnelService, input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Console input failed, stopping: {e}");
                        break;
                    }
                };
                let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
                if words.first().map(String::as_str) == Some("funnel") {
                    words.remove(0);
                }
                match words.first().map(String::as_str) {
                    None => {}
                    Some("quit" | "exit") => break,
                    Some("stats") => {
                        let stats = service.stats();
                        println!(
                            "started={} stopped={} hostname_changes={} status_checks={} uptime={}",
                            stats.exposures_started,
                            stats.exposures_stopped,
                            stats.hostname_changes,
                            stats.status_checks,
                            stats.uptime,
                        );
                    }
                    Some(_) if service.config().enabled => {
                        println!("{}", handle_funnel_command(service, &words).await);
                    }
                    Some(_) => println!("Funnel is disabled in config. {USAGE}"),
                }
            }
        }
    }
}
