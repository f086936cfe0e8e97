use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info};

use call_blocker::config::Config;
use call_blocker::host::HostSession;
use call_blocker::init::{init_components, init_preferences, setup_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting call-blocker...");
    if !config_exists {
        info!("Config file not found, using defaults.");
    }

    // 3. Open Storage & Wire Components
    let prefs = init_preferences(&config)?;
    let components = init_components(&config, prefs);

    // 4. Initial Contact Import
    if let Some(importer) = &components.importer {
        importer.refresh().await;
    }

    // 5. Spawn Periodic Contact Refresh
    if let Some(importer) = components.importer.clone() {
        let minutes = config.contacts.refresh_interval_minutes;
        if minutes > 0 {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
                // The first tick completes immediately
                interval.tick().await;
                loop {
                    interval.tick().await;
                    info!("Scheduled contact import...");
                    importer.refresh().await;
                }
            });
        }
    }

    // 6. Serve Host Requests
    let session = HostSession::new(
        components.screener,
        components.importer,
        components.recent,
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Ready for call events on stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let mut response = session.handle_line(&line).await;
                        response.push('\n');
                        stdout.write_all(response.as_bytes()).await?;
                        stdout.flush().await?;
                    }
                    Ok(None) => {
                        info!("Host closed stdin.");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                }
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    Ok(())
}
