//! Web server command.

use console::style;

use crate::config::Settings;
use crate::repository::{init_schema, AsyncSqlitePool};

/// Port used when the bind address names only a host.
const DEFAULT_PORT: u16 = 8000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    if let Some(url) = settings.database_url.as_deref() {
        println!("{} Preparing saved search database...", style("→").cyan());
        match init_schema(&AsyncSqlitePool::new(url)).await {
            Ok(()) => println!("  {} Database ready", style("✓").green()),
            Err(e) => eprintln!(
                "  {} Database unavailable, saved searches disabled: {}",
                style("✗").red(),
                e
            ),
        }
    }

    println!(
        "{} Starting finnews server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 127.0.0.1:8000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8000
/// - Host and port: "0.0.0.0:8000" -> 0.0.0.0:8000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Bind address is empty");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), DEFAULT_PORT))
}
