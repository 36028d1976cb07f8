use crate::error::CliError;
use crate::runtime::tunnel::FunnelApi;

pub const USAGE: &str = "Usage: funnel <status|expose <port>|unexpose <port>>";

/// Parse a port argument. Anything that is not a positive 16-bit integer is
/// rejected.
pub fn parse_port(raw: Option<&str>) -> Result<u16, CliError> {
    let raw = raw.unwrap_or_default();
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CliError::InvalidPort(raw.to_string())),
    }
}

/// Handle one `funnel` command-group invocation and return the text to show.
pub async fn handle_funnel_command(api: &dyn FunnelApi, args: &[String]) -> String {
    let sub = args.first().map(String::as_str);
    let port_arg = args.get(1).map(String::as_str);

    match sub {
        Some("status") => render_funnel_status(api),
        Some("expose") => {
            let port = match parse_port(port_arg) {
                Ok(port) => port,
                Err(e) => return e.to_string(),
            };
            let path = args.get(2).map(String::as_str);
            match api.expose(port, path).await {
                Some(url) => format!("Funnel active: {url} → localhost:{port}"),
                None => format!("Failed to expose port {port} (funnel unavailable?)"),
            }
        }
        Some("unexpose") => {
            let port = match parse_port(port_arg) {
                Ok(port) => port,
                Err(e) => return e.to_string(),
            };
            if api.unexpose(port).await {
                format!("Funnel stopped for port {port}")
            } else {
                format!("No active funnel on port {port}")
            }
        }
        _ => USAGE.to_string(),
    }
}

fn render_funnel_status(api: &dyn FunnelApi) -> String {
    let status = api.status();
    let mut lines = vec![
        format!(
            "Available: {}",
            if status.available { "yes" } else { "no" }
        ),
        format!(
            "Hostname: {}",
            status.hostname.as_deref().unwrap_or("(unknown)")
        ),
    ];
    if status.funnels.is_empty() {
        lines.push("Funnels: (none)".to_string());
    } else {
        lines.push("Funnels:".to_string());
        for f in &status.funnels {
            lines.push(format!("  {} → localhost:{}", f.public_url, f.port));
        }
    }
    lines.join("\n")
}
