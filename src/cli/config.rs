//! `clusterview config` handlers

use crate::cli::ConfigInitArgs;
use crate::config::ClusterviewConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../clusterview.example.toml");
const DEFAULT_GATEWAY_LINE: &str = "url = \"http://localhost:8000\"";

/// Render the config template, pointing `[gateway] url` at `gateway` if given.
///
/// The result is parsed and validated before it is returned, so a bad URL
/// never reaches disk.
pub fn render_config(gateway: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match gateway {
        Some(url) => {
            let line = format!("url = {}", toml::Value::String(url.to_string()));
            EXAMPLE_CONFIG.replacen(DEFAULT_GATEWAY_LINE, &line, 1)
        }
        None => EXAMPLE_CONFIG.to_string(),
    };

    let config: ClusterviewConfig = toml::from_str(&rendered)?;
    config.validate()?;
    Ok(rendered)
}

/// Handle `clusterview config init`
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "{} already exists, pass --force to replace it",
            args.output.display()
        )
        .into());
    }

    let content = render_config(args.gateway.as_deref())?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, content)?;

    println!("✓ Wrote {}", args.output.display());
    if args.gateway.is_none() {
        println!("  Point [gateway] url at your cluster gateway.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn init_args(output: &Path, force: bool, gateway: Option<&str>) -> ConfigInitArgs {
        ConfigInitArgs {
            output: output.to_path_buf(),
            force,
            gateway: gateway.map(str::to_string),
        }
    }

    #[test]
    fn test_written_config_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusterview.toml");

        handle_config_init(&init_args(&path, false, None)).unwrap();

        let config = ClusterviewConfig::load(Some(path.as_path())).unwrap();
        config.validate().unwrap();
        assert_eq!(config.gateway.url, "http://localhost:8000");
        assert_eq!(config.subscription.reconnect_delay_ms, 5000);
        assert_eq!(config.subscription.command_timeout_seconds, 10);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_gateway_option_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/site/clusterview.toml");

        handle_config_init(&init_args(&path, false, Some("https://gw.example:8443"))).unwrap();

        let config = ClusterviewConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.gateway.url, "https://gw.example:8443");
        assert_eq!(
            config.gateway.websocket_url().unwrap().as_str(),
            "wss://gw.example:8443/websocket/workload"
        );
    }

    #[test]
    fn test_invalid_gateway_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusterview.toml");

        let err = handle_config_init(&init_args(&path, false, Some("ftp://gw:21"))).unwrap_err();
        assert!(err.to_string().contains("gateway.url"));
        assert!(!path.exists());
    }

    #[test]
    fn test_existing_config_kept_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusterview.toml");
        let custom = "[subscription]\nreconnect_delay_ms = 250\n";
        std::fs::write(&path, custom).unwrap();

        let err = handle_config_init(&init_args(&path, false, None)).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), custom);
    }

    #[test]
    fn test_force_replaces_custom_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusterview.toml");
        std::fs::write(&path, "[subscription]\nreconnect_delay_ms = 250\n").unwrap();

        handle_config_init(&init_args(&path, true, None)).unwrap();

        let config = ClusterviewConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.subscription.reconnect_delay_ms, 5000);
    }

    #[test]
    fn test_render_quotes_gateway_url() {
        let rendered = render_config(Some("http://gw:9000/base")).unwrap();
        assert!(rendered.contains("url = \"http://gw:9000/base\""));
        assert!(!rendered.contains(DEFAULT_GATEWAY_LINE));
    }
}
