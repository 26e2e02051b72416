use anyhow::Context;
use clap::Parser;
use gateway_conf::config::schema::DEFAULT_CONFIG_FILE;
use gateway_conf::{Config, ConfigLoader, NoResolver, ServerPool};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "gwconf")]
#[command(about = "Load, validate and inspect a gateway configuration file")]
struct Args {
    /// Configuration file to read
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Run in the foreground (overrides Daemon in the file)
    #[arg(long, short = 'f', conflicts_with = "daemon")]
    foreground: bool,

    /// Run as a daemon (overrides Daemon in the file)
    #[arg(long, short = 'D')]
    daemon: bool,

    /// Do not resolve portal and platform server names
    #[arg(long)]
    no_resolve: bool,

    /// Print the effective configuration as TOML
    #[arg(long)]
    dump: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let mut loader = ConfigLoader::new();
    if args.no_resolve {
        loader = loader.with_resolver(NoResolver);
    }
    if args.foreground {
        loader = loader.with_daemon(false);
    } else if args.daemon {
        loader = loader.with_daemon(true);
    }

    let config = loader
        .load(&args.config)
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;
    info!(
        "Loaded {} auth server(s), {} ruleset(s), {} trusted MAC(s)",
        config.auth_servers.len(),
        config.rulesets.len(),
        config.trusted_macs().len()
    );

    if args.dump {
        print!("{}", config.to_toml().context("Failed to render configuration")?);
    } else {
        print_summary(&config);
    }

    Ok(())
}

fn print_pool(label: &str, pool: &ServerPool) {
    for server in pool.snapshot() {
        let scheme = if server.use_ssl { "https" } else { "http" };
        let port = if server.use_ssl {
            server.ssl_port
        } else {
            server.http_port
        };
        match server.last_ip {
            Some(ip) => println!(
                "  {label:<9}{scheme}://{}:{}{} ({ip})",
                server.hostname, port, server.path
            ),
            None => println!("  {label:<9}{scheme}://{}:{}{}", server.hostname, port, server.path),
        }
    }
}

fn print_summary(config: &Config) {
    println!("Configuration {} is valid", config.config_file.display());
    println!(
        "  gateway  {} on {}:{}",
        config.gateway_id.as_deref().unwrap_or("-"),
        config.gateway_interface.as_deref().unwrap_or("-"),
        config.gateway_port
    );
    println!("  daemon   {}", config.daemon());

    print_pool("auth", &config.auth_servers);
    print_pool("portal", &config.portal_servers);
    print_pool("platform", &config.platform_servers);

    for (name, rules) in config.rulesets.iter() {
        println!("  ruleset  {name} ({} rules)", rules.len());
        for rule in rules {
            println!("           {rule}");
        }
    }

    if !config.trusted_macs().is_empty() {
        println!("  trusted  {}", config.trusted_macs().join(", "));
    }
}
