use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use guacamole_provider::config::{Config, Overrides};
use guacamole_provider::guacamole::client::GuacClient;
use guacamole_provider::guacamole::http::format_guac_error;
use guacamole_provider::resource::{
    get_all_protocol_names, get_entity, get_protocol, ConnectionDataSource,
    ConnectionGroupDataSource, Diagnostics, LookupRequest, CONNECTION, CONNECTION_GROUP,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Look up Apache Guacamole connections and connection groups
#[derive(Parser, Debug)]
#[command(name = "guacamole-provider", version, about, long_about = None)]
struct Args {
    /// Guacamole web application URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Authentication data source (mysql, postgresql, ...)
    #[arg(long, global = true)]
    data_source: Option<String>,

    /// Auth token (defaults to GUACAMOLE_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a connection by identifier or path
    Connection {
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        path: Option<String>,
        /// Project parameters as this protocol instead of the connection's own
        #[arg(long)]
        protocol: Option<String>,
        /// Print passwords and keys instead of redacting them
        #[arg(long)]
        show_sensitive: bool,
    },
    /// Read a connection group by identifier or path
    ConnectionGroup {
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        path: Option<String>,
    },
    /// Print field descriptors
    Schema {
        #[arg(long)]
        protocol: Option<String>,
    },
    /// Save --url, --data-source, --insecure and --timeout-secs as defaults
    Configure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();
    let file = open_log_file(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("guacamole-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("guacamole-provider").join("guacamole-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".guacamole-provider").join("guacamole-provider.log");
    }
    PathBuf::from("guacamole-provider.log")
}

fn print<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn connect(config: &Config, overrides: &Overrides) -> Result<GuacClient> {
    let client_config = config.client_config(overrides)?;
    tracing::info!(
        "Using {} (data source: {})",
        client_config.url,
        client_config.data_source
    );
    GuacClient::new(&client_config)
}

/// Run the selected command; `Ok(false)` means error diagnostics were reported
async fn run(args: Args) -> Result<bool> {
    let mut config = Config::load();
    let overrides = Overrides {
        url: args.url.clone(),
        data_source: args.data_source.clone(),
        token: args.token.clone(),
        disable_tls_verification: args.insecure,
        timeout_secs: args.timeout_secs,
    };

    match args.command {
        Command::Connection {
            identifier,
            path,
            protocol,
            show_sensitive,
        } => {
            let client = connect(&config, &overrides)?;
            let source = match protocol.as_deref() {
                Some(name) => ConnectionDataSource::for_protocol(&client, name)?,
                None => ConnectionDataSource::new(&client),
            };

            let result = source.read(&LookupRequest::new(identifier, path)).await;
            report(&result.diagnostics);

            if let Some(mut declaration) = result.declaration {
                if !show_sensitive {
                    let table = source
                        .protocol()
                        .or(Some(declaration.protocol.as_str()))
                        .and_then(get_protocol);
                    if let Some(table) = table {
                        declaration.redact_sensitive(table);
                    }
                }
                print(args.output, &declaration)?;
            }

            Ok(!result.diagnostics.has_error())
        }
        Command::ConnectionGroup { identifier, path } => {
            let client = connect(&config, &overrides)?;
            let source = ConnectionGroupDataSource::new(&client);

            let result = source.read(&LookupRequest::new(identifier, path)).await;
            report(&result.diagnostics);

            if let Some(declaration) = &result.declaration {
                print(args.output, declaration)?;
            }

            Ok(!result.diagnostics.has_error())
        }
        Command::Schema { protocol } => {
            let schema = match protocol {
                Some(name) => {
                    let def = get_protocol(&name).with_context(|| {
                        format!(
                            "Unknown protocol '{}'; expected one of: {}",
                            name,
                            get_all_protocol_names().join(", ")
                        )
                    })?;
                    json!({
                        "protocol": name,
                        "display_name": def.display_name,
                        "parameters": def.parameters,
                    })
                }
                None => {
                    let connection = get_entity(CONNECTION).context("Connection schema missing")?;
                    let group = get_entity(CONNECTION_GROUP).context("Connection group schema missing")?;
                    json!({
                        "connection": {
                            "fields": connection.fields,
                            "attributes": connection.attributes,
                        },
                        "connection_group": {
                            "fields": group.fields,
                            "attributes": group.attributes,
                        },
                        "protocols": get_all_protocol_names(),
                    })
                }
            };
            print(args.output, &schema)?;
            Ok(true)
        }
        Command::Configure => {
            config.merge_overrides(&overrides);
            config.save()?;

            if let Some(path) = Config::config_path() {
                eprintln!("Saved {}", path.display());
            }
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    let succeeded = match run(args).await {
        Ok(succeeded) => succeeded,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", format_guac_error(&err));
            false
        }
    };

    // Flush buffered log lines before exiting
    drop(log_guard);

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
