use anyhow::Result;
use clap::Parser;
use memory_probe::config::{default_config, Config, ConfigError, ConfigLoader, DEFAULT_CONFIG_FILE};
use memory_probe::probe::ProbeSettings;
use memory_probe::VERSION;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memory-probe", version)]
#[command(about = "Read-only pointer-chain telemetry for a running Windows process")]
struct Args {
    /// Configuration file; the built-in reference layout is used if it is missing
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "MEMORY_PROBE_CONFIG")]
    config: PathBuf,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Exit after the first snapshot
    #[arg(long)]
    once: bool,

    /// Keep searching for the target after it exits
    #[arg(long)]
    restart: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config().to_toml()?);
        return Ok(());
    }

    let (config, from_file) = match ConfigLoader::new(&args.config).load() {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound(_)) => (Config::default(), false),
        Err(e) => return Err(e.into()),
    };

    init_tracing(&config.logging.level)?;
    info!("memory-probe v{VERSION} starting");
    if from_file {
        info!(path = %args.config.display(), "loaded configuration");
    } else {
        warn!(path = %args.config.display(), "configuration file not found, using defaults");
    }

    let mut settings = ProbeSettings::from_config(&config)?;
    if args.restart {
        settings.restart_on_exit = true;
    }

    run(settings, &args).await
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

#[cfg(not(windows))]
async fn run(_settings: ProbeSettings, _args: &Args) -> Result<()> {
    anyhow::bail!("memory-probe can only attach to Windows processes");
}

#[cfg(windows)]
async fn run(settings: ProbeSettings, args: &Args) -> Result<()> {
    use memory_probe::probe::{shutdown_channel, ConsoleSink, OutputFormat, PollLoop};
    use memory_probe::process::WindowsPlatform;

    info!(
        window = %settings.identity,
        module = %settings.module,
        chain = %settings.chain,
        fields = settings.fields.len(),
        "waiting for target"
    );

    let (trigger, mut shutdown) = shutdown_channel();
    let ctrl_c = trigger.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            ctrl_c.trigger();
        }
    });

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut sink = ConsoleSink::new(std::io::stdout(), format);
    let mut probe = PollLoop::new(WindowsPlatform, settings);

    let outcome = if args.once {
        let mut once = once::StopAfterFirst::new(&mut sink, trigger);
        probe.run(&mut once, &mut shutdown).await
    } else {
        probe.run(&mut sink, &mut shutdown).await
    };

    info!(?outcome, snapshots = probe.snapshots_taken(), "probe stopped");
    Ok(())
}

#[cfg(windows)]
mod once {
    use memory_probe::probe::{ProbeState, ShutdownTrigger, SnapshotSink, StaleSignal};
    use memory_probe::{ProbeError, Snapshot};

    /// Forwards to `inner` and requests shutdown after the first snapshot
    pub struct StopAfterFirst<S> {
        inner: S,
        trigger: ShutdownTrigger,
    }

    impl<S> StopAfterFirst<S> {
        pub fn new(inner: S, trigger: ShutdownTrigger) -> Self {
            StopAfterFirst { inner, trigger }
        }
    }

    impl<S: SnapshotSink> SnapshotSink for StopAfterFirst<S> {
        fn on_snapshot(&mut self, snapshot: Snapshot) {
            self.inner.on_snapshot(snapshot);
            self.trigger.trigger();
        }

        fn on_state(&mut self, from: ProbeState, to: ProbeState) {
            self.inner.on_state(from, to);
        }

        fn on_chain_failure(&mut self, error: &ProbeError) {
            self.inner.on_chain_failure(error);
        }

        fn on_stale_configuration(&mut self, signal: &StaleSignal) {
            self.inner.on_stale_configuration(signal);
        }
    }
}
