use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cm-e2e")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "End-to-end checks for the Custom Metrics Stackdriver adapter")]
#[command(long_about = "Deploys the Custom Metrics Stackdriver adapter and two synthetic metric exposers into a GCE/GKE cluster, registers their metric descriptors in Cloud Monitoring, and verifies the values come back through the Kubernetes Custom Metrics API.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the adapter end-to-end test against a cluster
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Namespace for the adapter and exposer pods
        #[arg(short, long)]
        namespace: Option<String>,

        /// Seconds to wait between setup and verification
        #[arg(long, value_name = "SECONDS")]
        settle_secs: Option<u64>,
    },

    /// Print the Kubernetes objects the test creates as YAML
    Manifests {
        /// Which objects to print
        #[arg(long, value_enum, default_value = "all")]
        set: ManifestSet,

        /// Namespace for the adapter and exposer pods
        #[arg(short, long)]
        namespace: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Remove objects and metric descriptors left behind by an earlier run
    Cleanup {
        #[command(flatten)]
        target: TargetArgs,

        /// Namespace for the adapter and exposer pods
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Run the metrics exposer loop in the foreground
    Expose(ExposeArgs),
}

/// Cluster and project selection shared by commands that talk to both
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Cloud project owning the metric descriptors
    #[arg(short, long, env = "CM_E2E_PROJECT")]
    pub project: Option<String>,

    /// Kubeconfig context to use (defaults to the current context)
    #[arg(long)]
    pub context: Option<String>,

    /// Cloud provider the cluster runs on
    #[arg(long, env = "CM_E2E_PROVIDER")]
    pub provider: Option<String>,
}

/// Flags of the exposer container command. Names keep their underscores so
/// existing pod specs keep working.
#[derive(Debug, Clone, Args)]
pub struct ExposeArgs {
    /// UID of the pod the points are attributed to
    #[arg(long = "pod_id", default_value = "")]
    pub pod_id: String,

    /// Short custom metric name
    #[arg(long = "metric_name", default_value = "foo")]
    pub metric_name: String,

    /// Value written on every tick
    #[arg(long = "metric_value", default_value_t = 0, allow_hyphen_values = true)]
    pub metric_value: i64,

    /// Seconds between writes
    #[arg(
        long = "interval-secs",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: Option<u64>,

    /// Project to write to instead of the one reported by instance metadata
    #[arg(long)]
    pub project: Option<String>,

    /// Write a single point and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ManifestSet {
    All,
    Adapter,
    Exposer,
}

/// Initialize logging: `base` at verbosity 0, one level more per `-v`
pub fn init_logging(verbose: u8, quiet: bool, base: log::LevelFilter) {
    if quiet {
        return;
    }

    let levels = [
        log::LevelFilter::Warn,
        log::LevelFilter::Info,
        log::LevelFilter::Debug,
        log::LevelFilter::Trace,
    ];
    let start = levels.iter().position(|l| *l == base).unwrap_or(0);
    let level = levels[(start + verbose as usize).min(levels.len() - 1)];

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        init_logging(self.verbose, self.quiet, log::LevelFilter::Warn);
    }
}
