use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use i2gw::convert::{to_gateway_api_resources, Conversion, Source};
use i2gw::providers::gce;
use i2gw::{ProviderConf, ProviderRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    match args.command {
        Commands::Print(print) => print.run().await,
    }
}

/// Convert Ingress resources to Gateway API resources.
#[derive(Parser)]
#[command(name = "i2gw", version)]
struct Args {
    /// Log as JSON instead of human-readable text. Logs always go to stderr
    /// and are filtered with `RUST_LOG`.
    #[clap(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print Gateway API resources converted from Ingresses and provider
    /// specific resources.
    ///
    /// Reads from the current kubeconfig's cluster unless an input file is
    /// given.
    Print(Print),
}

#[derive(ValueEnum, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(clap::Args)]
struct Print {
    /// The providers to convert resources for.
    #[clap(long, required = true, value_delimiter = ',', num_args = 1..)]
    providers: Vec<String>,

    /// Read resources from a manifest file instead of a cluster.
    #[clap(long)]
    input_file: Option<PathBuf>,

    /// Only convert resources in this namespace. Defaults to the kubeconfig's
    /// namespace when reading from a cluster, and every namespace when
    /// reading from a file.
    #[clap(short, long, conflicts_with = "all_namespaces")]
    namespace: Option<String>,

    /// Convert resources in every namespace.
    #[clap(short = 'A', long)]
    all_namespaces: bool,

    /// The output format.
    #[clap(short, long, default_value_t, value_enum)]
    output: OutputFormat,
}

impl Print {
    async fn run(self) -> anyhow::Result<()> {
        let registry = ProviderRegistry::new().with(gce::PROVIDER_NAME, gce::new_provider);

        for name in &self.providers {
            if registry.names().all(|n| n != name.as_str()) {
                let known: Vec<_> = registry.names().collect();
                anyhow::bail!("unknown provider {name}, known providers: {}", known.join(", "));
            }
        }

        let (source, namespace) = match &self.input_file {
            Some(path) => (Source::File(path.clone()), self.file_namespace()),
            None => self.cluster().await?,
        };
        tracing::debug!(?source, ?namespace, providers = ?self.providers, "converting");

        let conf = ProviderConf { namespace };
        let conversion = tokio::select! {
            conversion = to_gateway_api_resources(&registry, &self.providers, &conf, &source) => {
                conversion?
            }
            _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted"),
        };

        print_diagnostics(&conversion)?;
        print_resources(&conversion, self.output)?;

        let errors = conversion.errors().count();
        if errors > 0 {
            anyhow::bail!("conversion finished with {errors} error(s)");
        }
        Ok(())
    }

    fn file_namespace(&self) -> Option<String> {
        if self.all_namespaces {
            return None;
        }
        self.namespace.clone()
    }

    async fn cluster(&self) -> anyhow::Result<(Source, Option<String>)> {
        let config = kube::Config::infer()
            .await
            .context("failed to load kubeconfig")?;

        let namespace = if self.all_namespaces {
            None
        } else {
            Some(
                self.namespace
                    .clone()
                    .unwrap_or_else(|| config.default_namespace.clone()),
            )
        };

        let client = kube::Client::try_from(config).context("failed to build kube client")?;
        Ok((Source::Cluster(client), namespace))
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_diagnostics(conversion: &Conversion) -> anyhow::Result<()> {
    let mut stderr = std::io::stderr().lock();

    for output in &conversion.outputs {
        if !output.notifications.is_empty() {
            writeln!(stderr, "{}", output.notifications.to_table(output.provider))?;
        }
        for error in &output.errors {
            writeln!(stderr, "error: {}: {error}", output.provider)?;
        }
    }

    Ok(())
}

fn print_resources(conversion: &Conversion, format: OutputFormat) -> anyhow::Result<()> {
    let mut docs = vec![];
    for output in &conversion.outputs {
        docs.extend(
            output
                .resources
                .documents()
                .with_context(|| format!("failed to serialize {} resources", output.provider))?,
        );
    }

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Yaml => {
            for doc in &docs {
                writeln!(stdout, "---")?;
                write!(stdout, "{}", serde_yml::to_string(doc)?)?;
            }
        }
        OutputFormat::Json => {
            let list = serde_json::json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": docs,
            });
            writeln!(stdout, "{}", serde_json::to_string_pretty(&list)?)?;
        }
    }

    Ok(())
}
