use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use clap::{ArgAction, Parser, Subcommand};
use console::style;
use tabular::{row, Table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kubeconf::paths::{self, KUBECONFIG};
use kubeconf::{load, load_all, merge, merge_strict, save, ConfigError, KubeConfig};

mod prompt;

#[derive(Parser)]
#[command(name = "k8c")]
#[command(
    author,
    version,
    about = "Merge kubeconfig files and switch the current kubernetes context"
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Kubeconfig file to read, may be repeated [default: $KUBECONFIG, then ~/.kube/config]
    #[arg(long, global = true, value_name = "PATH")]
    kubeconfig: Vec<PathBuf>,

    /// Log more, may be repeated
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick a kubeconfig file and set its current context
    Load {
        /// Files to choose from [default: the --kubeconfig or $KUBECONFIG
        /// files, else every config* file under ~/.kube]
        files: Vec<PathBuf>,

        /// Context to switch to instead of prompting
        #[arg(short, long)]
        context: Option<String>,

        /// Copy the file aside before overwriting it
        #[arg(long)]
        backup: bool,
    },
    /// Merge kubeconfig files into one, later files override earlier ones
    Merge {
        /// Files to merge [default: the --kubeconfig sources]
        files: Vec<PathBuf>,

        #[arg(short, long, default_value = "merged-config")]
        output: PathBuf,

        /// Fail if a context refers to a cluster or user that is not defined
        #[arg(long)]
        strict: bool,

        /// Copy the output file aside before overwriting it
        #[arg(long)]
        backup: bool,
    },
    /// Set the current context
    #[command(visible_alias = "select")]
    Switch {
        /// Context to switch to instead of prompting
        context: Option<String>,

        /// Copy the file aside before overwriting it
        #[arg(long)]
        backup: bool,
    },
    /// List available contexts
    List,
    /// Show the current context and the cluster it points at
    Current,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        kubeconfig,
        command,
        ..
    } = cli;
    let sources = || -> anyhow::Result<Vec<PathBuf>> {
        let env = env::var_os(KUBECONFIG);
        let sources = paths::resolve_sources(&kubeconfig, env.as_deref())?;
        debug!(?sources, "resolved kubeconfig sources");
        Ok(sources)
    };

    match command {
        Command::Load {
            files,
            context,
            backup,
        } => {
            let files = if files.is_empty() {
                let env = env::var_os(KUBECONFIG);
                match paths::configured_sources(&kubeconfig, env.as_deref()) {
                    Some(sources) => sources,
                    None => paths::discover(paths::kube_dir()?)?,
                }
            } else {
                files
            };
            handle_load(&files, context, backup)
        }
        Command::Merge {
            files,
            output,
            strict,
            backup,
        } => {
            let files = if files.is_empty() { sources()? } else { files };
            handle_merge(&files, &output, strict, backup)
        }
        Command::Switch { context, backup } => handle_switch(&sources()?, context, backup),
        Command::List => handle_list(&sources()?),
        Command::Current => handle_current(&sources()?),
    }
}

fn load_merged(sources: &[PathBuf]) -> anyhow::Result<KubeConfig> {
    let configs = load_all(sources)?;
    Ok(merge(&configs))
}

fn pick_context(kc: &KubeConfig, explicit: Option<String>) -> anyhow::Result<String> {
    match explicit {
        Some(name) => Ok(name),
        None => prompt::select_context(kc),
    }
}

fn write_back(kc: &KubeConfig, path: &Path, backup: bool) -> anyhow::Result<()> {
    if backup {
        if let Some(copy) = kubeconf::backup(path)? {
            println!("Backed up {} to {}", path.display(), copy.display());
        }
    }
    save(kc, path)?;
    Ok(())
}

fn handle_load(files: &[PathBuf], context: Option<String>, backup: bool) -> anyhow::Result<()> {
    let file = match files {
        [] => bail!("no kubeconfig files found"),
        [only] => only.clone(),
        _ => prompt::select_file(files)?,
    };

    let kc = load(&file)?;
    println!("Loaded kubeconfig file: {}", file.display());

    let target = pick_context(&kc, context)?;
    let switched = kc.switch_context(&target)?;
    if let Ok((_, cluster)) = switched.current_cluster() {
        println!("Cluster server: {}", cluster.server);
    }

    write_back(&switched, &file, backup)?;
    println!("Switched to context \"{target}\" in {}", file.display());

    Ok(())
}

fn handle_merge(
    files: &[PathBuf],
    output: &Path,
    strict: bool,
    backup: bool,
) -> anyhow::Result<()> {
    let configs = load_all(files)?;
    let merged = if strict {
        merge_strict(&configs).context("merged kubeconfig is inconsistent")?
    } else {
        merge(&configs)
    };

    write_back(&merged, output, backup)?;

    println!("Merged kubeconfig files:");
    for file in files {
        println!("  {}", file.display());
    }
    println!("Saved merged kubeconfig to file: {}", output.display());

    Ok(())
}

fn handle_switch(
    sources: &[PathBuf],
    context: Option<String>,
    backup: bool,
) -> anyhow::Result<()> {
    let configs = load_all(sources)?;
    let merged = merge(&configs);

    let target = pick_context(&merged, context)?;
    if !merged.contexts.contains_key(&target) {
        return Err(ConfigError::UnknownContext { name: target }.into());
    }

    // Like kubectl, the pointer is written into the first source even when the
    // context itself is defined in a later one.
    let (Some(path), Some(first)) = (sources.first(), configs.into_iter().next()) else {
        bail!("no kubeconfig to write to");
    };
    let updated = KubeConfig {
        current_context: target.clone(),
        ..first
    };

    write_back(&updated, path, backup)?;
    println!("Switched to context \"{target}\" in {}", path.display());

    Ok(())
}

fn handle_list(sources: &[PathBuf]) -> anyhow::Result<()> {
    let merged = load_merged(sources)?;
    let rows = merged.describe_contexts()?;

    if rows.is_empty() {
        println!("No available contexts!");
        return Ok(());
    }

    let mut table = Table::new("{:<} {:<}  {:<}  {:<}  {:<}");
    table.add_row(row!(" ", "NAME", "CLUSTER", "SERVER", "NAMESPACE"));
    for ctx in rows {
        let marker = if ctx.current { "*" } else { " " };
        table.add_row(row!(
            marker,
            ctx.name,
            ctx.cluster,
            ctx.server,
            ctx.namespace.unwrap_or("")
        ));
    }

    for line in table.to_string().lines() {
        if line.starts_with('*') {
            println!("{}", style(line).green())
        } else {
            println!("{line}")
        };
    }

    Ok(())
}

fn handle_current(sources: &[PathBuf]) -> anyhow::Result<()> {
    let merged = load_merged(sources)?;

    let context = merged.current_context_name()?;
    let (cluster, spec) = merged.current_cluster()?;

    println!("Current context: {context}");
    println!("Cluster: {cluster} ({})", spec.server);
    match &merged.contexts[context].namespace {
        Some(ns) => println!("Namespace: {ns}"),
        None => println!("No namespace"),
    }

    Ok(())
}
