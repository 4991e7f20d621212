#![allow(missing_docs)]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::{info, warn};

use specsplit_core::document::load_document;
use specsplit_core::split::{
    Discriminator, SplitOptions, create_dest_dir, partition, write_services,
};
use specsplit_core::{ComponentRef, ToYaml, effective_schema};

const USAGE: &str = "\
specsplit — split an OpenAPI document into self-contained service specs

USAGE:
  specsplit split --input <doc> --provider <name> --output <dir>
                  [--discriminator tag|path] [--exclude <tag,...>]
                  [--name-overrides <json>] [--overwrite] [--verbose]
  specsplit flatten --input <doc> --schema <name> [--verbose]
";

fn main() -> Result<()> {
    let args = AppArgs::parse().context("parsing arguments")?;
    init_tracing(args.verbose());

    match args {
        AppArgs::Split(split_args) => run_split(split_args),
        AppArgs::Flatten(flatten_args) => run_flatten(flatten_args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[derive(Debug)]
enum AppArgs {
    Split(SplitArgs),
    Flatten(FlattenArgs),
}

#[derive(Debug)]
struct SplitArgs {
    input: PathBuf,
    provider: String,
    output: PathBuf,
    discriminator: Discriminator,
    exclude: Vec<String>,
    name_overrides: BTreeMap<String, String>,
    overwrite: bool,
    verbose: bool,
}

#[derive(Debug)]
struct FlattenArgs {
    input: PathBuf,
    schema: String,
    verbose: bool,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        if pargs.contains(["-h", "--help"]) {
            eprintln!("{USAGE}");
            std::process::exit(0);
        }

        let Some(command) = pargs.subcommand().context("reading subcommand")? else {
            bail!("missing command\n{USAGE}");
        };

        let parsed = match command.as_str() {
            "split" => Self::Split(SplitArgs::parse(&mut pargs)?),
            "flatten" => Self::Flatten(FlattenArgs::parse(&mut pargs)?),
            other => bail!("unknown command {other:?}\n{USAGE}"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(parsed)
    }

    fn verbose(&self) -> bool {
        match self {
            Self::Split(split_args) => split_args.verbose,
            Self::Flatten(flatten_args) => flatten_args.verbose,
        }
    }
}

impl SplitArgs {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        let input = pargs
            .value_from_str(["-i", "--input"])
            .context("parsing input argument")?;
        let provider = pargs
            .value_from_str(["-p", "--provider"])
            .context("parsing provider argument")?;
        let output = pargs
            .value_from_str(["-o", "--output"])
            .context("parsing output argument")?;
        let discriminator = pargs
            .opt_value_from_str(["-d", "--discriminator"])
            .context("parsing discriminator argument")?
            .unwrap_or_default();
        let exclude = pargs
            .opt_value_from_str::<_, String>(["-x", "--exclude"])
            .context("parsing exclude argument")?
            .map(|raw| parse_exclude_list(&raw))
            .unwrap_or_default();
        let name_overrides = pargs
            .opt_value_from_fn("--name-overrides", parse_name_overrides)
            .context("parsing name-overrides argument")?
            .unwrap_or_default();
        let overwrite = pargs.contains("--overwrite");
        let verbose = pargs.contains(["-v", "--verbose"]);

        Ok(Self {
            input,
            provider,
            output,
            discriminator,
            exclude,
            name_overrides,
            overwrite,
            verbose,
        })
    }
}

impl FlattenArgs {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        let input = pargs
            .value_from_str(["-i", "--input"])
            .context("parsing input argument")?;
        let schema = pargs
            .value_from_str(["-s", "--schema"])
            .context("parsing schema argument")?;
        let verbose = pargs.contains(["-v", "--verbose"]);

        Ok(Self {
            input,
            schema,
            verbose,
        })
    }
}

fn parse_exclude_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_name_overrides(raw: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn run_split(args: SplitArgs) -> Result<()> {
    let SplitArgs {
        input,
        provider,
        output,
        discriminator,
        exclude,
        name_overrides,
        overwrite,
        verbose: _,
    } = args;

    info!(input = %input.display(), output = %output.display(), %discriminator, "splitting document");

    let document = load_document(&input)
        .with_context(|| format!("loading document {}", input.display()))?;
    create_dest_dir(&output, overwrite).context("preparing output directory")?;

    let options = SplitOptions::new(provider)
        .with_discriminator(discriminator)
        .with_exclude(exclude)
        .with_overwrite(overwrite)
        .with_name_overrides(name_overrides);
    let outcome = partition(&document, &options).context("partitioning document")?;

    let written = write_services(&output, &outcome.services).context("writing service documents")?;

    for unresolved in &outcome.report.unresolved {
        warn!(%unresolved, "dangling reference in output");
    }
    info!(
        services = written.len(),
        operations = outcome.report.operations,
        excluded = outcome.report.excluded,
        skipped = outcome.report.skipped,
        unresolved = outcome.report.unresolved.len(),
        "split complete"
    );
    Ok(())
}

fn run_flatten(args: FlattenArgs) -> Result<()> {
    let FlattenArgs {
        input,
        schema,
        verbose: _,
    } = args;

    let document = load_document(&input)
        .with_context(|| format!("loading document {}", input.display()))?;

    let pointer = format!("#/components/schemas/{schema}");
    let reference =
        ComponentRef::parse(&pointer).with_context(|| format!("invalid schema name {schema:?}"))?;

    let empty_components = Value::Object(Map::new());
    let components = document.get("components").unwrap_or(&empty_components);
    let Some(node) = reference.resolve(components) else {
        bail!("schema {schema:?} not found in {}", input.display());
    };

    let effective = effective_schema(node);
    println!("{}", effective.to_yaml().context("serializing effective schema")?);
    Ok(())
}
