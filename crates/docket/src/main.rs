use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    process,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use libdocket::{
    DocArgs, Docket, SearchDomain, SearchIndex, SearchOptions, describe_domains, outline,
    outline_colored,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only log errors
    #[arg(long, short, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    /// Log pipeline progress
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the JSON index, or write index.json when -d is given
    Json(IndexArgs),

    /// Render HTML documentation into the -d directory
    Html {
        /// Page template; the built-in template is used when omitted
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// File copied into the static/ directory of the output (repeatable)
        #[arg(long = "resource", value_name = "FILE")]
        resources: Vec<PathBuf>,

        /// Project name shown on every page
        #[arg(long)]
        project: Option<String>,

        /// Project version shown on every page
        #[arg(long)]
        project_version: Option<String>,

        /// Disable syntax highlighting of code blocks
        #[arg(long, default_value_t = false)]
        no_highlight: bool,

        /// Do not write search-index.json
        #[arg(long, default_value_t = false)]
        no_search_index: bool,

        #[command(flatten)]
        index: IndexArgs,
    },

    /// Print a compact outline of every documented declaration
    Outline {
        /// Colorize output
        #[arg(long, default_value = "auto", value_parser = ["auto", "always", "never"], env = "DOCKET_COLOR")]
        color: String,

        #[command(flatten)]
        index: IndexArgs,
    },

    /// List entities matching a query
    Search {
        /// Text to look for
        query: String,

        /// Where to look (repeatable); defaults to name, doc and signature
        #[arg(long = "domain", value_enum)]
        domains: Vec<Domain>,

        /// Match letter case exactly
        #[arg(long, default_value_t = false)]
        case_sensitive: bool,

        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Args)]
struct IndexArgs {
    /// Index arguments: sources followed by options such as -d DIR or --document-private-items
    #[arg(last = true, required = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Domain {
    Name,
    Doc,
    Path,
    Signature,
}

impl From<Domain> for SearchDomain {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Name => Self::NAMES,
            Domain::Doc => Self::DOCS,
            Domain::Path => Self::PATHS,
            Domain::Signature => Self::SIGNATURES,
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("DOCKET_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn out_dir(args: &[String]) -> Result<Option<PathBuf>> {
    Ok(DocArgs::parse_args(args)?.out_dir)
}

fn run(cli: Cli) -> Result<()> {
    let docket = Docket::new();
    match cli.command {
        Command::Json(index) => {
            let out = out_dir(&index.args)?;
            let built = docket.create_index(&index.args)?;
            match out {
                Some(dir) => {
                    let path = docket
                        .write_json(built, &dir)
                        .with_context(|| format!("writing JSON index to {}", dir.display()))?;
                    println!("{}", path.display());
                }
                None => println!("{}", libdocket::json::to_json(&built)?),
            }
        }
        Command::Html {
            template,
            resources,
            project,
            project_version,
            no_highlight,
            no_search_index,
            index,
        } => {
            let Some(out) = out_dir(&index.args)? else {
                bail!("html output needs an output directory: pass -d DIR after --");
            };
            let mut docket = docket
                .with_highlighting(!no_highlight)
                .with_search_index(!no_search_index);
            if let Some(project) = project {
                docket = docket.with_project(project);
            }
            if let Some(version) = project_version {
                docket = docket.with_project_version(version);
            }
            let built = docket.create_index(&index.args)?;
            let rendered = match template {
                Some(template) => docket.build_docs(&out, &template, &resources, built),
                None => docket.build_docs_with_builtin_template(&out, &resources, built),
            };
            rendered.with_context(|| format!("rendering documentation to {}", out.display()))?;
            println!("{}", out.display());
        }
        Command::Outline { color, index } => {
            let built = docket.create_index(&index.args)?;
            let colored = match color.as_str() {
                "never" => false,
                "always" => true,
                _ => io::stdout().is_terminal(),
            };
            let text = if colored {
                outline_colored(&built)?
            } else {
                outline(&built)
            };
            print!("{text}");
        }
        Command::Search {
            query,
            domains,
            case_sensitive,
            index,
        } => {
            let built = docket.create_index(&index.args)?;
            let mut options = SearchOptions::new(query);
            options.domains = domains
                .into_iter()
                .map(SearchDomain::from)
                .fold(SearchDomain::empty(), |acc, domain| acc | domain);
            options.case_sensitive = case_sensitive;
            options.ensure_domains();

            let results = SearchIndex::build(&built).search(&options);
            debug!(matches = results.len(), "search finished");
            if results.is_empty() {
                eprintln!("No matches for \"{}\"", options.query);
            }
            for result in results {
                println!(
                    "{} {} [{}]",
                    result.kind.label(),
                    result.path,
                    describe_domains(result.matched).join(", ")
                );
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
