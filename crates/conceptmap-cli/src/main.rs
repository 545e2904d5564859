use conceptmap::render::{ConceptMapRenderer, HeadlessError, ReconcileReport};
use conceptmap::{ConceptGraph, SiteConfig};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    ConceptMap(conceptmap::Error),
    Render(HeadlessError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::ConceptMap(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<conceptmap::Error> for CliError {
    fn from(value: conceptmap::Error) -> Self {
        Self::ConceptMap(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Generate,
    Render,
    Reconcile,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    title: Option<String>,
    config: Option<String>,
    diagram_id: Option<String>,
    out: Option<String>,
    pretty: bool,
    input: Option<String>,
}

#[derive(Serialize)]
struct ReconcileOut<'a> {
    title: &'a str,
    text: &'a str,
    #[serde(flatten)]
    report: &'a ReconcileReport,
}

const DEFAULT_TITLE: &str = "Concept Map";

fn usage() -> &'static str {
    "conceptmap\n\
\n\
USAGE:\n\
  conceptmap [generate] [--title <text>] [--config <path>] [--out <path>] [<path>|-]\n\
  conceptmap render [--title <text>] [--config <path>] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
  conceptmap reconcile [--title <text>] [--config <path>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a concept graph as JSON: an array of concepts or {\"concepts\": [...]}.\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - generate prints mindmap diagram text; render prints SVG; reconcile prints a JSON report\n\
    of which rendered node shows which concept.\n\
  - --config takes a JSON site config whose values override the built-in defaults.\n\
  - Set RUST_LOG=debug for pipeline diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "generate" => args.command = Command::Generate,
            "render" => args.command = Command::Render,
            "reconcile" => args.command = Command::Reconcile,
            "--pretty" => args.pretty = true,
            "--title" | "--config" | "--id" | "--out" => {
                let Some(value) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let slot = match a.as_str() {
                    "--title" => &mut args.title,
                    "--config" => &mut args.config,
                    "--id" => &mut args.diagram_id,
                    _ => &mut args.out,
                };
                *slot = Some(value.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(path: Option<&str>) -> Result<SiteConfig, CliError> {
    match path {
        None => Ok(SiteConfig::default()),
        Some(path) => Ok(SiteConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    write_text(&text, out)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let graph = ConceptGraph::from_json_str(&read_input(args.input.as_deref())?)?;
    let config = load_config(args.config.as_deref())?;
    let title = args.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let mut renderer = ConceptMapRenderer::from_site_config(&config)?;
    if let Some(id) = args.diagram_id.as_deref() {
        renderer = renderer.with_diagram_id(id);
    }
    tracing::debug!(concepts = graph.len(), command = ?args.command, "loaded concept graph");

    match args.command {
        Command::Generate => write_text(&renderer.generate(&graph, title), args.out.as_deref()),
        Command::Render => {
            let svg = renderer.render_svg_sync(&graph, title)?;
            write_text(&svg, args.out.as_deref())
        }
        Command::Reconcile => {
            let map = renderer.render_sync(&graph, title)?;
            let out = ReconcileOut {
                title,
                text: &map.text,
                report: &map.report,
            };
            write_json(&out, args.pretty, args.out.as_deref())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
