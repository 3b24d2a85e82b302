use mindcanvas_core::{CanvasConfig, MindmapDocument, Position};
use mindcanvas_render::svg::{RenderOptions, Theme, render_svg};
use mindcanvas_render::visibility::max_visible_level;
use mindcanvas_render::{Canvas, CanvasOptions, NoCapture, ViewportSize};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(mindcanvas_core::Error),
    Render(mindcanvas_render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
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

impl From<mindcanvas_core::Error> for CliError {
    fn from(value: mindcanvas_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<mindcanvas_render::Error> for CliError {
    fn from(value: mindcanvas_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Visible,
    Render,
    Sample,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    seed: Option<u64>,
    config: Option<String>,
    zoom: Option<f64>,
    focus: Option<String>,
    theme: Option<Theme>,
    no_grid: bool,
    viewport_width: f64,
    viewport_height: f64,
    out: Option<String>,
    levels: u32,
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisibleOut<'a> {
    zoom: f64,
    max_level: u32,
    focused: Option<&'a str>,
    nodes: Vec<VisibleNode<'a>>,
    connections: Vec<VisibleConnection<'a>>,
}

#[derive(Serialize)]
struct VisibleNode<'a> {
    id: &'a str,
    title: &'a str,
    level: u32,
    position: Position,
}

#[derive(Serialize)]
struct VisibleConnection<'a> {
    from: &'a str,
    to: &'a str,
    label: Option<&'a str>,
    kind: &'static str,
}

fn usage() -> &'static str {
    "mindcanvas\n\
\n\
USAGE:\n\
  mindcanvas [layout] [--pretty] [--seed <n>] [--config <path>] [<path>|-]\n\
  mindcanvas visible [--pretty] [--zoom <z>] [--focus <id>] [--seed <n>] [--config <path>] [<path>|-]\n\
  mindcanvas render [--zoom <z>] [--focus <id>] [--theme light|dark] [--no-grid] [--viewport-width <w>] [--viewport-height <h>] [--seed <n>] [--config <path>] [--out <path>] [<path>|-]\n\
  mindcanvas sample [--pretty] [--levels <n>]\n\
\n\
OPTIONS:\n\
  --verbose   log layout and viewport events to stderr\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the mindmap JSON document is read from stdin.\n\
  - layout prints the document with collision-resolved positions.\n\
  - visible prints the nodes and connections shown at the given zoom/focus.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - --config takes a JSON object with `viewport`, `layout` and `render` sections.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        viewport_width: 1280.0,
        viewport_height: 800.0,
        levels: 3,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "visible" => args.command = Command::Visible,
            "render" => args.command = Command::Render,
            "sample" => args.command = Command::Sample,
            "--pretty" => args.pretty = true,
            "--no-grid" => args.no_grid = true,
            "--verbose" | "-v" => args.verbose = true,
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--zoom" => {
                let Some(zoom) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let zoom = zoom.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(zoom.is_finite() && zoom > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.zoom = Some(zoom);
            }
            "--focus" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.focus = Some(id.clone());
            }
            "--theme" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme = Some(Theme::parse(name).ok_or(CliError::Usage(usage()))?);
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = parse_extent(w)?;
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = parse_extent(h)?;
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--levels" => {
                let Some(levels) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.levels = levels.parse::<u32>().map_err(|_| CliError::Usage(usage()))?;
                if args.levels > 9 {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
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

fn parse_extent(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(CliError::Usage(usage()))
    }
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

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> Result<CanvasConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => CanvasConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CanvasConfig::empty_object(),
    };
    if let Some(seed) = args.seed {
        config.set_value("layout.randomSeed", serde_json::json!(seed));
    }
    Ok(config)
}

/// Loads the input document into a canvas and applies `--zoom` / `--focus`.
fn load_canvas(args: &Args, config: &CanvasConfig) -> Result<Canvas, CliError> {
    let text = read_input(args.input.as_deref())?;
    let document = MindmapDocument::from_json_str(&text)?;
    mindcanvas_core::model::validate_unique_ids(&document.nodes)?;

    let mut canvas = Canvas::new(CanvasOptions::from_config(config)?);
    canvas.load(document, &mut NoCapture);
    if let Some(stats) = canvas.last_layout() {
        tracing::debug!(
            passes = stats.passes,
            converged = stats.converged,
            "document laid out"
        );
    }

    if let Some(zoom) = args.zoom {
        canvas.set_zoom(zoom);
    }
    if let Some(id) = args.focus.as_deref() {
        if !canvas.set_focus(id) {
            tracing::warn!(focus = id, "focus id not found; using the zoom rule");
        }
    }
    Ok(canvas)
}

fn init_tracing(verbose: bool) {
    if !verbose {
        return;
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Sample => {
            let created = chrono::Utc::now().to_rfc3339();
            let document = mindcanvas_core::sample::sample_document(args.levels, &created);
            write_json(&document, args.pretty)
        }
        Command::Layout => {
            let config = load_config(&args)?;
            let canvas = load_canvas(&args, &config)?;
            write_json(&canvas.to_document(), args.pretty)
        }
        Command::Visible => {
            let config = load_config(&args)?;
            let canvas = load_canvas(&args, &config)?;
            let scene = canvas.scene();
            let out = VisibleOut {
                zoom: canvas.viewport().zoom(),
                max_level: max_visible_level(canvas.viewport().zoom()),
                focused: canvas.viewport().focused(),
                nodes: scene
                    .nodes
                    .iter()
                    .map(|n| VisibleNode {
                        id: &n.id,
                        title: &n.title,
                        level: n.level,
                        position: n.position,
                    })
                    .collect(),
                connections: scene
                    .connections
                    .iter()
                    .map(|c| VisibleConnection {
                        from: &c.from.id,
                        to: &c.to.id,
                        label: c.label,
                        kind: match c.kind {
                            mindcanvas_core::model::EdgeKind::Hierarchy => "hierarchy",
                            mindcanvas_core::model::EdgeKind::TopLevel => "topLevel",
                        },
                    })
                    .collect(),
            };
            write_json(&out, args.pretty)
        }
        Command::Render => {
            let config = load_config(&args)?;
            let canvas = load_canvas(&args, &config)?;

            let mut render_options = RenderOptions::from_config(&config)?;
            if let Some(theme) = args.theme {
                render_options.theme = theme;
            }
            if args.no_grid {
                render_options.show_grid = false;
            }

            let size = ViewportSize::new(args.viewport_width, args.viewport_height);
            let svg = render_svg(&canvas.scene(), canvas.viewport(), size, &render_options);
            write_text(&svg, args.out.as_deref())
        }
    }
}

fn main() {
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

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
