use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;
use trunnel_core::{DataView, Series, VisualSettings};
use trunnel_render::svg::{SvgRenderOptions, render_tree_chart_svg};
use trunnel_render::scale::parse_color;
use trunnel_render::{
    TreeChartLayout, Viewport, Visual, VisualConstructorOptions, VisualUpdateOptions,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(trunnel_core::Error),
    Render(trunnel_render::Error),
    Json(serde_json::Error),
    Input(&'static str),
    Raster(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Input(msg) => write!(f, "invalid input: {msg}"),
            CliError::Raster(msg) => write!(f, "raster error: {msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<trunnel_core::Error> for CliError {
    fn from(value: trunnel_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<trunnel_render::Error> for CliError {
    fn from(value: trunnel_render::Error) -> Self {
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
    Render,
    Layout,
    Settings,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    sample: bool,
    pretty: bool,
    config: Option<String>,
    object: Option<String>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    viewport_width: f64,
    viewport_height: f64,
    diagram_id: Option<String>,
    out: Option<String>,
}

/// Chart input: a bare series array, or a host data view.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChartInput {
    Series(Series),
    DataView(DataView),
}

fn usage() -> &'static str {
    "trunnel-cli\n\
\n\
USAGE:\n\
  trunnel-cli [render] [--format svg|png] [--scale <n>] [--background <css-color>] [--viewport-width <w>] [--viewport-height <h>] [--config <path>] [--id <svg-id>] [--out <path>] [--sample] [<path>|-]\n\
  trunnel-cli layout [--pretty] [--viewport-width <w>] [--viewport-height <h>] [--config <path>] [--sample] [<path>|-]\n\
  trunnel-cli settings [--pretty] [--object <name>] [--config <path>] [--sample] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is JSON: either [{\"name\": ..., \"value\": ...}, ...] or a data view\n\
    {\"categorical\": {\"categories\": [...], \"values\": [...]}, \"metadata\": {\"objects\": {...}}}.\n\
  - If <path> is omitted or '-', input is read from stdin; --sample uses the built-in dataset.\n\
  - --config points at a JSON settings file ({\"tree\": {...}, \"axes\": {...}, \"colors\": {...}})\n\
    merged over the data view's objects.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - Set TRUNNEL_LOG (e.g. TRUNNEL_LOG=debug) to see diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Render,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        viewport_width: 1200.0,
        viewport_height: 300.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "settings" => args.command = Command::Settings,
            "--pretty" => args.pretty = true,
            "--sample" => args.sample = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--object" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.object = Some(name.clone());
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.sample && args.input.is_some() {
        return Err(CliError::Usage(usage()));
    }
    if args
        .object
        .as_deref()
        .is_some_and(|name| !VisualSettings::object_names().any(|known| known == name))
    {
        return Err(CliError::Usage(usage()));
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

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn read_chart_input(input: Option<&str>) -> Result<ChartInput, CliError> {
    Ok(serde_json::from_str(&read_input(input)?)?)
}

/// Builds the data view handed to the visual: the input (or the sample) with `--config`
/// settings merged over any persisted objects.
fn load_data_view(args: &Args) -> Result<DataView, CliError> {
    let mut view = if args.sample {
        DataView::from_series(&Series::sample())
    } else {
        match read_chart_input(args.input.as_deref())? {
            ChartInput::Series(series) => DataView::from_series(&series),
            // The visual would fall back to the sample series; an explicit document must not.
            ChartInput::DataView(view) if view.categorical.is_none() => {
                return Err(CliError::Input("data view has no \"categorical\" section"));
            }
            ChartInput::DataView(view) => view,
        }
    };

    if let Some(path) = args.config.as_deref() {
        let mut settings = view.settings();
        merge_config_file(&mut settings, path)?;
        view.metadata.objects = Some(settings.as_value().clone());
    }
    Ok(view)
}

/// Resolves settings without laying out: persisted objects of the input (if one is named)
/// with `--config` merged over them.
fn load_settings(args: &Args) -> Result<VisualSettings, CliError> {
    let mut settings = match args.input.as_deref() {
        Some(input) => match read_chart_input(Some(input))? {
            ChartInput::Series(_) => VisualSettings::default(),
            ChartInput::DataView(view) => view.settings(),
        },
        None => VisualSettings::default(),
    };
    if let Some(path) = args.config.as_deref() {
        merge_config_file(&mut settings, path)?;
    }
    Ok(settings)
}

fn merge_config_file(settings: &mut VisualSettings, path: &str) -> Result<(), CliError> {
    let overrides: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    settings.deep_merge(&overrides);
    // Fail early on bad settings rather than after reading all input.
    settings.tree_config()?;
    Ok(())
}

fn render_svg_to_png(svg: &str, scale: f32, background: Option<&str>) -> Result<Vec<u8>, CliError> {
    let opt = {
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        opt.font_family = "Arial".to_string();
        opt
    };
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|_| CliError::Raster("failed to parse SVG for PNG rendering"))?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px)
        .ok_or(CliError::Raster("failed to allocate pixmap"))?;

    if let Some(bg) = background {
        pixmap.fill(parse_tiny_skia_color(bg)?);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|_| CliError::Raster("failed to encode PNG"))
}

/// Accepts the same colours as the chart settings, plus `transparent`.
fn parse_tiny_skia_color(text: &str) -> Result<tiny_skia::Color, CliError> {
    if text.trim().eq_ignore_ascii_case("transparent") {
        return Ok(tiny_skia::Color::TRANSPARENT);
    }
    let rgb = parse_color(text)?.into_format::<u8>();
    Ok(tiny_skia::Color::from_rgba8(rgb.red, rgb.green, rgb.blue, 255))
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Settings => print_settings(&args),
        Command::Layout => {
            let mut visual = Visual::new(VisualConstructorOptions::default());
            let layout = draw(&mut visual, &args)?;
            write_json(layout, args.pretty)
        }
        Command::Render => {
            let mut visual = Visual::new(VisualConstructorOptions::default());
            let layout = draw(&mut visual, &args)?;
            let svg = render_tree_chart_svg(
                layout,
                &SvgRenderOptions {
                    diagram_id: args.diagram_id.clone(),
                    ..Default::default()
                },
            );
            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref()),
                RenderFormat::Png => {
                    let bytes =
                        render_svg_to_png(&svg, args.render_scale, args.background.as_deref())?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    if out == "-" {
                        use std::io::Write;
                        std::io::stdout().lock().write_all(&bytes)?;
                    } else {
                        std::fs::write(&out, bytes)?;
                        tracing::debug!(path = %out, "wrote PNG");
                    }
                    Ok(())
                }
            }
        }
    }
}

fn draw<'a>(visual: &'a mut Visual, args: &Args) -> Result<&'a TreeChartLayout, CliError> {
    let view = load_data_view(args)?;
    Ok(visual.update(&VisualUpdateOptions {
        viewport: Viewport::new(args.viewport_width, args.viewport_height),
        data_views: vec![view],
    })?)
}

fn print_settings(args: &Args) -> Result<(), CliError> {
    let settings = load_settings(args)?;
    let names: Vec<&str> = match args.object.as_deref() {
        Some(name) => vec![name],
        None => VisualSettings::object_names().collect(),
    };
    let mut instances = Vec::new();
    for name in names {
        instances.extend(settings.enumerate_object_instances(name)?);
    }
    write_json(&instances, args.pretty)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TRUNNEL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("trunnel-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parse_args_defaults_to_svg_render() {
        let args = parse_args(&argv(&[])).unwrap();
        assert!(matches!(args.command, Command::Render));
        assert!(matches!(args.render_format, RenderFormat::Svg));
        assert_eq!(args.viewport_width, 1200.0);
        assert_eq!(args.viewport_height, 300.0);
        assert!(args.input.is_none());
    }

    #[test]
    fn parse_args_reads_layout_flags() {
        let args = parse_args(&argv(&[
            "layout",
            "--pretty",
            "--viewport-width",
            "640",
            "data.json",
        ]))
        .unwrap();
        assert!(matches!(args.command, Command::Layout));
        assert!(args.pretty);
        assert_eq!(args.viewport_width, 640.0);
        assert_eq!(args.input.as_deref(), Some("data.json"));
    }

    #[test]
    fn parse_args_rejects_bad_input() {
        for bad in [
            &["--format", "gif"][..],
            &["--scale", "0"],
            &["--viewport-width"],
            &["--bogus"],
            &["a.json", "b.json"],
            &["--sample", "a.json"],
            &["settings", "--object", "dataPoint"],
        ] {
            assert!(matches!(
                parse_args(&argv(bad)),
                Err(CliError::Usage(_))
            ));
        }
    }

    #[test]
    fn chart_input_accepts_series_and_data_views() {
        let input: ChartInput =
            serde_json::from_str(r#"[{"name": "a", "value": 1}, {"name": "b", "value": 2}]"#)
                .unwrap();
        assert!(matches!(input, ChartInput::Series(s) if s.len() == 2));

        let input: ChartInput = serde_json::from_str(
            r#"{"categorical": {"categories": ["a"], "values": [1]}}"#,
        )
        .unwrap();
        assert!(matches!(input, ChartInput::DataView(_)));
    }

    #[test]
    fn parse_tiny_skia_color_accepts_chart_colors() {
        assert_eq!(
            parse_tiny_skia_color("#fff").unwrap(),
            tiny_skia::Color::from_rgba8(255, 255, 255, 255)
        );
        assert_eq!(
            parse_tiny_skia_color("Chartreuse").unwrap(),
            tiny_skia::Color::from_rgba8(127, 255, 0, 255)
        );
        assert_eq!(
            parse_tiny_skia_color(" transparent ").unwrap(),
            tiny_skia::Color::TRANSPARENT
        );
        assert!(matches!(
            parse_tiny_skia_color("#12345"),
            Err(CliError::Render(trunnel_render::Error::InvalidColor { .. }))
        ));
    }

    #[test]
    fn default_raster_out_path_follows_input() {
        assert_eq!(
            default_raster_out_path(Some("dir/data.json"), "png"),
            std::path::PathBuf::from("dir/data.png")
        );
        assert_eq!(
            default_raster_out_path(None, "png"),
            std::path::PathBuf::from("out.png")
        );
    }
}
