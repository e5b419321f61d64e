use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use texop::operators::{GradientFactory, ShapesFactory};
use texop::{HostConfig, NodeInfo, OperatorFactory, OperatorNode, PixelType, UploadReport};

#[derive(Parser, Debug)]
#[command(name = "texop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cook a built-in operator and write each displayed texture as a PNG.
    Cook(CookArgs),
    /// Print the host capability table as JSON.
    Caps(CapsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OperatorKind {
    /// CPU-mode scrolling gradient.
    Gradient,
    /// Render-target spinning polygon.
    Shapes,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SlotFormat {
    /// 8-bit BGRA.
    Bgra8,
    /// 8-bit RGBA.
    Rgba8,
    /// 32-bit float RGBA.
    Rgba32f,
}

impl From<SlotFormat> for PixelType {
    fn from(v: SlotFormat) -> Self {
        match v {
            SlotFormat::Bgra8 => PixelType::Bgra8Fixed,
            SlotFormat::Rgba8 => PixelType::Rgba8Fixed,
            SlotFormat::Rgba32f => PixelType::Rgba32Float,
        }
    }
}

#[derive(Parser, Debug)]
struct CookArgs {
    /// Built-in operator to load.
    #[arg(long, value_enum)]
    operator: OperatorKind,

    /// Number of cooks.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Host configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for `frame_NNNN.png` output. Nothing is written when absent.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// CPU slot pixel layout (gradient only).
    #[arg(long, value_enum, default_value_t = SlotFormat::Bgra8)]
    pixel_type: SlotFormat,

    /// Override the node width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the node height.
    #[arg(long)]
    height: Option<u32>,

    /// Frame rate used to derive cook times.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Press this pulse parameter before the given cook, as `NAME@COOK`.
    #[arg(long)]
    pulse: Vec<String>,
}

#[derive(Parser, Debug)]
struct CapsArgs {
    /// Host configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Cook(args) => cmd_cook(args),
        Command::Caps(args) => cmd_caps(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HostConfig> {
    match path {
        Some(p) => {
            HostConfig::from_path(p).with_context(|| format!("load host config '{}'", p.display()))
        }
        None => Ok(HostConfig::default()),
    }
}

fn parse_pulse(arg: &str) -> anyhow::Result<(String, u64)> {
    let (name, at) = arg
        .split_once('@')
        .with_context(|| format!("pulse '{arg}' is not NAME@COOK"))?;
    let at = at
        .parse()
        .with_context(|| format!("pulse '{arg}' has an invalid cook index"))?;
    Ok((name.to_string(), at))
}

fn cmd_cook(args: CookArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(w) = args.width {
        config.node.width = w;
    }
    if let Some(h) = args.height {
        config.node.height = h;
    }
    config.validate().context("validate host config")?;

    let pulses = args
        .pulse
        .iter()
        .map(|s| parse_pulse(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let factory: Rc<dyn OperatorFactory> = match args.operator {
        OperatorKind::Gradient => Rc::new(GradientFactory {
            pixel_type: args.pixel_type.into(),
        }),
        OperatorKind::Shapes => Rc::new(ShapesFactory),
    };
    let path = format!("/texop/{:?}1", args.operator).to_lowercase();
    let mut node = OperatorNode::load(factory, NodeInfo::new(path, 1), config);
    anyhow::ensure!(node.is_active(), "operator failed to load: {:?}", node.state());

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }

    for i in 0..args.frames {
        for (name, _) in pulses.iter().filter(|(_, at)| *at == i) {
            node.pulse(name).with_context(|| format!("press pulse '{name}'"))?;
        }

        let report = node
            .cook(i as f64 / args.fps)
            .with_context(|| format!("cook {i}"))?;
        let status = node.status();
        let channels = node
            .info_channels()
            .iter()
            .map(|c| format!("{}={:.3}", c.name, c.value))
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!(
            "cook {:>4} {:?} {}x{} {:?} [{channels}]",
            report.frame.0,
            report.mode,
            report.resolved.width,
            report.resolved.height,
            report.upload
        );
        if let Some(w) = &status.warning {
            eprintln!("  warning: {w}");
        }
        if let Some(e) = &status.error {
            eprintln!("  error: {e}");
        }

        if let Some(dir) = &args.out_dir
            && report.upload != UploadReport::Retained
            && let Some(tex) = node.texture()
        {
            let out = dir.join(format!("frame_{i:04}.png"));
            image::save_buffer_with_format(
                &out,
                &tex.to_rgba8(),
                tex.width(),
                tex.height(),
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", out.display()))?;
        }
    }

    if let Some(table) = node.info_table() {
        for r in 0..table.rows() {
            if let Some(row) = table.row(r) {
                eprintln!("  {}", row.join("\t"));
            }
        }
    }
    if let Some(popup) = &node.status().info_popup {
        eprintln!("{popup}");
    }
    Ok(())
}

fn cmd_caps(args: CapsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let json = serde_json::to_string_pretty(&config.caps).context("serialize capability table")?;
    println!("{json}");
    Ok(())
}
