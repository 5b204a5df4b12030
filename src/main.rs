//! # tritrace 🔺
//!
//! Renders triangle scenes in your terminal with a recursive ray tracer:
//! every pixel averages a disk of view rays for depth of field, and each ray
//! follows reflections and transparency down to a fixed depth.
//!
//! `--preview` skips ray tracing and draws the flat projection instead.
//! Set `RUST_LOG=debug` for camera and scene diagnostics.

use clap::Parser;
use tritrace::math::Vec3;
use tritrace::presets::ScenePreset;
use tritrace::renderer::{self, display_framebuffer, OutputMode, RenderConfig};
use tritrace::{CameraConfig, RenderError};

/// tritrace: ray trace triangle scenes in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "tritrace",
    version,
    about = "A recursive triangle ray tracer for the terminal",
    long_about = "Ray traces scenes of flat triangles with emitted color, reflection and \
                  transparency. Each pixel averages a disk of rays for depth of field. \
                  Output goes to the terminal and optionally to a PPM image.",
    after_help = "EXAMPLES:\n  \
                  tritrace --scene stack --mode halfblock\n  \
                  tritrace --scene mirror --dof 2 --density 3\n  \
                  tritrace --scene scatter --preview --mode truecolor\n  \
                  tritrace --position 10,5,40 --lon 0.2 --output render.ppm --quiet"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Stack)]
    scene: ScenePreset,

    /// Output width in pixels
    #[arg(short = 'W', long, default_value_t = 120)]
    width: u32,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = 60)]
    height: u32,

    /// Angle of view: world units across one average-resolution of pixels
    /// at unit distance
    #[arg(long)]
    aov: Option<f64>,

    /// Distance of the sharp focus plane
    #[arg(long)]
    focus: Option<f64>,

    /// Radius of the lens disk; 0 gives a pinhole camera
    #[arg(long)]
    dof: Option<f64>,

    /// Lens rays per unit of dof along each axis
    #[arg(long)]
    density: Option<f64>,

    /// Camera position as x,y,z
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    position: Option<Vec3>,

    /// Longitude turn in radians
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Latitude turn in radians
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Twist around the view direction in radians
    #[arg(long, allow_hyphen_values = true)]
    twist: Option<f64>,

    /// Render threads; 0 uses every core
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Terminal output encoding mode
    #[arg(short, long, value_enum, default_value_t = CliOutputMode::Halfblock)]
    mode: CliOutputMode,

    /// Draw the flat projection preview instead of ray tracing
    #[arg(long)]
    preview: bool,

    /// Save the image to a PPM file (in addition to terminal display)
    #[arg(short, long)]
    output: Option<String>,

    /// Suppress terminal display (useful with --output for headless rendering)
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputMode {
    /// Full-block characters with 24-bit true color
    Truecolor,
    /// Half-block characters (▀), 2 vertical pixels per cell
    Halfblock,
    /// ASCII grayscale density ramp
    Ascii,
}

impl From<CliOutputMode> for OutputMode {
    fn from(m: CliOutputMode) -> Self {
        match m {
            CliOutputMode::Truecolor => OutputMode::TrueColor,
            CliOutputMode::Halfblock => OutputMode::HalfBlock,
            CliOutputMode::Ascii => OutputMode::Ascii,
        }
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(format!("expected x,y,z, got `{s}`"));
    };
    let coord = |v: &str| {
        v.parse::<f64>()
            .map_err(|e| format!("bad coordinate `{v}`: {e}"))
    };
    Ok(Vec3::new(coord(x)?, coord(y)?, coord(z)?))
}

impl Cli {
    /// The preset's camera with any command-line overrides applied.
    fn camera(&self, preset: CameraConfig) -> CameraConfig {
        CameraConfig {
            position: self.position.unwrap_or(preset.position),
            lon: self.lon.unwrap_or(preset.lon),
            lat: self.lat.unwrap_or(preset.lat),
            twist: self.twist.unwrap_or(preset.twist),
            aov: self.aov.unwrap_or(preset.aov),
            focus_dist: self.focus.unwrap_or(preset.focus_dist),
            dof: self.dof.unwrap_or(preset.dof),
            density: self.density.unwrap_or(preset.density),
        }
    }
}

fn print_header(scene_name: &str, config: &RenderConfig, camera: &CameraConfig, preview: bool) {
    let mode_name = match config.output_mode {
        OutputMode::TrueColor => "TrueColor (24-bit)",
        OutputMode::HalfBlock => "HalfBlock (2× vertical)",
        OutputMode::Ascii => "ASCII grayscale",
    };
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  tritrace 🔺  Triangle Ray Tracer             ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:      {scene_name}");
    eprintln!(
        "  Resolution: {}×{} ({mode_name})",
        config.width, config.height
    );
    eprintln!("  Camera:     {} (aov {})", camera.position, camera.aov);
    if preview {
        eprintln!("  Mode:       projection preview");
    } else {
        eprintln!(
            "  Lens:       focus {} · dof {} · density {}",
            camera.focus_dist, camera.dof, camera.density
        );
    }
    eprintln!();
}

fn main() -> Result<(), RenderError> {
    env_logger::init();
    let cli = Cli::parse();

    let desc = cli.scene.build();
    let camera = cli.camera(desc.camera);
    let config = RenderConfig {
        width: cli.width,
        height: cli.height,
        threads: cli.threads,
        output_mode: cli.mode.into(),
        progress: true,
    };
    config.validate()?;
    camera.validate()?;

    print_header(desc.name, &config, &camera, cli.preview);

    let framebuffer = if cli.preview {
        let projection = camera.projection(config.width, config.height);
        renderer::render_preview(&projection, &desc.scene, &config)?
    } else {
        let tracer = camera.tracer(config.width, config.height);
        let (framebuffer, stats) = renderer::render(&tracer, &desc.scene, &config)?;
        eprintln!();
        stats.print_summary();
        framebuffer
    };
    eprintln!();

    // Terminal display
    if !cli.quiet {
        display_framebuffer(&framebuffer, config.output_mode)?;
    }

    // PPM export
    if let Some(ref path) = cli.output {
        framebuffer.write_ppm(path)?;
        eprintln!("  Saved: {path}");
    }

    eprintln!();
    eprintln!("  Rendered with tritrace v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
