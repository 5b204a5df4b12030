use crate::camera::{ProjectionCamera, RayTracerCamera};
use crate::error::{RenderError, Result};
use crate::material::{Color, Scene, Tri2};
use crate::math::{Line2, Vec2};
use crossterm::style::{self, Stylize};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

// ─── Render Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Worker threads for row rendering; 0 uses every core.
    pub threads: usize,
    pub output_mode: OutputMode,
    /// Print a progress bar to stderr while rendering.
    pub progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 60,
            threads: 0,
            output_mode: OutputMode::HalfBlock,
            progress: true,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "resolution must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        let pixels = self.width as u64 * self.height as u64;
        if pixels > MAX_PIXELS {
            return Err(RenderError::InvalidConfig(format!(
                "{}×{} is {pixels} pixels, more than the {MAX_PIXELS} a framebuffer holds",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Largest image `RenderConfig::validate` accepts.
pub const MAX_PIXELS: u64 = 1 << 28;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    /// ANSI 24-bit true-color using full-block characters.
    TrueColor,
    /// Half-block rendering with separate fg/bg colors, 2 vertical pixels per cell.
    HalfBlock,
    /// ASCII grayscale density ramp.
    Ascii,
}

// ─── Framebuffer ────────────────────────────────────────────────────────────

pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Export as a binary PPM (P6). Channels above 1.0 saturate to white.
    pub fn write_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        write!(file, "P6\n{} {}\n255\n", self.width, self.height)?;
        for pixel in &self.pixels {
            let (r, g, b) = pixel.to_rgb8();
            file.write_all(&[r, g, b])?;
        }
        file.flush()?;
        Ok(())
    }
}

/// Camera pixel coordinates of image pixel `(x, y)`: the image centre is
/// `(0, 0)` and camera y grows upwards.
#[inline]
pub fn camera_pixel(x: u32, y: u32, width: u32, height: u32) -> (i32, i32) {
    (
        x as i32 - (width / 2) as i32,
        (height / 2) as i32 - y as i32,
    )
}

// ─── Render Statistics ──────────────────────────────────────────────────────

/// Counts and timing of one ray-traced render, printed after the image.
pub struct RenderStats {
    pub primary_rays: u64,
    pub elapsed_secs: f64,
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: usize,
    pub triangles: usize,
}

impl RenderStats {
    pub fn kilorays_per_sec(&self) -> f64 {
        self.primary_rays as f64 / self.elapsed_secs / 1e3
    }

    pub fn print_summary(&self) {
        let fill = "━".repeat(30);
        eprintln!("  {fill}");
        eprintln!("  Time:      {:.2}s", self.elapsed_secs);
        eprintln!("  Rays:      {} primary", self.primary_rays);
        eprintln!("  Speed:     {:.1} krays/s", self.kilorays_per_sec());
        eprintln!(
            "  Image:     {}×{} @ {} rays/pixel",
            self.width, self.height, self.samples_per_pixel
        );
        eprintln!("  Scene:     {} triangles", self.triangles);
        eprintln!("  {fill}");
    }
}

// ─── Progress Reporter ──────────────────────────────────────────────────────

/// Row counter shared by all render workers, drawn as a bar on stderr.
struct Progress {
    total: u32,
    done: AtomicU32,
    start: Instant,
    visible: bool,
}

impl Progress {
    fn new(total: u32, visible: bool) -> Self {
        Self {
            total,
            done: AtomicU32::new(0),
            start: Instant::now(),
            visible,
        }
    }

    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.visible {
            return;
        }
        let before = (done - 1) * 100 / self.total;
        let pct = done * 100 / self.total;
        if pct != before {
            let elapsed = self.start.elapsed().as_secs_f64();
            let remaining = (self.total - done) as f64 * elapsed / done as f64;
            let bar_width = 24;
            let filled = (pct as usize * bar_width) / 100;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width - filled));
            eprint!("\r  Rendering: │{bar}│ {pct:3}%  ETA {remaining:.0}s   ");
        }
    }

    fn finish(&self) {
        if self.visible {
            let bar = "█".repeat(24);
            eprintln!(
                "\r  Rendering: │{bar}│ 100%  {:.2}s       ",
                self.start.elapsed().as_secs_f64()
            );
        }
    }
}

// ─── Ray Traced Render ──────────────────────────────────────────────────────

/// Renders the whole image with `camera`, one row per task.
///
/// Pixels are independent, so rows go to rayon workers with no shared
/// mutable state beyond the progress counter. The scene must not change while
/// this runs.
pub fn render(
    camera: &RayTracerCamera,
    scene: &Scene,
    config: &RenderConfig,
) -> Result<(Framebuffer, RenderStats)> {
    config.validate()?;
    if scene.is_empty() {
        return Err(RenderError::EmptyScene);
    }

    let (w, h) = (config.width, config.height);
    let mut fb = Framebuffer::new(w, h);
    let progress = Progress::new(h, config.progress);
    log::debug!(
        "rendering {w}×{h} over {} triangles on {} threads",
        scene.len(),
        if config.threads == 0 {
            rayon::current_num_threads()
        } else {
            config.threads
        }
    );

    let render_rows = |pixels: &mut [Color]| {
        pixels
            .par_chunks_mut(w as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let (cx, cy) = camera_pixel(x as u32, y as u32, w, h);
                    *pixel = camera.color_at(scene, cx, cy);
                }
                progress.tick();
            });
    };

    let t0 = Instant::now();
    if config.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        pool.install(|| render_rows(&mut fb.pixels));
    } else {
        render_rows(&mut fb.pixels);
    }
    progress.finish();

    let samples_per_pixel = camera.samples_per_pixel();
    let stats = RenderStats {
        primary_rays: w as u64 * h as u64 * samples_per_pixel as u64,
        elapsed_secs: t0.elapsed().as_secs_f64(),
        width: w,
        height: h,
        samples_per_pixel,
        triangles: scene.len(),
    };
    log::info!(
        "rendered {w}×{h} in {:.2}s ({} primary rays)",
        stats.elapsed_secs,
        stats.primary_rays
    );
    Ok((fb, stats))
}

// ─── Projection Preview ─────────────────────────────────────────────────────

const OUTLINE: Color = Color::WHITE;

/// Rasterizes the projection camera's view: each visible triangle filled
/// with its own color and outlined. Later triangles overdraw earlier ones.
pub fn render_preview(
    camera: &ProjectionCamera,
    scene: &Scene,
    config: &RenderConfig,
) -> Result<Framebuffer> {
    config.validate()?;
    let tris = camera.project(scene);
    log::debug!("preview: {} of {} triangles visible", tris.len(), scene.len());

    let mut fb = Framebuffer::new(config.width, config.height);
    for tri in &tris {
        rasterize(&mut fb, tri);
    }
    Ok(fb)
}

fn rasterize(fb: &mut Framebuffer, tri: &Tri2) {
    let [a, b, c] = tri.vertices();
    let edges = [Line2::through(a, b), Line2::through(b, c), Line2::through(c, a)];

    // Either winding: the projection may mirror the triangle.
    let orientation = edges[0].distsign(c);
    if !orientation.is_finite() || orientation == 0.0 {
        return;
    }

    let (w, h) = (fb.width, fb.height);
    let xs = [a.x, b.x, c.x];
    let ys = [a.y, b.y, c.y];
    let (min_x, max_x) = min_max(xs);
    let (min_y, max_y) = min_max(ys);

    // Screen space to image rows/columns, clamped to the framebuffer.
    let half_w = (w / 2) as f64;
    let half_h = (h / 2) as f64;
    let col = |sx: f64| (sx + half_w).clamp(0.0, w as f64 - 1.0) as u32;
    let row = |sy: f64| (half_h - sy).clamp(0.0, h as f64 - 1.0) as u32;

    for y in row(max_y + 1.0)..=row(min_y - 1.0) {
        for x in col(min_x - 1.0)..=col(max_x + 1.0) {
            let (cx, cy) = camera_pixel(x, y, w, h);
            let p = Vec2::new(cx as f64, cy as f64);

            let inside = edges
                .iter()
                .all(|edge| edge.distsign(p) * orientation.signum() >= 0.0);
            let near_edge = edges.iter().any(|edge| edge.dist2(p) < 0.25);

            if inside && near_edge {
                fb.set(x, y, OUTLINE);
            } else if inside {
                fb.set(x, y, tri.color);
            }
        }
    }
}

fn min_max(values: [f64; 3]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

// ─── Terminal Display Engine ────────────────────────────────────────────────

pub fn display_framebuffer(fb: &Framebuffer, mode: OutputMode) -> Result<()> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        OutputMode::TrueColor => display_truecolor(&mut out, fb)?,
        OutputMode::HalfBlock => display_halfblock(&mut out, fb)?,
        OutputMode::Ascii => display_ascii(&mut out, fb)?,
    }
    out.flush()?;
    Ok(())
}

fn display_truecolor(out: &mut impl Write, fb: &Framebuffer) -> io::Result<()> {
    for y in 0..fb.height {
        for x in 0..fb.width {
            let (r, g, b) = fb.get(x, y).to_rgb8();
            write!(out, "{}", "█".with(style::Color::Rgb { r, g, b }))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn display_halfblock(out: &mut impl Write, fb: &Framebuffer) -> io::Result<()> {
    for row in 0..fb.height / 2 {
        for x in 0..fb.width {
            let (tr, tg, tb) = fb.get(x, row * 2).to_rgb8();
            let (br, bg, bb) = fb.get(x, row * 2 + 1).to_rgb8();
            let cell = "▀"
                .with(style::Color::Rgb {
                    r: tr,
                    g: tg,
                    b: tb,
                })
                .on(style::Color::Rgb {
                    r: br,
                    g: bg,
                    b: bb,
                });
            write!(out, "{cell}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn display_ascii(out: &mut impl Write, fb: &Framebuffer) -> io::Result<()> {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..fb.height {
        for x in 0..fb.width {
            let lum = fb.get(x, y).luminance();
            // NaN luminance maps to the blank end of the ramp.
            let idx = if lum > 0.0 {
                (lum.min(0.999) * RAMP.len() as f64) as usize
            } else {
                0
            };
            write!(out, "{}", RAMP[idx] as char)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraConfig, Lens, Pose};
    use crate::material::SceneTri;
    use crate::math::Vec3;

    fn one_triangle() -> Scene {
        [SceneTri::new(
            Vec3::new(-7.0, -5.0, 0.0),
            Vec3::new(5.0, -5.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
        )
        .with_active(Color::new(0.5, 0.5, 0.6))]
        .into_iter()
        .collect()
    }

    fn quiet(width: u32, height: u32) -> RenderConfig {
        RenderConfig {
            width,
            height,
            progress: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn camera_pixel_centres_the_image() {
        assert_eq!(camera_pixel(0, 0, 10, 6), (-5, 3));
        assert_eq!(camera_pixel(5, 3, 10, 6), (0, 0));
        assert_eq!(camera_pixel(9, 5, 10, 6), (4, -2));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let err = quiet(0, 10).validate().unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        let err = quiet(70_000, 70_000).validate().unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
        assert!(quiet(16_384, 16_384).validate().is_ok());
    }

    #[test]
    fn framebuffer_indexes_past_u32_row_products() {
        let mut fb = Framebuffer::new(3, 2);
        fb.set(2, 1, Color::WHITE);
        assert_eq!(fb.pixels.len(), 6);
        assert_eq!(fb.pixels[5], Color::WHITE);
        assert_eq!(fb.index(0, 1), 3);

        let wide = Framebuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        assert_eq!(wide.index(69_999, 69_999), 4_899_999_999);
    }

    #[test]
    fn empty_scene_is_rejected() {
        let cam = CameraConfig::default().tracer(4, 4);
        let err = render(&cam, &Scene::new(), &quiet(4, 4)).err();
        assert!(matches!(err, Some(RenderError::EmptyScene)));
    }

    #[test]
    fn render_matches_per_pixel_queries() {
        let scene = one_triangle();
        let cam = CameraConfig::default().tracer(16, 12);
        let (fb, stats) = render(&cam, &scene, &quiet(16, 12)).expect("render");

        assert_eq!(stats.primary_rays, 16 * 12);
        for y in 0..12 {
            for x in 0..16 {
                let (cx, cy) = camera_pixel(x, y, 16, 12);
                assert_eq!(fb.get(x, y), cam.color_at(&scene, cx, cy));
            }
        }
        assert_eq!(fb.get(8, 6), Color::new(0.5, 0.5, 0.6));
    }

    #[test]
    fn dedicated_thread_pool_gives_the_same_image() {
        let scene = one_triangle();
        let cam = CameraConfig::default().tracer(8, 8);
        let (shared, _) = render(&cam, &scene, &quiet(8, 8)).expect("render");
        let config = RenderConfig {
            threads: 2,
            ..quiet(8, 8)
        };
        let (pooled, _) = render(&cam, &scene, &config).expect("render");
        assert_eq!(shared.pixels, pooled.pixels);
    }

    #[test]
    fn preview_fills_the_projected_triangle() {
        let scene = one_triangle();
        let cam = ProjectionCamera::new(
            Pose::from_rotation(Vec3::new(0.0, 0.0, 40.0), &Default::default()),
            Lens::new(1.0, 80, 80),
        );
        let fb = render_preview(&cam, &scene, &quiet(80, 80)).expect("preview");

        // Centre is inside, corners are background.
        assert_eq!(fb.get(40, 40), Color::new(0.5, 0.5, 0.6));
        assert_eq!(fb.get(0, 0), Color::BLACK);
        assert_eq!(fb.get(79, 79), Color::BLACK);
        assert!(fb.pixels.iter().any(|&p| p == OUTLINE));
    }

    #[test]
    fn ppm_export_writes_header_and_pixels() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set(1, 0, Color::new(2.0, 0.5, 0.0));
        let path = std::env::temp_dir().join(format!("tritrace-{}.ppm", std::process::id()));
        fb.write_ppm(&path).expect("write ppm");

        let bytes = std::fs::read(&path).expect("read back");
        std::fs::remove_file(&path).ok();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(&bytes[header.len()..], &[0, 0, 0, 255, 127, 0]);
    }
}
