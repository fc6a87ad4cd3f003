//! Subcommand implementations.

use anyhow::{Context, Result, bail};
use clap::Args;
use kurbo::Rect;
use std::path::{Path, PathBuf};
use vellum_core::pages::page_count_for;
use vellum_core::storage::{load_from_path, save_to_path};
use vellum_core::{Canvas, Command, Document, DocumentFile, EditorConfig, ShapeKind, StrokeShape, ViewMode};
use vellum_render::SvgExporter;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Document to inspect
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document to export
    pub file: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// World region for infinite documents, as x,y,width,height
    #[arg(long, value_parser = parse_rect)]
    pub viewport: Option<Rect>,
}

#[derive(Debug, Args)]
pub struct RecognizeArgs {
    /// Document to analyse
    pub file: PathBuf,

    /// Minimum score for a match (defaults to the configured threshold)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Snap matching strokes and save the document
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Path of the new document
    pub file: PathBuf,

    /// Use A4 pages instead of an infinite canvas
    #[arg(long)]
    pub a4: bool,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Parse `x,y,width,height` into a rect.
pub fn parse_rect(value: &str) -> Result<Rect, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {}", p.trim(), e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Ok(Rect::new(*x, *y, x + w, y + h)),
        [_, _, _, _] => Err("width and height must be positive".to_string()),
        _ => Err(format!("expected x,y,width,height, got {} value(s)", parts.len())),
    }
}

fn open(path: &Path) -> Result<Canvas> {
    let file = load_from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let mut canvas = Canvas::with_config(EditorConfig::load_or_default());
    canvas.load_file(file);
    Ok(canvas)
}

fn shape_label(shape: &StrokeShape) -> &str {
    match shape {
        StrokeShape::Freehand => "freehand",
        StrokeShape::Snapped(g) => g.kind().as_str(),
        StrokeShape::Unrecognized { .. } => "unknown",
    }
}

/// One-paragraph summary of a document.
pub fn describe(doc: &Document) -> String {
    let mut counts = [0usize; 4];
    for stroke in doc.strokes() {
        let slot = match stroke.shape.kind() {
            None if stroke.shape.is_shape() => 3,
            None => 0,
            Some(ShapeKind::Line) => 1,
            Some(ShapeKind::Circle) | Some(ShapeKind::Rect) => 2,
        };
        counts[slot] += 1;
    }
    let mut out = format!(
        "mode: {}\nstrokes: {} ({} freehand, {} lines, {} closed shapes, {} unknown)\ntext boxes: {}\n",
        doc.view_mode().as_str(),
        doc.strokes().len(),
        counts[0],
        counts[1],
        counts[2],
        counts[3],
        doc.text_boxes().len()
    );
    match doc.content_bounds() {
        Some(b) => out.push_str(&format!(
            "bounds: {:.1},{:.1} to {:.1},{:.1}\n",
            b.x0, b.y0, b.x1, b.y1
        )),
        None => out.push_str("bounds: empty\n"),
    }
    if doc.view_mode() == ViewMode::A4Notebook {
        out.push_str(&format!("pages: {}\n", page_count_for(doc.content_bounds())));
    }
    out
}

pub fn info(args: InfoArgs) -> Result<()> {
    let canvas = open(&args.file)?;
    print!("{}", describe(canvas.document()));
    Ok(())
}

pub fn export_svg(args: ExportArgs) -> Result<()> {
    let canvas = open(&args.file)?;
    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());

    let files = SvgExporter::new()
        .export_to_dir(canvas.document(), args.viewport, &args.output, &stem)
        .context("SVG export failed")?;
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

pub fn recognize(args: RecognizeArgs) -> Result<()> {
    let mut canvas = open(&args.file)?;
    let threshold = args.threshold.unwrap_or(canvas.config().shape_accept_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold must be between 0 and 1, got {}", threshold);
    }
    let recognizer = vellum_core::ShapeRecognizer::new(canvas.config().recognizer.clone());

    let mut snaps = Vec::new();
    for stroke in canvas.document().strokes() {
        let current = shape_label(&stroke.shape);
        match recognizer.recognize_stroke(stroke) {
            Some(m) if m.score >= threshold => {
                println!("stroke {}: {} -> {} ({:.2})", stroke.id, current, m.kind().as_str(), m.score);
                if !stroke.shape.is_shape() {
                    snaps.push((stroke.id, m.geometry));
                }
            }
            Some(m) => println!(
                "stroke {}: {} ({} at {:.2}, below threshold)",
                stroke.id,
                current,
                m.kind().as_str(),
                m.score
            ),
            None => println!("stroke {}: {}", stroke.id, current),
        }
    }

    if !args.apply || snaps.is_empty() {
        return Ok(());
    }
    let snapped = snaps.len();
    for (id, geometry) in snaps {
        if let Some(cmd) = Command::set_stroke_shape(canvas.document(), id, StrokeShape::Snapped(geometry)) {
            canvas.execute(cmd);
        }
    }
    save(&canvas, &args.file)?;
    println!("snapped {} stroke(s)", snapped);
    Ok(())
}

pub fn new_document(args: NewArgs) -> Result<()> {
    if args.file.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.file.display());
    }
    let mut doc = Document::new();
    if args.a4 {
        doc.set_view_mode(ViewMode::A4Notebook);
    }
    save_to_path(&args.file, &doc.snapshot()).with_context(|| format!("Failed to write {}", args.file.display()))?;
    println!("created {}", args.file.display());
    Ok(())
}

fn save(canvas: &Canvas, path: &Path) -> Result<()> {
    let file: DocumentFile = canvas.document().snapshot();
    save_to_path(path, &file).with_context(|| format!("Failed to save {}", path.display()))
}
