//! `vello_cpu` rasterization of a [`LiveScene`].

use std::sync::Arc;

use anyhow::Context as _;
use kurbo::Shape as _;

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
use crate::foundation::error::{PaticError, PaticResult};
use crate::foundation::math::linspace;
use crate::render::FrameRGBA;
use crate::render::legend::{Legend, format_tick};
use crate::render::scene::{
    DirectorLayer, GlyphLayer, LiveScene, MeshGeometry, MeshLayer, PanelScene,
};

const FIGURE_BG: Rgba8 = Rgba8::opaque(255, 255, 255);
const INK: Rgba8 = Rgba8::opaque(0, 0, 0);
const SPINE_PT: f64 = 0.8;
const TICK_PT: f64 = 3.5;
const FONT_PT: f64 = 10.0;
const AXIS_TICKS: usize = 6;
const COLORBAR_BANDS: usize = 256;

/// Stateful CPU rasterizer; caches the rendered label overlay between frames.
pub struct CpuRasterizer {
    dpi: f64,
    fontdb: Arc<usvg::fontdb::Database>,
    labels: Option<(String, Arc<vello_cpu::Pixmap>)>,
}

impl std::fmt::Debug for CpuRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRasterizer")
            .field("dpi", &self.dpi)
            .field("fonts", &self.fontdb.len())
            .finish_non_exhaustive()
    }
}

/// Text placed by the label overlay, in pixels.
struct Label {
    at: Point,
    anchor: &'static str,
    text: String,
}

impl CpuRasterizer {
    /// Rasterizer at `dpi` pixels per inch, with system fonts for labels.
    pub fn new(dpi: f64) -> PaticResult<Self> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(PaticError::range(format!("dpi must be positive, got {dpi}")));
        }
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Ok(Self {
            dpi,
            fontdb: Arc::new(db),
            labels: None,
        })
    }

    /// Output size for the scene's figure.
    pub fn canvas(&self, live: &LiveScene) -> Canvas {
        let scene = live.scene();
        Canvas::from_inches(scene.width_in, scene.height_in, self.dpi)
    }

    /// Rasterize the current state of `live` into premultiplied RGBA8.
    pub fn render(&mut self, live: &LiveScene) -> PaticResult<FrameRGBA> {
        let canvas = self.canvas(live);
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PaticError::render("frame width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PaticError::render("frame height exceeds u16"))?;

        let scene = live.scene();
        let inch = Vec2::new(
            f64::from(canvas.width) / scene.width_in,
            f64::from(canvas.height) / scene.height_in,
        );
        let to_px = |r: Rect| Rect::new(r.x0 * inch.x, r.y0 * inch.y, r.x1 * inch.x, r.y1 * inch.y);
        let pt = self.dpi / 72.0;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        fill_rect(
            &mut ctx,
            Rect::new(0.0, 0.0, f64::from(w), f64::from(h)),
            FIGURE_BG,
        );

        let empty = Vec::new();
        let panel_layers = live.layers().map_or(&empty, |l| &l.panels);

        for (i, panel) in scene.panels.iter().enumerate() {
            let axes = to_px(panel.frame.axes);
            fill_rect(&mut ctx, axes, scene.face_color);
            let Some(layers) = panel_layers.get(i) else {
                continue;
            };
            let data = data_to_px(panel, axes);
            if let (Some(geometry), Some(mesh)) = (&panel.mesh, &layers.mesh)
                && let Some(image) = mesh_image(canvas, axes, data, geometry, mesh)?
            {
                paint_image(&mut ctx, Arc::new(image), w, h);
            }
            for layer in &layers.glyphs {
                draw_glyphs(&mut ctx, data, layer, pt);
            }
            if let Some(directors) = &layers.directors {
                draw_directors(&mut ctx, data, directors, axes.width());
            }
        }

        // Everything outside the plot areas is repainted; this clips overhanging cells and glyphs.
        for panel in &scene.panels {
            let slot = to_px(panel.frame.slot);
            let axes = to_px(panel.frame.axes);
            for strip in margins(slot, axes) {
                fill_rect(&mut ctx, strip, FIGURE_BG);
            }
        }

        let mut labels = Vec::new();
        for (i, panel) in scene.panels.iter().enumerate() {
            let axes = to_px(panel.frame.axes);
            stroke_path(&mut ctx, &axes.to_path(0.1), SPINE_PT * pt, INK);
            axis_ticks(&mut ctx, &mut labels, panel, axes, pt);

            let legend = panel_layers.get(i).and_then(|l| l.legend.as_ref());
            if let (Some(bar), Some(legend)) = (panel.frame.colorbar, legend) {
                draw_colorbar(&mut ctx, &mut labels, legend, to_px(bar), pt);
            }
        }

        if !labels.is_empty() {
            let overlay = self.label_overlay(&labels, canvas, pt)?;
            paint_image(&mut ctx, overlay, w, h);
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// All text of a frame as one image paint; reused while the text is unchanged.
    fn label_overlay(
        &mut self,
        labels: &[Label],
        canvas: Canvas,
        pt: f64,
    ) -> PaticResult<Arc<vello_cpu::Pixmap>> {
        let svg = labels_svg(labels, canvas, FONT_PT * pt);
        if let Some((cached, image)) = &self.labels
            && *cached == svg
        {
            return Ok(Arc::clone(image));
        }

        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse label svg")?;
        let mut raster = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| PaticError::render("failed to allocate label pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut raster.as_mut(),
        );

        let pixmap = Arc::new(premul_bytes_to_pixmap(raster.data(), canvas)?);
        tracing::trace!(labels = labels.len(), "label overlay rasterized");
        self.labels = Some((svg, Arc::clone(&pixmap)));
        Ok(pixmap)
    }
}

/// Data coordinates to pixels for a panel: y grows upwards in data, downwards on screen.
fn data_to_px(panel: &PanelScene, axes: Rect) -> Affine {
    let (x, y) = (panel.x_limits, panel.y_limits);
    let sx = axes.width() / (x.max - x.min);
    let sy = axes.height() / (y.max - y.min);
    Affine::new([sx, 0.0, 0.0, -sy, axes.x0 - x.min * sx, axes.y1 + y.min * sy])
}

/// Nearest-shading mesh sampled at pixel centers inside `axes`.
///
/// Each pixel takes the color of the one cell containing its center, so shared cell edges are
/// drawn without coverage seams. Returns `None` when no pixel is covered.
fn mesh_image(
    canvas: Canvas,
    axes: Rect,
    data: Affine,
    geometry: &MeshGeometry,
    mesh: &MeshLayer,
) -> PaticResult<Option<vello_cpu::Pixmap>> {
    let w = canvas.width as usize;
    let span_x = (axes.x0.max(0.0), axes.x1.min(f64::from(canvas.width)));
    let span_y = (axes.y0.max(0.0), axes.y1.min(f64::from(canvas.height)));
    let mut pixels = vec![Rgba8Premul::transparent(); w * canvas.height as usize];
    let mut covered = false;

    let (ny, nx) = geometry.dims();
    for row in 0..ny {
        for col in 0..nx {
            let color = mesh.colors[row * nx + col];
            if color.a == 0 {
                continue;
            }
            let quad = geometry.corners(row, col).map(|p| data * p);
            let Some((xs, ys)) = pixel_span(&quad, span_x, span_y) else {
                continue;
            };
            let premul = color.premultiplied();
            for py in ys {
                for px in xs.clone() {
                    let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                    if quad_contains(&quad, center) {
                        pixels[py * w + px] = premul;
                        covered = true;
                    }
                }
            }
        }
    }

    if !covered {
        return Ok(None);
    }
    let pixels = pixels
        .into_iter()
        .map(|c| vello_cpu::peniko::color::PremulRgba8 {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        })
        .collect();
    pixmap_from_premul(pixels, canvas).map(Some)
}

/// Pixel indices whose centers can fall inside `quad`, limited to the given spans.
fn pixel_span(
    quad: &[Point; 4],
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
    let (mut lo, mut hi) = (quad[0], quad[0]);
    for p in &quad[1..] {
        lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    // Center `i + 0.5` lies in `[a, b]` for `i` in `ceil(a - 0.5) ..= floor(b - 0.5)`.
    let range = |a: f64, b: f64| {
        let first = (a - 0.5).ceil().max(0.0);
        let end = (b - 0.5).floor() + 1.0;
        (end > first && first.is_finite() && end.is_finite())
            .then(|| first as usize..end as usize)
    };
    Some((
        range(lo.x.max(x0), hi.x.min(x1))?,
        range(lo.y.max(y0), hi.y.min(y1))?,
    ))
}

/// Even-odd test with half-open edges, so a point on an edge shared by two cells belongs to
/// exactly one of them.
fn quad_contains(quad: &[Point; 4], p: Point) -> bool {
    let mut inside = false;
    let mut j = quad.len() - 1;
    for i in 0..quad.len() {
        let (a, b) = (quad[i], quad[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn paint_image(ctx: &mut vello_cpu::RenderContext, pixmap: Arc<vello_cpu::Pixmap>, w: u16, h: u16) {
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(pixmap),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(w),
        f64::from(h),
    ));
}

fn draw_glyphs(ctx: &mut vello_cpu::RenderContext, data: Affine, layer: &GlyphLayer, pt: f64) {
    let radius = layer.radius * pt;
    let width = layer.linewidth * pt;
    for mark in &layer.marks {
        if mark.color.a == 0 {
            continue;
        }
        let center = data * mark.at;
        let place = Affine::translate(center.to_vec2()) * Affine::scale_non_uniform(radius, -radius);
        let path = place * mark.outline.clone();
        if layer.filled {
            fill_path(ctx, &path, mark.color);
        }
        if width > 0.0 {
            stroke_path(ctx, &path, width, mark.color);
        }
    }
}

/// Quiver-style arrows pivoting on their midpoint. Shaft width is 0.25% of the panel width;
/// the head is 2.5 shaft widths wide and 5 long, with its base swept back to 4.5.
fn draw_directors(
    ctx: &mut vello_cpu::RenderContext,
    data: Affine,
    layer: &DirectorLayer,
    axes_width: f64,
) {
    let shaft = 0.0025 * axes_width;
    for arrow in &layer.arrows {
        let center = data * arrow.at;
        let v = data * (arrow.at + arrow.direction * layer.length) - center;
        let len = v.hypot();
        if len <= 0.0 || !len.is_finite() {
            continue;
        }
        let k = (len / (5.0 * shaft)).min(1.0);
        let (head_len, head_axis, head_half) = (5.0 * shaft * k, 4.5 * shaft * k, 1.25 * shaft * k);
        let half = shaft / 2.0;

        let mut path = BezPath::new();
        path.move_to((0.0, -half));
        path.line_to((len - head_axis, -half));
        path.line_to((len - head_len, -head_half));
        path.line_to((len, 0.0));
        path.line_to((len - head_len, head_half));
        path.line_to((len - head_axis, half));
        path.line_to((0.0, half));
        path.close_path();

        let tail = center - v / 2.0;
        let place = Affine::translate(tail.to_vec2()) * Affine::rotate(v.atan2());
        fill_path(ctx, &(place * path), arrow.color);
    }
}

fn axis_ticks(
    ctx: &mut vello_cpu::RenderContext,
    labels: &mut Vec<Label>,
    panel: &PanelScene,
    axes: Rect,
    pt: f64,
) {
    let data = data_to_px(panel, axes);
    let (tick, gap, font) = (TICK_PT * pt, 2.0 * TICK_PT * pt, FONT_PT * pt);
    let (x, y) = (panel.x_limits, panel.y_limits);

    let step = (x.max - x.min) / (AXIS_TICKS - 1) as f64;
    for value in linspace(x.min, x.max, AXIS_TICKS) {
        let px = (data * Point::new(value, y.min)).x;
        segment(ctx, Point::new(px, axes.y1), Point::new(px, axes.y1 + tick), pt);
        labels.push(Label {
            at: Point::new(px, axes.y1 + gap + font * 0.8),
            anchor: "middle",
            text: format_tick(value, step),
        });
    }

    let step = (y.max - y.min) / (AXIS_TICKS - 1) as f64;
    for value in linspace(y.min, y.max, AXIS_TICKS) {
        let py = (data * Point::new(x.min, value)).y;
        segment(ctx, Point::new(axes.x0 - tick, py), Point::new(axes.x0, py), pt);
        labels.push(Label {
            at: Point::new(axes.x0 - gap, py + font * 0.35),
            anchor: "end",
            text: format_tick(value, step),
        });
    }
}

fn draw_colorbar(
    ctx: &mut vello_cpu::RenderContext,
    labels: &mut Vec<Label>,
    legend: &Legend,
    bar: Rect,
    pt: f64,
) {
    let band = bar.height() / COLORBAR_BANDS as f64;
    for i in 0..COLORBAR_BANDS {
        let t = (i as f64 + 0.5) / COLORBAR_BANDS as f64;
        let y1 = bar.y1 - i as f64 * band;
        // Bands overlap by a pixel so no seams show between them.
        let r = Rect::new(bar.x0, (y1 - band - 1.0).max(bar.y0), bar.x1, y1);
        fill_rect(ctx, r, legend.colormap.sample(t));
    }
    stroke_path(ctx, &bar.to_path(0.1), SPINE_PT * pt, INK);

    let (tick, font) = (TICK_PT * pt, FONT_PT * pt);
    for t in &legend.ticks {
        let y = bar.y1 - t.fraction * bar.height();
        segment(ctx, Point::new(bar.x1, y), Point::new(bar.x1 + tick, y), pt);
        labels.push(Label {
            at: Point::new(bar.x1 + 2.0 * tick, y + font * 0.35),
            anchor: "start",
            text: t.label.clone(),
        });
    }
}

/// Up to four rectangles covering `slot` minus `axes`.
fn margins(slot: Rect, axes: Rect) -> impl Iterator<Item = Rect> {
    [
        Rect::new(slot.x0, slot.y0, slot.x1, axes.y0),
        Rect::new(slot.x0, axes.y1, slot.x1, slot.y1),
        Rect::new(slot.x0, axes.y0, axes.x0, axes.y1),
        Rect::new(axes.x1, axes.y0, slot.x1, axes.y1),
    ]
    .into_iter()
    .filter(|r| r.width() > 0.0 && r.height() > 0.0)
}

fn labels_svg(labels: &[Label], canvas: Canvas, font_px: f64) -> String {
    let (w, h) = (canvas.width, canvas.height);
    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><g font-family="DejaVu Sans, Arial, Helvetica, sans-serif" font-size="{font_px:.2}" fill="#000000">"##
    );
    for label in labels {
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="{}">{}</text>"#,
            label.at.x,
            label.at.y,
            label.anchor,
            escape_xml(&label.text)
        ));
    }
    svg.push_str("</g></svg>");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn segment(ctx: &mut vello_cpu::RenderContext, a: Point, b: Point, pt: f64) {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    stroke_path(ctx, &path, SPINE_PT * pt, INK);
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: Rect, c: Rgba8) {
    set_color(ctx, c);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, c: Rgba8) {
    set_color(ctx, c);
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Strokes are converted to fills so every primitive goes through `fill_path`.
fn stroke_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, width: f64, c: Rgba8) {
    let outline = kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        0.05,
    );
    fill_path(ctx, &outline, c);
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_bytes_to_pixmap(rgba8_premul: &[u8], canvas: Canvas) -> PaticResult<vello_cpu::Pixmap> {
    if rgba8_premul.len() != canvas.width as usize * canvas.height as usize * 4 {
        return Err(PaticError::render("label raster byte length mismatch"));
    }
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect();
    pixmap_from_premul(pixels, canvas)
}

fn pixmap_from_premul(
    pixels: Vec<vello_cpu::peniko::color::PremulRgba8>,
    canvas: Canvas,
) -> PaticResult<vello_cpu::Pixmap> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| PaticError::render("image width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| PaticError::render("image height exceeds u16"))?;
    let may_have_opacities = pixels.iter().any(|px| px.a != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
