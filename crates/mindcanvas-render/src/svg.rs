use crate::canvas::Scene;
use crate::grid::{DEFAULT_MAX_GRID_DOTS, grid_dots};
use crate::viewport::{ViewportController, ViewportSize};
use crate::{Error, Result};
use mindcanvas_core::CanvasConfig;
use mindcanvas_core::geom::{node_size, point};
use mindcanvas_core::sample::level_color;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: "#F8FAFC",
                edge: "#94A3B8",
                edge_shadow: "rgba(0,0,0,0.1)",
                edge_label: "#64748B",
            },
            Theme::Dark => Palette {
                background: "#111827",
                edge: "#64748B",
                edge_shadow: "rgba(0,0,0,0.4)",
                edge_label: "#94A3B8",
            },
        }
    }
}

struct Palette {
    background: &'static str,
    edge: &'static str,
    edge_shadow: &'static str,
    edge_label: &'static str,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub show_grid: bool,
    pub max_grid_dots: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            show_grid: true,
            max_grid_dots: DEFAULT_MAX_GRID_DOTS,
        }
    }
}

impl RenderOptions {
    /// Reads `render.*` overrides; missing keys keep their defaults.
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        let mut opts = Self::default();
        if let Some(v) = config.get_bool("render.showGrid")? {
            opts.show_grid = v;
        }
        if let Some(v) = config.get_u64("render.maxGridDots")? {
            opts.max_grid_dots = usize::try_from(v).unwrap_or(usize::MAX);
        }
        if let Some(name) = config.get_str("render.theme")? {
            opts.theme = Theme::parse(name).ok_or_else(|| Error::InvalidRenderOption {
                key: "render.theme".to_string(),
                message: format!("unknown theme `{name}` (expected `light` or `dark`)"),
            })?;
        }
        Ok(opts)
    }
}

/// Renders a scene as a standalone SVG document of the given size.
///
/// Grid dots are placed in screen space so their size does not follow the zoom. Connections are
/// drawn before nodes.
pub fn render_svg(
    scene: &Scene<'_>,
    viewport: &ViewportController,
    size: ViewportSize,
    options: &RenderOptions,
) -> String {
    let palette = options.theme.palette();
    let state = viewport.state();
    let mut out = String::new();

    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" class="mindcanvas">"#,
        w = fmt(size.width),
        h = fmt(size.height),
    );
    let _ = write!(
        &mut out,
        r#"<defs><marker id="arrowhead" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto"><polygon points="0 0, 10 3.5, 0 7" fill="{fill}"/></marker></defs>"#,
        fill = palette.edge,
    );
    let _ = write!(
        &mut out,
        r#"<rect class="background" x="0" y="0" width="{w}" height="{h}" fill="{fill}"/>"#,
        w = fmt(size.width),
        h = fmt(size.height),
        fill = palette.background,
    );

    if options.show_grid {
        out.push_str(r#"<g class="grid">"#);
        let dots = grid_dots(
            &state,
            size,
            viewport.options().grid_size,
            options.max_grid_dots,
        );
        for dot in &dots {
            let s = state.world_to_screen(dot.position, size);
            let (r, opacity) = if dot.is_origin { (1.5, 0.8) } else { (1.0, 0.4) };
            let _ = write!(
                &mut out,
                r#"<circle cx="{x}" cy="{y}" r="{r}" fill="rgba(148,163,184,0.7)" opacity="{opacity}"/>"#,
                x = fmt(s.x),
                y = fmt(s.y),
                r = fmt(r),
                opacity = fmt(opacity),
            );
        }
        let origin = state.world_to_screen(point(0.0, 0.0), size);
        let _ = write!(
            &mut out,
            r#"<circle class="origin" cx="{x}" cy="{y}" r="4" fill="rgba(148,163,184,0.9)" stroke="white" stroke-width="2"/>"#,
            x = fmt(origin.x),
            y = fmt(origin.y),
        );
        out.push_str("</g>");
    }

    let _ = write!(
        &mut out,
        r#"<g class="viewport" transform="translate({tx} {ty}) scale({z})">"#,
        tx = fmt(size.width / 2.0 + state.pan.x),
        ty = fmt(size.height / 2.0 + state.pan.y),
        z = fmt(state.zoom),
    );

    out.push_str(r#"<g class="connections">"#);
    for conn in &scene.connections {
        let Some(path) = conn.path.as_ref() else {
            continue;
        };
        let d = path.svg_path_data();
        let _ = write!(
            &mut out,
            r#"<g class="connection" data-from="{from}" data-to="{to}"><path d="{d}" stroke="{shadow}" stroke-width="4" fill="none" transform="translate(2 2)"/><path d="{d}" stroke="{stroke}" stroke-width="2" fill="none" marker-end="url(#arrowhead)"/>"#,
            from = escape_xml(&conn.from.id),
            to = escape_xml(&conn.to.id),
            d = d,
            shadow = palette.edge_shadow,
            stroke = palette.edge,
        );
        if let Some(label) = conn.label.filter(|l| !l.is_empty()) {
            let a = path.label_anchor;
            let _ = write!(
                &mut out,
                r#"<text x="{x}" y="{y}" text-anchor="middle" dy="0.35em" fill="{fill}" font-size="10px" font-weight="500" transform="rotate({angle} {x} {y})">{text}</text>"#,
                x = fmt(a.x),
                y = fmt(a.y),
                fill = palette.edge_label,
                angle = fmt(path.label_angle),
                text = escape_xml(label),
            );
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in &scene.nodes {
        let s = node_size(&node.title);
        let (rx, ry) = (s.width / 2.0, s.height / 2.0);
        let fill = node.color.as_deref().unwrap_or(level_color(0));
        let font_size = (16.0 - 2.0 * f64::from(node.level)).max(12.0);
        let _ = write!(
            &mut out,
            r#"<g class="node" data-id="{id}" transform="translate({x} {y})"><ellipse rx="{srx}" ry="{sry}" fill="rgba(0,0,0,0.1)" transform="translate(2 2)"/><ellipse rx="{rx}" ry="{ry}" fill="{fill}" stroke="white" stroke-width="3"/><text text-anchor="middle" dy="0.35em" fill="white" font-size="{fs}px" font-weight="600">{title}</text></g>"#,
            id = escape_xml(&node.id),
            x = fmt(node.position.x),
            y = fmt(node.position.y),
            srx = fmt(rx + 3.0),
            sry = fmt(ry + 3.0),
            rx = fmt(rx),
            ry = fmt(ry),
            fill = escape_xml(fill),
            fs = fmt(font_size),
            title = escape_xml(&node.title),
        );
    }
    out.push_str("</g></g></svg>\n");
    out
}

/// Number formatting for SVG attributes: integral values print without a fraction, float noise
/// and `-0` are removed.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::viewport::NoCapture;
    use mindcanvas_core::{MindmapDocument, Node, TopLevelConnection};
    use serde_json::json;

    fn canvas() -> Canvas {
        let mut a = Node::new("a", "Tom & Jerry <3", 0, 0.0, 0.0);
        a.color = Some("#FF0000".to_string());
        let doc = MindmapDocument::new(
            vec![a, Node::new("b", "Second", 0, 600.0, 0.0)],
            vec![TopLevelConnection {
                from: "a".into(),
                to: "b".into(),
                label: "relates \"to\"".into(),
            }],
        );
        let mut canvas = Canvas::default();
        canvas.load(doc, &mut NoCapture);
        canvas
    }

    fn render(canvas: &Canvas, options: &RenderOptions) -> String {
        render_svg(
            &canvas.scene(),
            canvas.viewport(),
            ViewportSize::new(800.0, 600.0),
            options,
        )
    }

    #[test]
    fn fmt_trims_float_noise() {
        assert_eq!(fmt(1.0), "1");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(fmt(2.0000000001), "2");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn escapes_text_and_attributes() {
        let svg = render(&canvas(), &RenderOptions::default());
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains("relates &quot;to&quot;"));
        assert!(!svg.contains("Tom & Jerry"));
    }

    #[test]
    fn document_structure() {
        let svg = render(&canvas(), &RenderOptions::default());
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
        assert!(svg.contains(r##"fill="#F8FAFC""##));
        assert!(svg.contains(r##"fill="#FF0000""##));
        assert!(svg.contains(r##"fill="#3B82F6""##));
        assert!(svg.contains(r#"marker-end="url(#arrowhead)""#));

        let connections = svg.find(r#"<g class="connections">"#).expect("connections");
        let nodes = svg.find(r#"<g class="nodes">"#).expect("nodes");
        assert!(connections < nodes);
    }

    #[test]
    fn viewport_transform_matches_state() {
        let canvas = canvas();
        let svg = render(&canvas, &RenderOptions::default());
        // center (300, 0) minus the 200 bias: pan (-500, 0).
        assert!(svg.contains(r#"transform="translate(-100 300) scale(0.7)""#));
    }

    #[test]
    fn grid_can_be_disabled() {
        let canvas = canvas();
        let with_grid = render(&canvas, &RenderOptions::default());
        assert!(with_grid.contains(r#"<g class="grid">"#));
        let without = render(
            &canvas,
            &RenderOptions {
                show_grid: false,
                ..Default::default()
            },
        );
        assert!(!without.contains(r#"<g class="grid">"#));
    }

    #[test]
    fn dark_theme_changes_background() {
        let svg = render(
            &canvas(),
            &RenderOptions {
                theme: Theme::Dark,
                ..Default::default()
            },
        );
        assert!(svg.contains(r##"fill="#111827""##));
    }

    #[test]
    fn options_from_config() {
        let cfg = CanvasConfig::from_value(json!({
            "render": {"theme": "Dark", "showGrid": false, "maxGridDots": 10}
        }));
        let opts = RenderOptions::from_config(&cfg).expect("options");
        assert_eq!(opts.theme, Theme::Dark);
        assert!(!opts.show_grid);
        assert_eq!(opts.max_grid_dots, 10);

        let cfg = CanvasConfig::from_value(json!({"render": {"theme": "sepia"}}));
        assert!(matches!(
            RenderOptions::from_config(&cfg),
            Err(Error::InvalidRenderOption { .. })
        ));
    }
}
