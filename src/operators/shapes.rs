//! Render-target reference module: a spinning regular polygon.

use crate::execute::mode::GeneralSettings;
use crate::format::request::OutputFormat;
use crate::operator::api::{
    CookInputs, CookOutput, InfoChannel, NodeInfo, OperatorFactory, TextureOperator,
};
use crate::operator::params::ParameterManager;
use kurbo::Shape;

const COLORS: [(&str, [u8; 4]); 3] = [
    ("Amber", [255, 176, 32, 255]),
    ("Teal", [32, 200, 180, 255]),
    ("Magenta", [220, 40, 160, 255]),
];

/// Closed regular polygon with `sides` corners on a circle of `radius` around the origin.
pub fn polygon(sides: u32, radius: f64) -> kurbo::BezPath {
    let sides = sides.max(3);
    let mut path = kurbo::BezPath::new();
    for i in 0..sides {
        let a =
            std::f64::consts::TAU * f64::from(i) / f64::from(sides) - std::f64::consts::FRAC_PI_2;
        let p = kurbo::Point::new(radius * a.cos(), radius * a.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Spinning polygon drawn into color target 0; color target 1 (when bound) gets a coverage disc.
///
/// Parameters: `Sides`, `Spin` (turns per second), `Color` (menu), `Clear` (toggle, off leaves
/// trails).
pub struct ShapesOperator {
    angle: f64,
    clear: bool,
    drawn: u64,
    error: Option<String>,
}

impl ShapesOperator {
    /// Fresh instance.
    pub fn new(_info: &NodeInfo) -> Self {
        Self {
            angle: 0.0,
            clear: true,
            drawn: 0,
            error: None,
        }
    }
}

impl TextureOperator for ShapesOperator {
    fn general_settings(&mut self, settings: &mut GeneralSettings) {
        settings.cook_every_frame = true;
        settings.clear_buffers = self.clear;
    }

    fn output_format(&mut self, node_default: &OutputFormat) -> Option<OutputFormat> {
        let mut req = node_default.clone();
        req.anti_alias = req.anti_alias.max(4);
        req.color_buffers = 2;
        req.depth_bits = 24;
        Some(req)
    }

    fn execute(&mut self, output: &mut CookOutput<'_>, inputs: &CookInputs<'_>) {
        self.error = None;
        let params = inputs.params();
        let sides = params.int("Sides").unwrap_or(5);
        let spin = params.float("Spin").unwrap_or(0.25);
        let color = usize::try_from(params.int("Color").unwrap_or(0))
            .ok()
            .and_then(|i| COLORS.get(i))
            .map_or(COLORS[0].1, |c| c.1);
        // Read here so the next cook's general settings see the new value.
        self.clear = params.toggle("Clear").unwrap_or(true);

        let Some(target) = output.render_target() else {
            self.error = Some("shapes needs the render-target execute mode".to_string());
            return;
        };
        self.angle = (self.angle + std::f64::consts::TAU * spin * inputs.delta_secs())
            .rem_euclid(std::f64::consts::TAU);

        let (w, h) = (f64::from(target.width()), f64::from(target.height()));
        let center = kurbo::Affine::translate((w / 2.0, h / 2.0));
        let radius = w.min(h) * 0.4;

        let ctx = target.primary();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if self.clear {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(16, 16, 24, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }
        let [r, g, b, a] = color;
        ctx.set_transform(affine_to_cpu(center * kurbo::Affine::rotate(self.angle)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_path(&bezpath_to_cpu(&polygon(sides.clamp(3, 12) as u32, radius)));

        if let Some(mask) = target.color(1) {
            let disc = kurbo::Circle::new((0.0, 0.0), radius).to_path(0.1);
            mask.set_transform(affine_to_cpu(center));
            mask.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            mask.fill_path(&bezpath_to_cpu(&disc));
        }
        self.drawn += 1;
    }

    fn info_channel_count(&mut self) -> usize {
        2
    }

    fn info_channel(&mut self, index: usize) -> Option<InfoChannel> {
        match index {
            0 => Some(InfoChannel::new("angle", self.angle as f32)),
            1 => Some(InfoChannel::new("drawn", self.drawn as f32)),
            _ => None,
        }
    }

    fn error(&mut self) -> Option<String> {
        self.error.clone()
    }

    fn setup_parameters(&mut self, manager: &mut ParameterManager<'_>) {
        manager.set_page("Shape");
        manager.append_int("Sides", "Sides", 5, 3, 12);
        manager.append_float("Spin", "Spin", 0.25, -4.0, 4.0);
        manager.append_menu("Color", "Color", &COLORS.map(|c| c.0), 0);
        manager.append_toggle("Clear", "Clear", true);
    }
}

/// Factory for [`ShapesOperator`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ShapesFactory;

impl OperatorFactory for ShapesFactory {
    fn create(&self, info: &NodeInfo) -> Option<Box<dyn TextureOperator>> {
        Some(Box::new(ShapesOperator::new(info)))
    }
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
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

#[cfg(test)]
#[path = "../../tests/unit/operators/shapes.rs"]
mod tests;
