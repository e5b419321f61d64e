//! The module-facing contract.
//!
//! A module implements [`TextureOperator`] and exposes it through an [`OperatorFactory`]. The host
//! drives every instance through one fixed sequence per cook (see [`crate::OperatorNode::cook`]):
//!
//! 1. [`TextureOperator::general_settings`]
//! 2. [`TextureOperator::output_format`]
//! 3. [`TextureOperator::execute`]
//! 4. [`TextureOperator::info_channel_count`], then [`TextureOperator::info_channel`] per channel
//! 5. [`TextureOperator::info_table_size`], then [`TextureOperator::info_table_entries`] per
//!    row (or column)
//! 6. [`TextureOperator::warning`]
//! 7. [`TextureOperator::error`]
//! 8. [`TextureOperator::info_popup`]
//!
//! [`TextureOperator::setup_parameters`] runs once before the first cook.
//! [`TextureOperator::pulse_pressed`] may run between cooks, never during one.
//!
//! Capabilities added in later interface versions get default implementations that do nothing,
//! so a module built against an older [`crate::API_VERSION`] keeps compiling and behaving the same.

use crate::buffers::slots::CpuSlots;
use crate::execute::mode::{ExecuteMode, GeneralSettings};
use crate::format::negotiate::ResolvedFormat;
use crate::format::request::OutputFormat;
use crate::foundation::core::{API_VERSION, FrameIndex};
use crate::operator::params::{ParameterManager, ParameterStore};
use crate::render::target::RenderTarget;
use crate::render::texture::Texture;

/// Immutable identity of the node an instance is created for.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct NodeInfo {
    /// Full path of the node in the host's network.
    pub op_path: String,
    /// Host-unique node id.
    pub op_id: u32,
    /// Id of the host process.
    pub process_id: u32,
}

impl NodeInfo {
    /// Identity for a node in the current process.
    pub fn new(op_path: impl Into<String>, op_id: u32) -> Self {
        Self {
            op_path: op_path.into(),
            op_id,
            process_id: std::process::id(),
        }
    }
}

/// Entry points of a loaded module.
pub trait OperatorFactory {
    /// Interface version the module was built against.
    fn api_version(&self) -> u32 {
        API_VERSION
    }

    /// Create an instance for `info`. `None` is a fatal setup failure: the node is disabled.
    fn create(&self, info: &NodeInfo) -> Option<Box<dyn TextureOperator>>;

    /// Tear an instance down. No cook follows.
    fn destroy(&self, instance: Box<dyn TextureOperator>) {
        drop(instance);
    }
}

/// [`OperatorFactory`] backed by a closure.
pub struct FnFactory<F> {
    version: u32,
    create: F,
}

impl<F> FnFactory<F>
where
    F: Fn(&NodeInfo) -> Option<Box<dyn TextureOperator>>,
{
    /// Factory reporting the current [`API_VERSION`].
    pub fn new(create: F) -> Self {
        Self {
            version: API_VERSION,
            create,
        }
    }

    /// Report a different interface version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl<F> OperatorFactory for FnFactory<F>
where
    F: Fn(&NodeInfo) -> Option<Box<dyn TextureOperator>>,
{
    fn api_version(&self) -> u32 {
        self.version
    }

    fn create(&self, info: &NodeInfo) -> Option<Box<dyn TextureOperator>> {
        (self.create)(info)
    }
}

/// Read-only per-cook inputs.
pub struct CookInputs<'a> {
    pub(crate) frame: FrameIndex,
    pub(crate) time_secs: f64,
    pub(crate) delta_secs: f64,
    pub(crate) inputs: &'a [Texture],
    pub(crate) params: &'a ParameterStore,
}

impl<'a> CookInputs<'a> {
    /// Index of this cook on the instance.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Host time of this cook, in seconds.
    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    /// Seconds since the previous cook (0 for the first).
    pub fn delta_secs(&self) -> f64 {
        self.delta_secs
    }

    /// Connected input textures.
    pub fn inputs(&self) -> &'a [Texture] {
        self.inputs
    }

    /// Input texture `index`.
    pub fn input(&self, index: usize) -> Option<&'a Texture> {
        self.inputs.get(index)
    }

    /// Parameter values.
    pub fn params(&self) -> &'a ParameterStore {
        self.params
    }
}

/// What a module produces pixels into.
///
/// Only the surface of the latched [`ExecuteMode`] exists, so CPU-mode modules cannot reach a
/// drawing context and render-target modules cannot reach CPU slots.
pub enum OutputSurface<'a> {
    /// Host-bound color targets.
    RenderTarget(&'a mut RenderTarget),
    /// The three rotating CPU slots.
    Cpu(&'a mut CpuSlots),
}

/// Output side of [`TextureOperator::execute`]. Valid only for the duration of the call.
pub struct CookOutput<'a> {
    format: &'a ResolvedFormat,
    mode: ExecuteMode,
    surface: OutputSurface<'a>,
}

impl<'a> CookOutput<'a> {
    pub(crate) fn new(
        format: &'a ResolvedFormat,
        mode: ExecuteMode,
        surface: OutputSurface<'a>,
    ) -> Self {
        Self {
            format,
            mode,
            surface,
        }
    }

    /// The format the host resolved for this cook.
    pub fn format(&self) -> &ResolvedFormat {
        self.format
    }

    /// The latched execution mode.
    pub fn mode(&self) -> ExecuteMode {
        self.mode
    }

    /// The production surface.
    pub fn surface_mut(&mut self) -> &mut OutputSurface<'a> {
        &mut self.surface
    }

    /// CPU slots, in CPU modes.
    pub fn cpu_slots(&mut self) -> Option<&mut CpuSlots> {
        match &mut self.surface {
            OutputSurface::Cpu(s) => Some(&mut **s),
            OutputSurface::RenderTarget(_) => None,
        }
    }

    /// Render targets, in render-target mode.
    pub fn render_target(&mut self) -> Option<&mut RenderTarget> {
        match &mut self.surface {
            OutputSurface::RenderTarget(t) => Some(&mut **t),
            OutputSurface::Cpu(_) => None,
        }
    }
}

/// One named numeric side-channel value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InfoChannel {
    /// Channel name.
    pub name: String,
    /// Channel value.
    pub value: f32,
}

impl InfoChannel {
    /// Build a channel.
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Shape of the tabular side-channel output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InfoTableSize {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Fill one column per [`TextureOperator::info_table_entries`] call instead of one row.
    pub by_column: bool,
}

impl InfoTableSize {
    /// Table filled one row at a time.
    pub fn by_rows(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            by_column: false,
        }
    }

    /// Table filled one column at a time.
    pub fn by_columns(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            by_column: true,
        }
    }

    /// Number of fill calls the host makes.
    pub fn fill_calls(self) -> usize {
        if self.by_column { self.cols } else { self.rows }
    }

    /// Entries per fill call.
    pub fn entries_per_call(self) -> usize {
        if self.by_column { self.rows } else { self.cols }
    }
}

/// One row (or column) of the info table, pre-sized by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoTableEntries {
    values: Vec<String>,
}

impl InfoTableEntries {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            values: vec![String::new(); len],
        }
    }

    /// Number of entries to fill.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when there is nothing to fill.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assign entry `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    pub(crate) fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// A texture-producing operator module.
///
/// Only [`TextureOperator::execute`] is required.
pub trait TextureOperator {
    /// Report general settings. `settings` arrives default-initialized every cook.
    fn general_settings(&mut self, settings: &mut GeneralSettings) {
        let _ = settings;
    }

    /// Report the preferred output. `node_default` is what the node's configuration would
    /// produce; return `None` to accept it ("no opinion").
    fn output_format(&mut self, node_default: &OutputFormat) -> Option<OutputFormat> {
        let _ = node_default;
        None
    }

    /// Produce this cook's pixels.
    ///
    /// In CPU modes the module fills one slot and selects it with
    /// [`CpuSlots::set_upload_slot`]; in render-target mode it draws into the bound targets.
    fn execute(&mut self, output: &mut CookOutput<'_>, inputs: &CookInputs<'_>);

    /// Number of info channels to report. 0 disables the channel output.
    fn info_channel_count(&mut self) -> usize {
        0
    }

    /// Info channel `index`, for `index < info_channel_count()`.
    fn info_channel(&mut self, index: usize) -> Option<InfoChannel> {
        let _ = index;
        None
    }

    /// Info table shape, or `None` for no table.
    fn info_table_size(&mut self) -> Option<InfoTableSize> {
        None
    }

    /// Fill row (or column) `index` of the info table.
    fn info_table_entries(&mut self, index: usize, entries: &mut InfoTableEntries) {
        let _ = (index, entries);
    }

    /// Warning message; `None` or empty clears the warning state.
    fn warning(&mut self) -> Option<String> {
        None
    }

    /// Error message; `None` or empty clears the error state.
    fn error(&mut self) -> Option<String> {
        None
    }

    /// Text for the node's info popup; `None` or empty shows nothing.
    fn info_popup(&mut self) -> Option<String> {
        None
    }

    /// Register parameters. Called once, before the first cook.
    fn setup_parameters(&mut self, manager: &mut ParameterManager<'_>) {
        let _ = manager;
    }

    /// A pulse parameter named `name` was pressed. Never called during a cook.
    fn pulse_pressed(&mut self, name: &str) {
        let _ = name;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operator/api.rs"]
mod tests;
