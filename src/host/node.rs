use crate::buffers::slots::{CpuSlots, UploadOutcome};
use crate::execute::mode::{ExecuteMode, GeneralSettings, ModeLatch};
use crate::format::negotiate::{ResolvedFormat, negotiate};
use crate::foundation::core::{API_VERSION, FrameIndex, MIN_SUPPORTED_API_VERSION};
use crate::foundation::error::{TexOpError, TexOpResult};
use crate::host::config::HostConfig;
use crate::host::status::{ContractViolation, InfoTable, NodeStatus};
use crate::operator::api::{
    CookInputs, CookOutput, InfoChannel, InfoTableEntries, NodeInfo, OperatorFactory,
    OutputSurface, TextureOperator,
};
use crate::operator::params::{ParameterManager, ParameterStore, ParameterValue};
use crate::render::target::RenderTarget;
use crate::render::texture::Texture;
use std::rc::Rc;

/// Lifecycle of an [`OperatorNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// An instance exists and can cook.
    Active,
    /// Setup failed; the cook sequence never starts.
    Disabled(String),
    /// The instance was handed back to its factory.
    Destroyed,
}

/// What happened to the displayed texture during a cook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadReport {
    /// CPU slot `slot` was uploaded.
    Uploaded {
        /// Uploaded slot index.
        slot: usize,
    },
    /// Color target 0 was resolved.
    Rendered,
    /// Nothing new; the previous texture stays on display.
    Retained,
}

/// Summary of one successful cook.
#[derive(Clone, Debug)]
pub struct CookReport {
    /// Index of the cook.
    pub frame: FrameIndex,
    /// Latched execution mode.
    pub mode: ExecuteMode,
    /// Format used for the cook.
    pub resolved: ResolvedFormat,
    /// Effect on the displayed texture.
    pub upload: UploadReport,
    /// Contract violations detected during the cook.
    pub violations: Vec<ContractViolation>,
}

/// One host node driving one operator instance.
///
/// Owns everything the instance is lent per cook (CPU slots, render targets, inputs, parameter
/// values) and everything the host reads back (displayed texture, side-channel outputs, status).
pub struct OperatorNode {
    factory: Rc<dyn OperatorFactory>,
    info: NodeInfo,
    config: HostConfig,
    instance: Option<Box<dyn TextureOperator>>,
    state: NodeState,
    latch: ModeLatch,
    settings: Option<GeneralSettings>,
    slots: Option<CpuSlots>,
    target: Option<RenderTarget>,
    displayed: Option<Texture>,
    params: ParameterStore,
    inputs: Vec<Texture>,
    status: NodeStatus,
    channels: Vec<InfoChannel>,
    table: Option<InfoTable>,
    resolved: Option<ResolvedFormat>,
    cooks: u64,
    last_time: Option<f64>,
}

impl std::fmt::Debug for OperatorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorNode")
            .field("info", &self.info)
            .field("state", &self.state)
            .field("cooks", &self.cooks)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl OperatorNode {
    /// Create the node's instance and register its parameters.
    ///
    /// A version outside `MIN_SUPPORTED_API_VERSION..=API_VERSION` or a factory returning no
    /// instance leaves the node [`NodeState::Disabled`].
    pub fn load(factory: Rc<dyn OperatorFactory>, info: NodeInfo, config: HostConfig) -> Self {
        let mut node = Self {
            factory,
            info,
            config,
            instance: None,
            state: NodeState::Active,
            latch: ModeLatch::default(),
            settings: None,
            slots: None,
            target: None,
            displayed: None,
            params: ParameterStore::default(),
            inputs: Vec::new(),
            status: NodeStatus::default(),
            channels: Vec::new(),
            table: None,
            resolved: None,
            cooks: 0,
            last_time: None,
        };

        let version = node.factory.api_version();
        if !(MIN_SUPPORTED_API_VERSION..=API_VERSION).contains(&version) {
            node.disable(format!(
                "module API version {version} is outside supported range \
                 {MIN_SUPPORTED_API_VERSION}..={API_VERSION}"
            ));
            return node;
        }

        let Some(mut op) = node.factory.create(&node.info) else {
            node.disable("module factory returned no instance".to_string());
            return node;
        };
        let mut manager = ParameterManager::new(&mut node.params);
        op.setup_parameters(&mut manager);
        node.instance = Some(op);
        tracing::debug!(op = %node.info.op_path, version, "operator instance created");
        node
    }

    fn disable(&mut self, reason: String) {
        tracing::warn!(op = %self.info.op_path, %reason, "operator node disabled");
        self.status.error = Some(reason.clone());
        self.state = NodeState::Disabled(reason);
    }

    /// Run one cook at host time `time_secs`.
    ///
    /// Module calls happen in a fixed order: general settings, output format, execute, info
    /// channels, info table, warning, error, info popup. Contract violations by the module are
    /// reported through [`OperatorNode::status`] and never fail the cook. `Err` means the node
    /// cannot cook (disabled or destroyed) or the output could not be negotiated; in the latter
    /// case `execute` is skipped and the error is also set on the status.
    #[tracing::instrument(skip(self), fields(op = %self.info.op_path, cook = self.cooks))]
    pub fn cook(&mut self, time_secs: f64) -> TexOpResult<CookReport> {
        match &self.state {
            NodeState::Active => {}
            NodeState::Disabled(reason) => return Err(TexOpError::disabled(reason.clone())),
            NodeState::Destroyed => return Err(TexOpError::disabled("node was destroyed")),
        }
        let mut op = self
            .instance
            .take()
            .ok_or_else(|| TexOpError::disabled("no operator instance"))?;
        let result = self.run_cook(op.as_mut(), time_secs);
        self.instance = Some(op);
        result
    }

    fn run_cook(
        &mut self,
        op: &mut dyn TextureOperator,
        time_secs: f64,
    ) -> TexOpResult<CookReport> {
        let mut violations = Vec::new();

        let mut settings = GeneralSettings::default();
        op.general_settings(&mut settings);
        let selection = self.latch.select(&settings);
        if let Some(msg) = selection.conflict {
            tracing::warn!(%msg, "mode latch conflict");
            violations.push(ContractViolation::ModeChanged(msg));
        }
        let mode = selection.mode;

        let node_default = self
            .config
            .node
            .default_request(&self.inputs, settings.input_size_index);
        let request = op.output_format(&node_default);
        let mut resolved = match negotiate(request.as_ref(), &node_default, mode, &self.config.caps)
        {
            Ok(resolved) => resolved,
            Err(e) => {
                record_failure(&mut self.status, &violations, &e);
                self.settings = Some(settings);
                return Err(e);
            }
        };

        if settings.mipmap_all_inputs {
            for input in &mut self.inputs {
                input.build_mips();
            }
        }

        let frame = FrameIndex(self.cooks);
        let inputs = CookInputs {
            frame,
            time_secs,
            delta_secs: self.last_time.map_or(0.0, |t| time_secs - t),
            inputs: &self.inputs,
            params: &self.params,
        };

        let upload = if mode.is_cpu() {
            self.target = None;
            let (w, h, pt) = (resolved.width, resolved.height, selection.pixel_type);
            let slots = self.slots.get_or_insert_with(|| CpuSlots::new(w, h, pt));
            slots.begin_cook(w, h, pt);

            let mut output = CookOutput::new(&resolved, mode, OutputSurface::Cpu(&mut *slots));
            op.execute(&mut output, &inputs);

            match slots.end_cook() {
                UploadOutcome::Uploaded { slot, buffer } => {
                    self.displayed = Some(Texture::uploaded(slot, frame, buffer));
                    UploadReport::Uploaded { slot }
                }
                UploadOutcome::Retained => UploadReport::Retained,
                UploadOutcome::OutOfRange(value) => {
                    violations.push(ContractViolation::UploadSlotOutOfRange(value));
                    UploadReport::Retained
                }
                UploadOutcome::NotResident(index) => {
                    violations.push(ContractViolation::UploadSlotNotResident(index));
                    UploadReport::Retained
                }
            }
        } else {
            self.slots = None;
            let target = match self.target.take() {
                Some(t) if t.fits(&resolved) => t,
                _ => match RenderTarget::allocate(&resolved) {
                    Ok(t) => t,
                    Err(e) => {
                        record_failure(&mut self.status, &violations, &e);
                        self.settings = Some(settings);
                        return Err(e);
                    }
                },
            };
            let target = self.target.insert(target);
            target.begin_cook();
            resolved.render = Some(target.binding().clone());

            let mut output =
                CookOutput::new(&resolved, mode, OutputSurface::RenderTarget(&mut *target));
            op.execute(&mut output, &inputs);

            let resolved_texture =
                target.resolve(frame, self.displayed.as_ref(), settings.clear_buffers);
            match resolved_texture {
                Ok(texture) => self.displayed = Some(texture),
                Err(e) => {
                    record_failure(&mut self.status, &violations, &e);
                    self.settings = Some(settings);
                    return Err(e);
                }
            }
            UploadReport::Rendered
        };

        for v in &violations {
            tracing::warn!(violation = %v.message(), "operator contract violation");
        }

        let count = op.info_channel_count();
        self.channels = (0..count).filter_map(|i| op.info_channel(i)).collect();

        self.table = op.info_table_size().map(|size| {
            let mut table = InfoTable::new(size);
            for index in 0..size.fill_calls() {
                let mut entries = InfoTableEntries::new(size.entries_per_call());
                op.info_table_entries(index, &mut entries);
                table.put(size.by_column, index, entries.into_values());
            }
            table
        });

        let warning = op.warning();
        let error = op.error();
        let info_popup = op.info_popup();
        self.status = NodeStatus::collect(warning, error, info_popup, &violations);

        self.cooks += 1;
        self.last_time = Some(time_secs);
        self.settings = Some(settings);
        self.resolved = Some(resolved.clone());

        Ok(CookReport {
            frame,
            mode,
            resolved,
            upload,
            violations,
        })
    }

    /// Fire pulse parameter `name`. Cooks hold `&mut self`, so this never lands inside one.
    pub fn pulse(&mut self, name: &str) -> TexOpResult<()> {
        if !self.params.is_pulse(name) {
            return Err(TexOpError::validation(format!("'{name}' is not a pulse parameter")));
        }
        let op = self
            .instance
            .as_mut()
            .ok_or_else(|| TexOpError::disabled("no operator instance"))?;
        op.pulse_pressed(name);
        Ok(())
    }

    /// Assign parameter `name`; visible to the next cook.
    pub fn set_parameter(&mut self, name: &str, value: ParameterValue) -> TexOpResult<()> {
        self.params.set(name, value)
    }

    /// Replace the connected input textures.
    pub fn set_inputs(&mut self, inputs: Vec<Texture>) {
        self.inputs = inputs;
    }

    /// Whether the host should cook this node now.
    ///
    /// `dirty` means something upstream changed; `asked` means a consumer wants the output this
    /// frame. Before the first cook the answer is always yes.
    pub fn wants_cook(&self, dirty: bool, asked: bool) -> bool {
        if !self.is_active() {
            return false;
        }
        match &self.settings {
            None => true,
            Some(s) => dirty || s.cook_every_frame || (s.cook_every_frame_if_asked && asked),
        }
    }

    /// Hand the instance back to its factory. No cook follows.
    pub fn destroy(&mut self) {
        if let Some(op) = self.instance.take() {
            self.factory.destroy(op);
            tracing::debug!(op = %self.info.op_path, "operator instance destroyed");
        }
        self.slots = None;
        self.target = None;
        self.state = NodeState::Destroyed;
    }

    /// Node identity.
    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// Host configuration this node was loaded with.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// `true` while the node can cook.
    pub fn is_active(&self) -> bool {
        self.state == NodeState::Active
    }

    /// Execution mode latched at the first cook.
    pub fn mode(&self) -> Option<ExecuteMode> {
        self.latch.latched()
    }

    /// General settings reported at the latest cook.
    pub fn general_settings(&self) -> Option<&GeneralSettings> {
        self.settings.as_ref()
    }

    /// Number of completed cooks.
    pub fn cook_count(&self) -> u64 {
        self.cooks
    }

    /// Currently displayed texture.
    pub fn texture(&self) -> Option<&Texture> {
        self.displayed.as_ref()
    }

    /// Status strings after the latest cook.
    pub fn status(&self) -> &NodeStatus {
        &self.status
    }

    /// Info channels reported at the latest cook.
    pub fn info_channels(&self) -> &[InfoChannel] {
        &self.channels
    }

    /// Info table reported at the latest cook.
    pub fn info_table(&self) -> Option<&InfoTable> {
        self.table.as_ref()
    }

    /// Registered parameters and their values.
    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    /// Format resolved at the latest successful cook.
    pub fn resolved_format(&self) -> Option<&ResolvedFormat> {
        self.resolved.as_ref()
    }

    /// CPU slots, once a CPU-mode cook has run.
    pub fn cpu_slots(&self) -> Option<&CpuSlots> {
        self.slots.as_ref()
    }

    /// Render targets, once a render-target cook has run.
    pub fn render_target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// Connected inputs.
    pub fn inputs(&self) -> &[Texture] {
        &self.inputs
    }
}

/// Replace the node's status with a failed cook's error, keeping host-detected violations.
fn record_failure(status: &mut NodeStatus, violations: &[ContractViolation], error: &TexOpError) {
    tracing::warn!(error = %error, "cook failed, skipping the remaining module calls");
    *status = NodeStatus::collect(None, Some(error.to_string()), None, violations);
}

impl Drop for OperatorNode {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/node.rs"]
mod tests;
