use crate::foundation::core::PixelType;

/// How a module produces pixels. Fixed for the lifetime of an instance.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMode {
    /// The module draws into host-bound render targets. CPU slots are not exposed.
    #[default]
    RenderTarget,
    /// The module writes every pixel of one CPU slot. Reading back is allowed but slow.
    CpuWriteOnly,
    /// As [`ExecuteMode::CpuWriteOnly`], with read performance on par with writes.
    /// Slot contents are unspecified on first use.
    CpuReadWrite,
}

impl ExecuteMode {
    /// `true` for both CPU modes.
    pub fn is_cpu(self) -> bool {
        matches!(self, Self::CpuWriteOnly | Self::CpuReadWrite)
    }
}

/// Per-cook settings a module reports before format negotiation.
///
/// The host passes a default-initialized value to
/// [`crate::TextureOperator::general_settings`]; modules only assign the fields they care about.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct GeneralSettings {
    /// Cook every frame even when nothing upstream changed.
    pub cook_every_frame: bool,
    /// Cook every frame, but only while something consumes the output.
    pub cook_every_frame_if_asked: bool,
    /// Clear render targets before `execute`. Disable when every pixel is redrawn anyway.
    pub clear_buffers: bool,
    /// Build mip chains for every input texture passed to `execute`.
    pub mipmap_all_inputs: bool,
    /// Input whose size the node inherits when its size policy follows an input.
    pub input_size_index: usize,
    /// Production mode. Latched at the first cook.
    pub execute_mode: ExecuteMode,
    /// CPU slot pixel layout. Latched at the first cook.
    pub pixel_type: PixelType,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            cook_every_frame: false,
            cook_every_frame_if_asked: false,
            clear_buffers: true,
            mipmap_all_inputs: false,
            input_size_index: 0,
            execute_mode: ExecuteMode::RenderTarget,
            pixel_type: PixelType::Bgra8Fixed,
        }
    }
}

/// Mode chosen for one cook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ModeSelection {
    pub(crate) mode: ExecuteMode,
    pub(crate) pixel_type: PixelType,
    /// Set when the module asked for a different mode or pixel type than the latched one.
    pub(crate) conflict: Option<String>,
}

/// Latches the execution mode and CPU pixel type reported at the first cook.
#[derive(Debug, Default)]
pub(crate) struct ModeLatch {
    latched: Option<(ExecuteMode, PixelType)>,
}

impl ModeLatch {
    pub(crate) fn select(&mut self, settings: &GeneralSettings) -> ModeSelection {
        let wanted = (settings.execute_mode, settings.pixel_type);
        let (mode, pixel_type) = *self.latched.get_or_insert(wanted);

        // The pixel type only matters in CPU modes.
        let differs = wanted.0 != mode || (mode.is_cpu() && wanted.1 != pixel_type);
        let conflict = differs.then(|| {
            format!(
                "execute mode is fixed at {mode:?}/{pixel_type:?}; ignoring {:?}/{:?}",
                wanted.0, wanted.1
            )
        });

        ModeSelection {
            mode,
            pixel_type,
            conflict,
        }
    }

    pub(crate) fn latched(&self) -> Option<ExecuteMode> {
        self.latched.map(|(m, _)| m)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/execute/mode.rs"]
mod tests;
