//! texop is the host side of a texture-operator contract.
//!
//! A host node loads an operator module, asks it once per cook which output it wants, lends it
//! either render targets or three rotating CPU pixel buffers, and reads back the produced texture
//! plus side-channel output. The public surface:
//!
//! - Implement [`TextureOperator`] and expose it through an [`OperatorFactory`]
//! - Load it into an [`OperatorNode`] with a [`HostConfig`]
//! - Call [`OperatorNode::cook`] and read [`OperatorNode::texture`] and [`OperatorNode::status`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod buffers;
mod execute;
mod format;
mod foundation;
mod host;
mod operator;
mod render;

/// Built-in reference modules.
pub mod operators;

pub use crate::foundation::core::{
    API_VERSION, Aspect, ChannelFlags, FrameIndex, MIN_SUPPORTED_API_VERSION, PixelType,
};
pub use crate::foundation::error::{TexOpError, TexOpResult};

pub use crate::buffers::pixel::{BufferId, PixelBuffer, encode_pixel};
pub use crate::buffers::slots::{CpuSlots, NO_UPLOAD, SLOT_COUNT, SlotState};
pub use crate::execute::mode::{ExecuteMode, GeneralSettings};
pub use crate::format::caps::{
    ChannelLayout, ColorFormatCap, HostCaps, MAX_ANTI_ALIAS, MAX_COLOR_BUFFERS, MAX_TEXTURE_SIZE,
};
pub use crate::format::negotiate::{
    ColorAttachmentKind, RenderBinding, ResolvedFormat, negotiate,
};
pub use crate::format::request::OutputFormat;
pub use crate::host::config::{HostConfig, NodeConfig, SizePolicy};
pub use crate::host::node::{CookReport, NodeState, OperatorNode, UploadReport};
pub use crate::host::status::{ContractViolation, InfoTable, NodeStatus};
pub use crate::operator::api::{
    CookInputs, CookOutput, FnFactory, InfoChannel, InfoTableEntries, InfoTableSize, NodeInfo,
    OperatorFactory, OutputSurface, TextureOperator,
};
pub use crate::operator::params::{
    AppendResult, ParameterDef, ParameterKind, ParameterManager, ParameterStore, ParameterValue,
};
pub use crate::render::target::RenderTarget;
pub use crate::render::texture::{Texture, TextureSource};
