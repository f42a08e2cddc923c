//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod cloud_url;
pub(crate) mod render;

pub(crate) use check::CheckArgs;
pub(crate) use cloud_url::CloudUrlArgs;
pub(crate) use render::RenderArgs;
