//! Application lifecycle and module contracts.
//!
//! [`Application`] drives the frame loop; [`Module`]s plug into it through
//! per-phase hooks that receive a context for that phase.

mod application;
mod ctx;
mod main_thread;
mod module;
mod settings;

pub use application::{AppHandle, Application, LifecycleState, MainThreadJob, version};
pub use ctx::{EventCtx, RenderCtx, SetupCtx, UpdateCtx};
pub use module::{Module, ModuleList, ModuleRef};
pub use settings::{Settings, WindowConfig};
