//! Terminal output
//!
//! `cliclack` log lines and spinners plus an `indicatif` bar for precache
//! downloads, falling back to plain lines when stdout is not a terminal or
//! a CI provider is detected.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, outro_warn, section, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, SwcacheTheme};
