//! Compositor-specific interactive pickers.

use std::ffi::OsStr;
use std::sync::Arc;

use crate::color::{parse_hex, ColorSample};
use crate::command::CommandRunner;
use crate::error::BackendError;
use crate::picker::Backend;

const BACKEND: &str = "hyprpicker";

/// Runs `hyprpicker -a`, which prints the chosen pixel as `#RRGGBB`.
pub struct HyprpickerBackend {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl HyprpickerBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl Backend for HyprpickerBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn attempt(&self) -> Result<ColorSample, BackendError> {
        pick_via_compositor_tool(self.runner.as_ref(), &self.program)
    }
}

pub fn pick_via_compositor_tool(
    runner: &dyn CommandRunner,
    program: &str,
) -> Result<ColorSample, BackendError> {
    let output = runner
        .output(program, &[OsStr::new("-a")])
        .map_err(|err| BackendError::from_command(BACKEND, err))?;

    let hex = output.trim();
    if hex.is_empty() {
        return Err(BackendError::unavailable(BACKEND, "no output"));
    }
    if !hex.starts_with('#') {
        return Err(BackendError::malformed(BACKEND, format!("unexpected output {hex:?}")));
    }

    parse_hex(hex).map_err(|err| BackendError::malformed(BACKEND, err))
}
