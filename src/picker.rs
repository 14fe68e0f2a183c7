//! Ordered fallback chain over the pixel-picking backends.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::capture::CaptureBackend;
use crate::color::ColorSample;
use crate::command::{CommandRunner, SystemRunner};
use crate::compositor::HyprpickerBackend;
use crate::config::{BackendChoice, Config};
use crate::env::{self, Compositor};
use crate::error::{BackendError, NoColorPicked};
use crate::portal::PortalBackend;

/// One way of getting a color out of the desktop.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self) -> Result<ColorSample, BackendError>;
}

/// Tries each backend once, in order, and returns the first color.
///
/// Holds no state between calls, but a single pick drives interactive tools
/// that grab the pointer; callers should not run two picks at once.
pub struct Picker {
    backends: Vec<Box<dyn Backend>>,
    cancel: CancellationToken,
}

impl Picker {
    pub fn with_backends(backends: Vec<Box<dyn Backend>>) -> Self {
        Self {
            backends,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops the chain before the next attempt once `cancel` fires.
    pub fn cancel_on(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Chain for the current session, running real tools.
    pub fn from_env(config: &Config, cancel: CancellationToken) -> Self {
        let compositor = env::classify();
        tracing::info!(%compositor, "detected compositor");
        Self::for_compositor(config, compositor, Arc::new(SystemRunner), cancel)
    }

    /// Portal first, then the compositor's own tool, then grim + slurp.
    ///
    /// Sway has no dedicated picker, so its native path is the capture
    /// pipeline itself and that pipeline is only tried once.
    pub fn for_compositor(
        config: &Config,
        compositor: Compositor,
        runner: Arc<dyn CommandRunner>,
        cancel: CancellationToken,
    ) -> Self {
        let portal = || -> Box<dyn Backend> {
            Box::new(PortalBackend::new(config.portal_timeout(), cancel.clone()))
        };
        let hyprpicker = || -> Box<dyn Backend> {
            Box::new(HyprpickerBackend::new(
                runner.clone(),
                config.tools.hyprpicker.clone(),
            ))
        };
        let capture = || -> Box<dyn Backend> {
            Box::new(CaptureBackend::new(runner.clone(), config.tools.clone()))
        };

        let backends = match config.backend {
            BackendChoice::Portal => vec![portal()],
            BackendChoice::Hyprland => vec![hyprpicker()],
            BackendChoice::Capture => vec![capture()],
            BackendChoice::Auto => match compositor {
                Compositor::Hyprland => vec![portal(), hyprpicker(), capture()],
                Compositor::SwayLike | Compositor::Unknown => vec![portal(), capture()],
            },
        };
        Self::with_backends(backends).cancel_on(cancel)
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn pick(&self) -> Result<ColorSample, NoColorPicked> {
        for backend in &self.backends {
            if self.cancel.is_cancelled() {
                tracing::info!("pick cancelled");
                return Err(NoColorPicked);
            }
            tracing::info!(backend = backend.name(), "trying backend");
            match backend.attempt() {
                Ok(color) => {
                    tracing::info!(backend = backend.name(), %color, "color picked");
                    return Ok(color);
                }
                Err(err) => tracing::warn!(backend = backend.name(), %err, "backend failed"),
            }
        }
        tracing::warn!("every backend failed");
        Err(NoColorPicked)
    }
}
