//! Toolbar presentation: zoom controls, reset, and the fullscreen toggle.
//!
//! The presenter holds no state. [`ToolbarView::present`] derives everything
//! from the active transform and presentation mode; clicks come back as
//! [`ToolbarCommand`]s for the viewer to apply.

#[cfg(test)]
#[path = "toolbar_test.rs"]
mod toolbar_test;

use std::fmt;

use crate::fullscreen::PresentationMode;
use crate::transform::{ViewTransform, zoom_percent};

/// An action a toolbar affordance triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    ZoomOut,
    ZoomIn,
    Reset,
    EnterFullscreen,
    ExitFullscreen,
}

impl ToolbarCommand {
    /// Tooltip title for the affordance.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::ZoomOut => "Zoom Out",
            Self::ZoomIn => "Zoom In",
            Self::Reset => "Reset View",
            Self::EnterFullscreen => "Full Screen",
            Self::ExitFullscreen => "Exit Full Screen",
        }
    }
}

/// Where the toolbar sits on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Bottom-right corner, semi-opaque until hovered.
    BottomRight,
    /// Bottom center, fully opaque.
    BottomCenter,
}

/// Everything a host needs to draw the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    /// Buttons in display order; the zoom label sits after the first.
    pub buttons: Vec<ToolbarCommand>,
    /// Current zoom, e.g. `"120%"`.
    pub zoom_label: String,
    pub placement: Placement,
    /// Separate close affordance shown in the fullscreen corner.
    pub close: Option<ToolbarCommand>,
}

impl ToolbarView {
    #[must_use]
    pub fn present(transform: &ViewTransform, mode: PresentationMode, fullscreen_enabled: bool) -> Self {
        let mut buttons = vec![ToolbarCommand::ZoomOut, ToolbarCommand::ZoomIn, ToolbarCommand::Reset];
        let (placement, close) = match mode {
            PresentationMode::Inline => {
                if fullscreen_enabled {
                    buttons.push(ToolbarCommand::EnterFullscreen);
                }
                (Placement::BottomRight, None)
            }
            PresentationMode::Fullscreen => {
                buttons.push(ToolbarCommand::ExitFullscreen);
                (Placement::BottomCenter, Some(ToolbarCommand::ExitFullscreen))
            }
        };
        Self { buttons, zoom_label: format!("{}%", zoom_percent(transform.scale)), placement, close }
    }

    #[must_use]
    pub fn has(&self, command: ToolbarCommand) -> bool {
        self.buttons.contains(&command)
    }
}

impl fmt::Display for ToolbarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.buttons.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "[{}]", command.title())?;
            if i == 0 {
                write!(f, " {}", self.zoom_label)?;
            }
        }
        Ok(())
    }
}
