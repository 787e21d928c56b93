/// Proportional sizing.
///
/// Gameplay geometry is authored for a 500px-tall viewport. Shorter
/// viewports shrink every proportional dimension so the course keeps its
/// shape; taller ones leave sizes alone.
///
/// The viewport height is fixed when the world is built. There is no
/// mid-game reflow.

/// Viewport height at or above which sizes are used as authored.
pub const REFERENCE_HEIGHT: f32 = 500.0;

/// Scale `nominal` to the viewport.
///
/// `ceil(nominal × viewport_height / 500)` below the reference height,
/// `nominal` otherwise. A non-positive or non-finite viewport height is
/// treated as "no scaling" so a bogus terminal size never collapses the
/// course to zero.
pub fn proportional_size(nominal: f32, viewport_height: f32) -> f32 {
    if !viewport_height.is_finite() || viewport_height <= 0.0 {
        return nominal;
    }
    if viewport_height < REFERENCE_HEIGHT {
        (nominal * viewport_height / REFERENCE_HEIGHT).ceil()
    } else {
        nominal
    }
}

/// A resolver bound to one viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    viewport_height: f32,
}

impl Scale {
    pub fn new(viewport_height: f32) -> Self {
        Scale { viewport_height }
    }

    #[inline]
    pub fn resolve(&self, nominal: f32) -> f32 {
        proportional_size(nominal, self.viewport_height)
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }
}
