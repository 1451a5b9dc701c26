//! View models for the booth viewport and controls.
//!
//! Nothing here is stored. Every render recomputes the scene from the
//! workflow state, the natural size of the current image, and the
//! viewport size, so the drawing code never branches on state itself.

use crate::types::{BoothVariant, Dimensions};
use crate::workflow::WorkflowState;

/// Face opacity while the portrait is not finished.
pub const IN_PROGRESS_OPACITY: f64 = 0.7;

/// Vertical offset of the finished passport portrait, as a fraction of
/// the viewport.
pub const PASSPORT_COMPLETE_OFFSET: f64 = 0.15;

/// Placement of the face layer inside the viewport, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLayout {
    /// Layer opacity, `0.0..=1.0`.
    pub opacity: f64,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
}

/// Compute where the face image is drawn.
///
/// By default the face fills the viewport height at reduced opacity,
/// with its width following the image's aspect ratio. The finished
/// portrait is scaled down to [`BoothVariant::complete_scale`] and drawn
/// fully opaque. Faces narrower than the viewport are centered
/// horizontally; wider ones are pinned to the left edge.
#[must_use]
pub fn face_layout(
    state: WorkflowState,
    natural: Dimensions,
    viewport: u32,
    variant: BoothVariant,
) -> FaceLayout {
    let size = f64::from(viewport);
    let aspect = natural.aspect_ratio().unwrap_or(0.0);

    let mut opacity = IN_PROGRESS_OPACITY;
    let mut height = size;
    let mut width = size * aspect;
    let mut y = 0.0;

    if state == WorkflowState::Complete {
        let scale = variant.complete_scale();
        opacity = 1.0;
        height *= scale;
        width *= scale;
        y = match variant {
            BoothVariant::Passport => PASSPORT_COMPLETE_OFFSET * size,
            BoothVariant::Sing => (size - height) / 2.0,
        };
    }

    let x = if width < size { (size - width) / 2.0 } else { 0.0 };

    FaceLayout {
        opacity,
        x,
        y,
        width,
        height,
    }
}

/// Circular clip region, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleClip {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Radius.
    pub radius: f64,
}

impl CircleClip {
    /// The circle inscribed in a square viewport.
    #[must_use]
    pub fn inscribed(viewport: u32) -> Self {
        let half = f64::from(viewport) / 2.0;
        Self {
            cx: half,
            cy: half,
            radius: half,
        }
    }
}

/// Everything needed to draw the viewport for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    /// Side length of the square viewport.
    pub viewport: u32,
    /// Whether the decorative background fills the viewport first.
    pub background: bool,
    /// Clip applied to every layer, if any.
    pub clip: Option<CircleClip>,
    /// Face layer placement.
    pub face: FaceLayout,
}

/// Build the scene for the current state.
///
/// The passport booth shows the raw capture on its own while `selected`:
/// no background and no clip. Every other state draws the background
/// under the face, clipped to a circle when the variant clips.
#[must_use]
pub fn scene(
    state: WorkflowState,
    natural: Dimensions,
    viewport: u32,
    variant: BoothVariant,
) -> SceneView {
    let face = face_layout(state, natural, viewport, variant);
    let raw_preview = state == WorkflowState::Selected && variant.previews_selection();

    let clip = if !raw_preview && variant.clips_to_circle() {
        Some(CircleClip::inscribed(viewport))
    } else {
        None
    };

    SceneView {
        viewport,
        background: !raw_preview,
        clip,
        face,
    }
}

/// Which control strip sits under the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    /// Upload and take-photo buttons.
    Capture,
    /// Back and start-conversion buttons.
    Confirm,
    /// Progress bar, no buttons.
    Progress {
        /// Bar value out of 100.
        percent: u8,
    },
    /// Back and save-portrait buttons.
    Finished,
    /// Error message with a back button.
    Failed,
}

impl Controls {
    /// The control strip for a workflow state.
    #[must_use]
    pub const fn for_state(state: WorkflowState) -> Self {
        match state {
            WorkflowState::Ready => Self::Capture,
            WorkflowState::Selected => Self::Confirm,
            WorkflowState::Detecting => Self::Progress { percent: 25 },
            WorkflowState::Converting => Self::Progress { percent: 65 },
            WorkflowState::Complete => Self::Finished,
            WorkflowState::Failed { .. } => Self::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionStage;

    const SQUARE: Dimensions = Dimensions::new(512, 512);

    #[test]
    fn complete_square_face_is_scaled_and_centered() {
        let face = face_layout(WorkflowState::Complete, SQUARE, 256, BoothVariant::Passport);
        let side = 256.0 * 0.85;
        assert!((face.width - side).abs() < 1e-9);
        assert!((face.height - side).abs() < 1e-9);
        assert!((face.x - (256.0 - side) / 2.0).abs() < 1e-9);
        assert!((face.y - 0.15 * 256.0).abs() < 1e-9);
        assert!((face.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn complete_square_face_in_sing_variant() {
        let face = face_layout(WorkflowState::Complete, SQUARE, 256, BoothVariant::Sing);
        let side = 256.0 * 0.9;
        assert!((face.width - side).abs() < 1e-9);
        assert!((face.height - side).abs() < 1e-9);
        assert!((face.x - (256.0 - side) / 2.0).abs() < 1e-9);
        assert!((face.y - (256.0 - side) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn in_flight_face_fills_height_and_centers_when_narrow() {
        for state in [WorkflowState::Detecting, WorkflowState::Converting] {
            let face = face_layout(state, Dimensions::new(300, 600), 256, BoothVariant::Passport);
            assert!((face.height - 256.0).abs() < f64::EPSILON);
            assert!((face.width - 128.0).abs() < f64::EPSILON);
            assert!((face.x - 64.0).abs() < f64::EPSILON);
            assert!(face.y.abs() < f64::EPSILON);
            assert!((face.opacity - IN_PROGRESS_OPACITY).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn wide_face_is_pinned_left() {
        let face = face_layout(
            WorkflowState::Converting,
            Dimensions::new(800, 400),
            256,
            BoothVariant::Passport,
        );
        assert!((face.width - 512.0).abs() < f64::EPSILON);
        assert!(face.x.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_height_image_draws_nothing() {
        let face = face_layout(
            WorkflowState::Detecting,
            Dimensions::new(100, 0),
            256,
            BoothVariant::Passport,
        );
        assert!(face.width.abs() < f64::EPSILON);
    }

    #[test]
    fn passport_selection_is_unclipped_raw_preview() {
        let view = scene(WorkflowState::Selected, SQUARE, 256, BoothVariant::Passport);
        assert!(!view.background);
        assert_eq!(view.clip, None);
    }

    #[test]
    fn passport_clips_every_other_state() {
        for state in [
            WorkflowState::Detecting,
            WorkflowState::Converting,
            WorkflowState::Complete,
            WorkflowState::Failed {
                stage: ConversionStage::Convert,
            },
        ] {
            let view = scene(state, SQUARE, 256, BoothVariant::Passport);
            assert!(view.background, "{state} should draw the background");
            assert_eq!(view.clip, Some(CircleClip::inscribed(256)));
        }
    }

    #[test]
    fn sing_never_clips_and_always_draws_background() {
        for state in [WorkflowState::Selected, WorkflowState::Complete] {
            let view = scene(state, SQUARE, 256, BoothVariant::Sing);
            assert!(view.background);
            assert_eq!(view.clip, None);
        }
    }

    #[test]
    fn controls_follow_state() {
        assert_eq!(Controls::for_state(WorkflowState::Ready), Controls::Capture);
        assert_eq!(Controls::for_state(WorkflowState::Selected), Controls::Confirm);
        assert_eq!(
            Controls::for_state(WorkflowState::Detecting),
            Controls::Progress { percent: 25 }
        );
        assert_eq!(
            Controls::for_state(WorkflowState::Converting),
            Controls::Progress { percent: 65 }
        );
        assert_eq!(Controls::for_state(WorkflowState::Complete), Controls::Finished);
        assert_eq!(
            Controls::for_state(WorkflowState::Failed {
                stage: ConversionStage::Detect
            }),
            Controls::Failed
        );
    }
}
