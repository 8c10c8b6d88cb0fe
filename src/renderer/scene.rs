use glam::{Mat4, Vec3};

use crate::model::Letter;
use crate::renderer::camera::ProjectionMode;

/// Raw UI speed values are divided by this before they reach the
/// animation, matching the control scale of the speed inputs.
pub const SPEED_DIVISOR: f32 = 50.0;

/// Fixed multiplier applied to the accumulated angle at draw time.
const ANGLE_DRAW_SCALE: f32 = 1.5;

const LETTER_SLOTS: [Vec3; 3] = [
    Vec3::new(-15.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(15.0, 0.0, 0.0),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    #[default]
    Y,
    Z,
}

impl RotationAxis {
    pub const ALL: [RotationAxis; 3] = [RotationAxis::X, RotationAxis::Y, RotationAxis::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            RotationAxis::X => Vec3::X,
            RotationAxis::Y => Vec3::Y,
            RotationAxis::Z => Vec3::Z,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RotationAxis::X => "X",
            RotationAxis::Y => "Y",
            RotationAxis::Z => "Z",
        }
    }
}

struct LetterMotion {
    angle: f32,
    speed: f32,
    axis: RotationAxis,
}

/// All mutable render state: the projection mode plus each letter's
/// accumulated angle, speed and rotation axis. The UI mutates this only
/// through the setters; the render loop only through `advance`.
pub struct RenderState {
    projection: ProjectionMode,
    motions: [LetterMotion; 3],
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            projection: ProjectionMode::Perspective,
            motions: std::array::from_fn(|_| LetterMotion {
                angle: 0.0,
                speed: 50.0 / SPEED_DIVISOR,
                axis: RotationAxis::default(),
            }),
        }
    }
}

impl RenderState {
    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn set_projection(&mut self, mode: ProjectionMode) {
        self.projection = mode;
    }

    /// Applies a raw speed value from the controls, scaled down by
    /// `SPEED_DIVISOR`.
    pub fn set_speed(&mut self, letter: Letter, raw: f32) {
        self.motions[letter.index()].speed = raw / SPEED_DIVISOR;
    }

    pub fn set_axis(&mut self, letter: Letter, axis: RotationAxis) {
        self.motions[letter.index()].axis = axis;
    }

    pub fn angle(&self, letter: Letter) -> f32 {
        self.motions[letter.index()].angle
    }

    /// Advances every letter's angle by `dt * |speed|`. H and N spin one
    /// way, O the other; the asymmetry is intentional.
    pub fn advance(&mut self, dt: f32) {
        for letter in Letter::ALL {
            let motion = &mut self.motions[letter.index()];
            motion.angle += dt * motion.speed.abs() * spin(letter);
        }
    }

    /// Model matrix for a letter: move to its fixed slot, then rotate in
    /// place around its own centroid.
    pub fn model_matrix(&self, letter: Letter, centroid: Vec3) -> Mat4 {
        let motion = &self.motions[letter.index()];
        Mat4::from_translation(LETTER_SLOTS[letter.index()])
            * Mat4::from_translation(centroid)
            * Mat4::from_axis_angle(motion.axis.unit(), motion.angle * ANGLE_DRAW_SCALE)
            * Mat4::from_translation(-centroid)
    }
}

fn spin(letter: Letter) -> f32 {
    match letter {
        Letter::H | Letter::N => 1.0,
        Letter::O => -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_accumulate_with_per_letter_sign() {
        let mut state = RenderState::default();
        for letter in Letter::ALL {
            state.set_speed(letter, 100.0);
        }

        state.advance(0.5);
        assert!(state.angle(Letter::H) > 0.0);
        assert!(state.angle(Letter::O) < 0.0);
        assert!(state.angle(Letter::N) > 0.0);

        let previous = [
            state.angle(Letter::H),
            state.angle(Letter::O),
            state.angle(Letter::N),
        ];
        state.advance(0.5);
        // Magnitudes grow monotonically for a constant non-zero speed.
        assert!(state.angle(Letter::H) > previous[0]);
        assert!(state.angle(Letter::O) < previous[1]);
        assert!(state.angle(Letter::N) > previous[2]);
    }

    #[test]
    fn negative_speeds_spin_the_same_direction() {
        let mut state = RenderState::default();
        state.set_speed(Letter::H, -100.0);
        state.set_speed(Letter::O, -100.0);

        state.advance(1.0);
        assert!(state.angle(Letter::H) > 0.0);
        assert!(state.angle(Letter::O) < 0.0);
    }

    #[test]
    fn speed_setter_applies_the_divisor() {
        let mut state = RenderState::default();
        state.set_speed(Letter::H, 50.0);
        state.advance(1.0);
        assert!((state.angle(Letter::H) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_axis_is_y() {
        assert_eq!(RotationAxis::default(), RotationAxis::Y);
        assert_eq!(RotationAxis::Y.unit(), Vec3::Y);
    }

    #[test]
    fn letters_rotate_around_their_own_centroid() {
        let mut state = RenderState::default();
        state.set_speed(Letter::O, 73.0);
        state.advance(0.31);

        // The centroid itself is a fixed point of the in-place rotation:
        // it always lands exactly on slot + centroid.
        let centroid = Vec3::new(1.5, -2.0, 0.5);
        let model = state.model_matrix(Letter::O, centroid);
        let mapped = model.transform_point3(centroid);
        assert!((mapped - (LETTER_SLOTS[1] + centroid)).length() < 1e-5);
    }

    #[test]
    fn zero_angle_model_matrix_is_pure_slot_translation() {
        let state = RenderState::default();
        let model = state.model_matrix(Letter::H, Vec3::new(3.0, 4.0, 5.0));
        let mapped = model.transform_point3(Vec3::ZERO);
        assert!((mapped - LETTER_SLOTS[0]).length() < 1e-6);
    }

    #[test]
    fn projection_setter_is_the_only_projection_mutation() {
        let mut state = RenderState::default();
        assert_eq!(state.projection(), ProjectionMode::Perspective);
        state.set_projection(ProjectionMode::Orthographic);
        assert_eq!(state.projection(), ProjectionMode::Orthographic);

        // Advancing time never touches the projection.
        state.advance(10.0);
        assert_eq!(state.projection(), ProjectionMode::Orthographic);
    }
}
