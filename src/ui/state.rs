use crate::renderer::{ProjectionMode, RotationAxis};

/// Per-letter control values as shown in the panel. Speed is the raw
/// slider value; the render state divides it down when applied.
pub struct LetterControls {
    pub speed: f32,
    pub axis: RotationAxis,
}

pub struct UiState {
    pub projection: ProjectionMode,
    pub letters: [LetterControls; 3],
    pub show_stats: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            projection: ProjectionMode::Perspective,
            letters: std::array::from_fn(|_| LetterControls {
                speed: 50.0,
                axis: RotationAxis::default(),
            }),
            show_stats: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_initial_scene() {
        let state = UiState::default();
        assert_eq!(state.projection, ProjectionMode::Perspective);
        for controls in &state.letters {
            assert_eq!(controls.speed, 50.0);
            assert_eq!(controls.axis, RotationAxis::Y);
        }
    }
}
