use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// Fixed scene camera: straight-on view from a fixed distance, with the
/// projection selected per frame. Only the aspect ratio changes at runtime.
pub struct SceneCamera {
    pub aspect: f32,

    pub fov: f32,
    pub near: f32,
    pub far: f32,

    pub ortho_half_height: f32,
    pub ortho_near: f32,

    pub distance: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            aspect: 16.0 / 9.0,

            fov: 30.0_f32.to_radians(),
            near: 1.0,
            far: 100.0,

            ortho_half_height: 25.0,
            // The orthographic near plane sits closer than the perspective
            // one; both planes are kept as-is.
            ortho_near: 0.1,

            distance: 60.0,
        }
    }
}

impl SceneCamera {
    pub fn projection_matrix(&self, mode: ProjectionMode) -> Mat4 {
        match mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_width = self.ortho_half_height * self.aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -self.ortho_half_height,
                    self.ortho_half_height,
                    self.ortho_near,
                    self.far,
                )
            }
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_mode_changes_projection_only() {
        let camera = SceneCamera::default();

        let perspective = camera.projection_matrix(ProjectionMode::Perspective);
        let orthographic = camera.projection_matrix(ProjectionMode::Orthographic);
        assert_ne!(perspective, orthographic);

        // The view transform takes no mode input, so a mode switch cannot
        // move the camera: the same point maps the same way regardless.
        let probe = Vec3::new(1.0, 2.0, 3.0);
        let viewed = camera.view_matrix().transform_point3(probe);
        assert!((viewed - Vec3::new(1.0, 2.0, -57.0)).length() < 1e-6);
    }

    #[test]
    fn view_matrix_pulls_the_scene_back() {
        let camera = SceneCamera::default();
        let eye = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((eye.z + 60.0).abs() < 1e-6);
    }

    #[test]
    fn orthographic_extent_scales_with_aspect() {
        let mut camera = SceneCamera::default();
        camera.set_aspect(200.0, 100.0);

        let projection = camera.projection_matrix(ProjectionMode::Orthographic);
        // A point at the half-width edge lands on clip x = 1.
        let edge = projection.project_point3(Vec3::new(50.0, 0.0, -10.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        // The half-height edge lands on clip y = 1.
        let top = projection.project_point3(Vec3::new(0.0, 25.0, -10.0));
        assert!((top.y - 1.0).abs() < 1e-5);
    }
}
