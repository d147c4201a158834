//! 3D-Kamera eines Viewports (orthographisch) und Kamera-Deltas.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Standard-Ausrichtungen der MPR-Viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Axial,
    Sagittal,
    Coronal,
}

impl Orientation {
    /// `(viewPlaneNormal, viewUp)` der Ausrichtung im Patientenkoordinatensystem.
    pub fn axes(self) -> (Vec3, Vec3) {
        match self {
            Orientation::Axial => (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, -1.0, 0.0)),
            Orientation::Sagittal => (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            Orientation::Coronal => (Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        }
    }
}

/// Kamera-Parameter wie sie `getCamera()/setCamera()` austauschen.
///
/// `view_plane_normal` zeigt vom Fokuspunkt zur Kamera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub focal_point: Vec3,
    pub view_up: Vec3,
    pub view_plane_normal: Vec3,
    /// Halbe sichtbare Höhe in Welteinheiten (kleiner = stärker gezoomt)
    pub parallel_scale: f32,
    /// Schichtdicke für MIP/Slab-Rendering
    pub slab_thickness: f32,
}

impl Camera {
    /// Abstand Kamera ↔ Fokuspunkt für neu erstellte Kameras.
    pub const DEFAULT_DISTANCE: f32 = 500.0;
    /// Halbe sichtbare Höhe bei Zoom 1.0.
    pub const DEFAULT_PARALLEL_SCALE: f32 = 256.0;
    /// Minimale Schichtdicke.
    pub const MIN_SLAB_THICKNESS: f32 = 0.05;

    /// Kamera mit Blickrichtung `-normal` auf `focal_point`.
    pub fn looking_along(view_plane_normal: Vec3, view_up: Vec3, focal_point: Vec3) -> Self {
        let normal = view_plane_normal.normalize_or_zero();
        Self {
            position: focal_point + normal * Self::DEFAULT_DISTANCE,
            focal_point,
            view_up: view_up.normalize_or_zero(),
            view_plane_normal: normal,
            parallel_scale: Self::DEFAULT_PARALLEL_SCALE,
            slab_thickness: Self::MIN_SLAB_THICKNESS,
        }
    }

    /// Kamera für eine Standard-Ausrichtung.
    pub fn for_orientation(orientation: Orientation, focal_point: Vec3) -> Self {
        let (normal, up) = orientation.axes();
        Self::looking_along(normal, up, focal_point)
    }

    /// Rechts-Achse der Bildebene.
    pub fn view_right(&self) -> Vec3 {
        self.view_up.cross(self.view_plane_normal).normalize_or_zero()
    }

    /// Vorzeichenbehafteter Abstand eines Punkts zur Bildebene.
    pub fn plane_distance(&self, point: Vec3) -> f32 {
        (point - self.focal_point).dot(self.view_plane_normal)
    }

    /// Verschiebt Kamera und Fokuspunkt (Pan / Slice-Wechsel).
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.focal_point += delta;
    }

    /// Verschiebt die Bildebene entlang der Normalen, bis sie `point` enthält.
    pub fn move_plane_through(&mut self, point: Vec3) {
        let distance = self.plane_distance(point);
        self.translate(self.view_plane_normal * distance);
    }

    /// Rotiert Kamera-Frame und Position um einen Drehpunkt.
    pub fn rotate_about(&mut self, pivot: Vec3, rotation: Quat) {
        self.position = pivot + rotation * (self.position - pivot);
        self.focal_point = pivot + rotation * (self.focal_point - pivot);
        self.view_up = (rotation * self.view_up).normalize_or_zero();
        self.view_plane_normal = (rotation * self.view_plane_normal).normalize_or_zero();
    }

    /// Zoomt um einen Faktor (> 1 = hinein), begrenzt auf `[min_scale, max_scale]`.
    pub fn zoom_by_clamped(&mut self, factor: f32, min_scale: f32, max_scale: f32) {
        if factor <= 0.0 {
            return;
        }
        self.parallel_scale = (self.parallel_scale / factor).clamp(min_scale, max_scale);
    }

    /// Berechnet das Delta, das diese Kamera in `other` überführt.
    ///
    /// Rotation: zuerst die Normale auf die neue Normale, danach die
    /// Verdrehung um die neue Normale, bis `view_up` übereinstimmt.
    pub fn delta_to(&self, other: &Camera) -> CameraDelta {
        let align = Quat::from_rotation_arc(self.view_plane_normal, other.view_plane_normal);
        let rotated_up = align * self.view_up;
        let twist_angle = other
            .view_plane_normal
            .dot(rotated_up.cross(other.view_up))
            .atan2(rotated_up.dot(other.view_up));
        let twist = Quat::from_axis_angle(other.view_plane_normal, twist_angle);

        let zoom = if self.parallel_scale > 0.0 {
            other.parallel_scale / self.parallel_scale
        } else {
            1.0
        };

        CameraDelta {
            translation: other.focal_point - self.focal_point,
            rotation: (twist * align).normalize(),
            zoom,
        }
    }

    /// Wendet ein Delta an: Rotation um den eigenen Fokuspunkt, dann Translation, dann Zoom.
    pub fn apply_delta(&mut self, delta: &CameraDelta) {
        if !delta.is_rotation_identity() {
            self.rotate_about(self.focal_point, delta.rotation);
        }
        self.translate(delta.translation);
        self.parallel_scale *= delta.zoom;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_orientation(Orientation::Axial, Vec3::ZERO)
    }
}

/// Relative Kamera-Änderung (Translation, Rotation, Zoom-Verhältnis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDelta {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Verhältnis neuer zu alter `parallel_scale`
    pub zoom: f32,
}

impl CameraDelta {
    const ROTATION_EPSILON: f32 = 1e-6;

    /// Delta ohne Wirkung.
    pub const IDENTITY: CameraDelta = CameraDelta {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        zoom: 1.0,
    };

    fn is_rotation_identity(&self) -> bool {
        self.rotation.abs_diff_eq(Quat::IDENTITY, Self::ROTATION_EPSILON)
            || self.rotation.abs_diff_eq(-Quat::IDENTITY, Self::ROTATION_EPSILON)
    }

    /// `true` wenn das Delta keine Änderung bewirkt.
    pub fn is_identity(&self) -> bool {
        self.translation.length_squared() < f32::EPSILON
            && self.is_rotation_identity()
            && (self.zoom - 1.0).abs() < f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_translate() {
        let mut camera = Camera::default();
        camera.translate(Vec3::new(10.0, 5.0, 0.0));
        assert_relative_eq!(camera.focal_point.x, 10.0);
        assert_relative_eq!(camera.position.y, 5.0);
    }

    #[test]
    fn test_camera_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.zoom_by_clamped(2.0, 1.0, 1000.0);
        assert_relative_eq!(camera.parallel_scale, 128.0);

        camera.zoom_by_clamped(1000.0, 1.0, 1000.0);
        assert_relative_eq!(camera.parallel_scale, 1.0);
    }

    #[test]
    fn test_move_plane_through_point() {
        let mut camera = Camera::for_orientation(Orientation::Axial, Vec3::ZERO);
        camera.move_plane_through(Vec3::new(3.0, 4.0, 12.0));
        assert_relative_eq!(camera.focal_point.z, 12.0, epsilon = 1e-4);
        assert_relative_eq!(camera.focal_point.x, 0.0);
    }

    #[test]
    fn test_delta_roundtrip_reproduces_pan_and_zoom() {
        let before = Camera::default();
        let mut after = before;
        after.translate(Vec3::new(1.0, 2.0, 0.0));
        after.zoom_by_clamped(2.0, 1.0, 1000.0);

        let delta = before.delta_to(&after);
        let mut target = Camera::for_orientation(Orientation::Sagittal, Vec3::new(5.0, 5.0, 5.0));
        target.apply_delta(&delta);

        assert_relative_eq!(target.focal_point.x, 6.0, epsilon = 1e-4);
        assert_relative_eq!(target.focal_point.y, 7.0, epsilon = 1e-4);
        assert_relative_eq!(target.parallel_scale, 128.0, epsilon = 1e-3);
        // Keine Rotation: Sagittal-Normale bleibt erhalten
        assert_relative_eq!(target.view_plane_normal.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_delta_captures_rotation_about_view_up() {
        let before = Camera::default();
        let mut after = before;
        after.rotate_about(after.focal_point, Quat::from_axis_angle(after.view_up, 0.5));

        let delta = before.delta_to(&after);
        let mut replay = before;
        replay.apply_delta(&delta);

        assert_relative_eq!(replay.view_plane_normal.x, after.view_plane_normal.x, epsilon = 1e-4);
        assert_relative_eq!(replay.view_plane_normal.z, after.view_plane_normal.z, epsilon = 1e-4);
        assert_relative_eq!(replay.view_up.y, after.view_up.y, epsilon = 1e-4);
    }

    #[test]
    fn test_unchanged_camera_gives_identity_delta() {
        let camera = Camera::for_orientation(Orientation::Coronal, Vec3::new(1.0, 2.0, 3.0));
        assert!(camera.delta_to(&camera).is_identity());
    }
}
