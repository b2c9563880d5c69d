use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use constants::render_settings::{
    ORBIT_DAMPING_FACTOR, ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE, ORBIT_PAN_SPEED,
    ORBIT_ROTATE_SPEED, ORBIT_ZOOM_STEP,
};

use crate::engine::core::app_state::ViewportState;

const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;
const SETTLE_EPSILON: f32 = 1e-6;

/// Orbit controls around a target point: left-drag rotates, right-drag pans,
/// the wheel dollies. Gestures accumulate into deltas that `update` applies,
/// spread over several frames when damping is enabled.
#[derive(Component, Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    yaw: f32,
    pitch: f32,
    radius: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    pan_delta: Vec3,
    zoom_scale: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_damping: true,
            damping_factor: ORBIT_DAMPING_FACTOR,
            rotate_speed: ORBIT_ROTATE_SPEED,
            pan_speed: ORBIT_PAN_SPEED,
            zoom_step: ORBIT_ZOOM_STEP,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            radius: 1.0,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            pan_delta: Vec3::ZERO,
            zoom_scale: 1.0,
        }
    }
}

impl OrbitController {
    pub fn from_pose(target: Vec3, transform: &Transform) -> Self {
        let mut controller = Self {
            target,
            ..default()
        };
        controller.sync_from_pose(transform);
        controller
    }

    /// Re-derive orbit angles and radius after the pose was written directly.
    /// Pending gesture deltas are discarded.
    pub fn sync_from_pose(&mut self, transform: &Transform) {
        let offset = transform.translation - self.target;
        self.radius = offset.length().max(f32::EPSILON);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / self.radius).clamp(-1.0, 1.0).asin();
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        self.pan_delta = Vec3::ZERO;
        self.zoom_scale = 1.0;
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw_delta += yaw;
        self.pitch_delta += pitch;
    }

    pub fn pan(&mut self, offset: Vec3) {
        self.pan_delta += offset;
    }

    /// Scale the orbit radius; values below 1 move towards the target.
    pub fn dolly(&mut self, scale: f32) {
        self.zoom_scale *= scale;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_moving(&self) -> bool {
        self.yaw_delta != 0.0
            || self.pitch_delta != 0.0
            || self.pan_delta != Vec3::ZERO
            || self.zoom_scale != 1.0
    }

    fn offset(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.radius
    }

    /// Apply one frame of accumulated motion to the camera pose.
    pub fn update(&mut self, transform: &mut Transform) {
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        self.yaw += self.yaw_delta * step;
        self.pitch = (self.pitch + self.pitch_delta * step).clamp(-MAX_PITCH, MAX_PITCH);
        self.radius = (self.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_delta * step;

        transform.translation = self.target + self.offset();
        transform.look_at(self.target, Vec3::Y);

        let decay = 1.0 - step;
        self.yaw_delta = settle(self.yaw_delta * decay);
        self.pitch_delta = settle(self.pitch_delta * decay);
        self.pan_delta = if (self.pan_delta * decay).length() < SETTLE_EPSILON {
            Vec3::ZERO
        } else {
            self.pan_delta * decay
        };
        self.zoom_scale = 1.0;
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < SETTLE_EPSILON { 0.0 } else { value }
}

/// Translate pointer gestures into controller deltas.
pub fn orbit_camera_input(
    mut cameras: Query<(&Transform, &Projection, &mut OrbitController)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    viewport: Res<ViewportState>,
) {
    let height = viewport.height.max(1.0);
    let delta = mouse_motion.delta;

    for (transform, projection, mut controller) in &mut cameras {
        if !controller.enabled {
            continue;
        }

        if mouse_buttons.pressed(MouseButton::Left) && delta != Vec2::ZERO {
            let speed = TAU * controller.rotate_speed / height;
            controller.rotate(-delta.x * speed, delta.y * speed);
        }

        if mouse_buttons.pressed(MouseButton::Right) && delta != Vec2::ZERO {
            let half_fov = match projection {
                Projection::Perspective(perspective) => perspective.fov * 0.5,
                _ => FRAC_PI_2 * 0.5,
            };
            // World units covered by one pixel at the target's depth.
            let pixel = 2.0 * controller.radius() * half_fov.tan() / height * controller.pan_speed;
            let offset = transform.right() * (-delta.x * pixel) + transform.up() * (delta.y * pixel);
            controller.pan(offset);
        }

        let lines = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y * 0.05,
        };
        if lines.abs() > f32::EPSILON {
            let step = controller.zoom_step;
            controller.dolly(step.powf(lines));
        }
    }
}

/// Per-frame controller step; only writes the pose while there is motion.
pub fn orbit_camera_update(mut cameras: Query<(&mut Transform, &mut OrbitController)>) {
    for (mut transform, mut controller) in &mut cameras {
        if controller.is_moving() {
            controller.update(&mut transform);
        }
    }
}
