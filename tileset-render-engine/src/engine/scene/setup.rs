use bevy::prelude::*;
use constants::coordinate_system::TILESET_UP_CORRECTION;
use constants::render_settings::{
    AMBIENT_LIGHT_BRIGHTNESS, BACKGROUND_COLOUR, CAMERA_FAR, CAMERA_FOV_DEGREES,
    CAMERA_INITIAL_POSITION, CAMERA_NEAR, DIRECTIONAL_LIGHT_ILLUMINANCE,
    DIRECTIONAL_LIGHT_POSITION,
};

use crate::engine::camera::orbit_camera::OrbitController;
use crate::engine::core::app_state::ViewerContext;

/// Parent frame of all streamed tile content.
#[derive(Component)]
pub struct TilesetRoot;

/// Startup system composing the scene once: background, lights, camera and
/// the tileset node.
pub fn setup_scene(mut commands: Commands) {
    commands.insert_resource(ClearColor(BACKGROUND_COLOUR));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_LIGHT_BRIGHTNESS,
        ..default()
    });

    spawn_lighting(&mut commands);
    let camera = spawn_camera(&mut commands);
    let tileset_root = spawn_tileset_root(&mut commands);

    commands.insert_resource(ViewerContext {
        camera,
        tileset_root,
    });
    println!("✓ Scene ready");
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: DIRECTIONAL_LIGHT_ILLUMINANCE,
            ..default()
        },
        Transform::from_translation(DIRECTIONAL_LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_camera(commands: &mut Commands) -> Entity {
    let transform =
        Transform::from_translation(CAMERA_INITIAL_POSITION).looking_at(Vec3::ZERO, Vec3::Y);

    commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: CAMERA_FOV_DEGREES.to_radians(),
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
                ..default()
            }),
            transform,
            OrbitController::from_pose(Vec3::ZERO, &transform),
        ))
        .id()
}

/// Tileset content is Z-up; rotate the node once so it stands in Bevy's Y-up world.
pub fn spawn_tileset_root(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            TilesetRoot,
            Name::new("Tileset"),
            Transform::from_rotation(Quat::from_rotation_x(TILESET_UP_CORRECTION)),
            Visibility::default(),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::camera::orbit_camera::{orbit_camera_update, OrbitController};

    #[derive(Resource)]
    struct Root(Entity);

    fn spawn_root(mut commands: Commands) {
        let root = spawn_tileset_root(&mut commands);
        commands.insert_resource(Root(root));
    }

    #[test]
    fn tileset_root_maps_z_up_to_y_up() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_systems(Startup, spawn_root);
        app.update();

        let root = app.world().resource::<Root>().0;
        let transform = app.world().get::<Transform>(root).unwrap();
        let up = transform.rotation * Vec3::Z;
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn orientation_is_applied_once() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_systems(Startup, spawn_root)
            .add_systems(Update, orbit_camera_update);
        app.update();

        let camera_pose = Transform::from_xyz(0.0, 0.0, 10.0);
        let mut controller = OrbitController::from_pose(Vec3::ZERO, &camera_pose);
        controller.rotate(0.4, 0.2);
        app.world_mut().spawn((camera_pose, controller));

        for _ in 0..10 {
            app.update();
        }

        let root = app.world().resource::<Root>().0;
        let rotation = app.world().get::<Transform>(root).unwrap().rotation;
        assert_eq!(rotation, Quat::from_rotation_x(TILESET_UP_CORRECTION));
    }
}
