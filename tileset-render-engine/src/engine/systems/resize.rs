use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::engine::core::app_state::{ViewerContext, ViewportState};

/// Aspect ratio for a window size; `None` while the window has no height.
pub fn aspect_for(width: f32, height: f32) -> Option<f32> {
    (height > 0.0).then(|| width / height)
}

/// Seed the viewport from the primary window before the first resize arrives.
pub fn init_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportState>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    *viewport = ViewportState {
        width: window.width(),
        height: window.height(),
        scale_factor: window.scale_factor(),
    };
}

pub fn handle_window_resize(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window>,
    context: Res<ViewerContext>,
    mut viewport: ResMut<ViewportState>,
    mut projections: Query<&mut Projection>,
) {
    // Only the latest size matters within one frame.
    let Some(event) = resized.read().last() else {
        return;
    };

    let scale_factor = windows
        .get(event.window)
        .map(|window| window.scale_factor())
        .unwrap_or(viewport.scale_factor);
    *viewport = ViewportState {
        width: event.width,
        height: event.height,
        scale_factor,
    };

    let Some(aspect_ratio) = aspect_for(event.width, event.height) else {
        return;
    };

    if let Ok(mut projection) = projections.get_mut(context.camera) {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = aspect_ratio;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resize_app() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<WindowResized>()
            .init_resource::<ViewportState>()
            .add_systems(Update, handle_window_resize);

        let camera = app
            .world_mut()
            .spawn(Projection::Perspective(PerspectiveProjection::default()))
            .id();
        let window = app.world_mut().spawn_empty().id();
        app.insert_resource(ViewerContext {
            camera,
            tileset_root: window,
        });
        (app, camera, window)
    }

    fn aspect_of(app: &App, camera: Entity) -> f32 {
        match app.world().get::<Projection>(camera).unwrap() {
            Projection::Perspective(perspective) => perspective.aspect_ratio,
            _ => unreachable!(),
        }
    }

    #[test]
    fn resize_updates_aspect_and_viewport() {
        let (mut app, camera, window) = resize_app();

        app.world_mut().send_event(WindowResized {
            window,
            width: 1600.0,
            height: 800.0,
        });
        app.update();

        assert!((aspect_of(&app, camera) - 2.0).abs() < 1e-6);
        let viewport = app.world().resource::<ViewportState>();
        assert_eq!(viewport.width, 1600.0);
        assert_eq!(viewport.height, 800.0);
    }

    #[test]
    fn last_resize_in_frame_wins() {
        let (mut app, camera, window) = resize_app();

        app.world_mut().send_event(WindowResized {
            window,
            width: 1600.0,
            height: 800.0,
        });
        app.world_mut().send_event(WindowResized {
            window,
            width: 900.0,
            height: 900.0,
        });
        app.update();

        assert!((aspect_of(&app, camera) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn minimised_window_keeps_aspect() {
        let (mut app, camera, window) = resize_app();
        let before = aspect_of(&app, camera);

        app.world_mut().send_event(WindowResized {
            window,
            width: 1600.0,
            height: 0.0,
        });
        app.update();

        assert_eq!(aspect_of(&app, camera), before);
        assert_eq!(app.world().resource::<ViewportState>().height, 0.0);
    }

    proptest! {
        #[test]
        fn aspect_matches_dimensions(width in 1.0f32..8192.0, height in 1.0f32..8192.0) {
            let aspect = aspect_for(width, height).unwrap();
            prop_assert!((aspect * height - width).abs() <= width * 1e-5);
        }

        #[test]
        fn zero_height_has_no_aspect(width in 0.0f32..8192.0) {
            prop_assert!(aspect_for(width, 0.0).is_none());
        }
    }
}
