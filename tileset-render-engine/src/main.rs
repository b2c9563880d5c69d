mod engine;

use engine::core::app_setup::create_app;

fn main() {
    let mut app = match create_app() {
        Ok(app) => app,
        Err(error) => {
            eprintln!("Failed to start viewer: {error}");
            return;
        }
    };

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}
