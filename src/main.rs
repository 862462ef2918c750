mod ui;

fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the canvas demo
    ui::run_app()
}
