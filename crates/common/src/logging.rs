use log::LevelFilter;

/// Initialize logging for the application
/// Should be called once at the start of main()
pub fn init_logging() {
    env_logger::builder().filter_level(LevelFilter::Info).init();
}
