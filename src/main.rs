/// Terminal playback of the QueryWeaver demo for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use qw_dom::ManualScheduler;
    use queryweaver_demo::catalog::EXAMPLES;
    use queryweaver_demo::landing::demo_page;
    use queryweaver_demo::terminal::TerminalPlayer;
    use queryweaver_demo::{DemoConfig, LogSink, boot};

    // The logger level comes from the config, so the config is read first
    // and its outcome reported once logging is up.
    let loaded = DemoConfig::read_default_path();
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => DemoConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.filter_str()),
    )
    .init();

    match loaded {
        Ok(Some(_)) => log::info!("Loaded configuration from {:?}", DemoConfig::default_path()),
        Ok(None) => log::debug!("No config file, using defaults"),
        Err(e) => log::warn!("Ignoring config file: {}", e),
    }

    let demo = boot(demo_page(), ManualScheduler::new(), config, Rc::new(LogSink));

    let mut player = TerminalPlayer::new(std::io::stdout());
    if let Err(e) = player.play(&demo, EXAMPLES.len()) {
        log::error!("Playback failed: {}", e);
    }
    demo.destroy();
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
