use anyhow::Result;
use holo::core::AppConfig;
use holo::game::GameApp;
use holo::games::QuadGame;
use holo::host::GameHost;

fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load_or_default("holo.ron");
    tracing::info!(target: "host", app = %config.app_name, "starting");

    let host = GameHost::desktop()?;
    let mut app = GameApp::new(QuadGame::new(config.window, config.device))
        .with_target_fps(config.target_fps);
    host.install_and_run(&mut app)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
