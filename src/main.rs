use code_slicer::app;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = app::run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
