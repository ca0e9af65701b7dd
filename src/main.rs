use lagprobe::{
    application::{scenarios::ProbeScenarios, ProbeClient},
    types::ProbeConfig,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // If RUST_LOG is not set to a specific level, set the default log level to INFO
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let probe = ProbeClient::new(ProbeConfig::default());
    let separator = "=".repeat(60);

    println!("Lag compensation probe with requestId");
    println!("{}", separator);

    println!("\n1. Testing moveCharacter...");
    probe.run_move_character().await;

    println!("\n{}", separator);
    println!("\n2. Testing joinCharacter...");
    probe.run_join_character().await;

    println!("\nProbe finished");
    Ok(())
}
