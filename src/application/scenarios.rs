use std::future::Future;

use log::{error, trace};

use crate::{
    packets::{JoinCharacterBody, MoveCharacterBody, RequestBody},
    report::{JoinReport, MoveReport},
};

use super::ProbeClient;

pub trait ProbeScenarios {
    fn move_character(&self) -> impl Future<Output = anyhow::Result<MoveReport>> + Send;
    fn join_character(&self) -> impl Future<Output = anyhow::Result<JoinReport>> + Send;

    /// Runs moveCharacter and prints the outcome. Never fails.
    fn run_move_character(&self) -> impl Future<Output = ()> + Send;

    /// Runs joinCharacter and prints the outcome. Never fails.
    fn run_join_character(&self) -> impl Future<Output = ()> + Send;
}

impl ProbeScenarios for ProbeClient {
    async fn move_character(&self) -> anyhow::Result<MoveReport> {
        trace!("Probing moveCharacter on {}", self.config.address);
        let exchange = self
            .exchange(RequestBody::Move(MoveCharacterBody::sample()))
            .await?;
        Ok(MoveReport(exchange))
    }

    async fn join_character(&self) -> anyhow::Result<JoinReport> {
        trace!("Probing joinCharacter on {}", self.config.address);
        let exchange = self
            .exchange(RequestBody::Join(JoinCharacterBody::sample()))
            .await?;
        Ok(JoinReport(exchange))
    }

    async fn run_move_character(&self) {
        match self.move_character().await {
            Ok(report) => println!("\n{}", report),
            Err(err) => print_failure("moveCharacter", &err),
        }
    }

    async fn run_join_character(&self) {
        match self.join_character().await {
            Ok(report) => println!("\n{}", report),
            Err(err) => print_failure("joinCharacter", &err),
        }
    }
}

/// The single line a failed scenario leaves on stdout.
pub fn failure_line(err: &anyhow::Error) -> String {
    format!("Error: {:#}", err)
}

fn print_failure(scenario: &str, err: &anyhow::Error) {
    error!("{} probe failed: {:#}", scenario, err);
    println!("{}", failure_line(err));
}
