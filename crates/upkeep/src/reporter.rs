use std::io::{self, Write as _};

use async_trait::async_trait;
use log::info;

use upkeep_core::UpdateReporter;

/// Blocking-console confirmation: prompts on stdout, reads one line from
/// stdin. The read runs on the blocking pool so the runtime stays usable.
pub struct ConsoleReporter;

#[async_trait]
impl UpdateReporter for ConsoleReporter {
    async fn confirm(&self, candidate: &str) -> bool {
        let prompt = format!("Update to version {candidate}? [y/N]: ");
        tokio::task::spawn_blocking(move || {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(prompt.as_bytes());
            let _ = stdout.flush();

            let mut answer = String::new();
            if io::stdin().read_line(&mut answer).is_err() {
                return false;
            }
            answer.trim().eq_ignore_ascii_case("y")
        })
        .await
        .unwrap_or(false)
    }

    fn report(&self, message: &str) {
        println!("{message}");
    }
}

/// Unattended mode: every update is confirmed.
pub struct AssumeYes;

#[async_trait]
impl UpdateReporter for AssumeYes {
    async fn confirm(&self, candidate: &str) -> bool {
        info!("Auto-confirming update to {candidate}");
        true
    }

    fn report(&self, message: &str) {
        println!("{message}");
    }
}
