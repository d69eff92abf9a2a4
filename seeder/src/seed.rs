use colored::*;
use futures::FutureExt;
use std::future::Future;
use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

/// Runs one seeding stage behind a `Seeding <name>....... done (1.2s)` line.
///
/// A panicking stage prints `failed` and yields `None` so the remaining
/// stages still run.
pub async fn run_stage<F, T>(name: &str, stage: F) -> Option<T>
where
    F: Future<Output = T>,
{
    let base_msg = format!("Seeding {}", name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(base_msg.len()));
    println!("{}{} ", base_msg, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    match AssertUnwindSafe(stage).catch_unwind().await {
        Ok(out) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {} {}", name.bold(), "done".green(), time_str);
            Some(out)
        }
        Err(_) => {
            println!("{} {}", name.bold(), "failed".red());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_stage_output() {
        let out = run_stage("Numbers", async { 40 + 2 }).await;
        assert_eq!(out, Some(42));
    }

    #[tokio::test]
    async fn panicking_stage_yields_none() {
        let explode = true;
        let out = run_stage("Broken", async move {
            if explode {
                panic!("boom");
            }
            0u8
        })
        .await;
        assert!(out.is_none());
    }
}
