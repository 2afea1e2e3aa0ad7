//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cookbook_core` linkage and a full store round trip without the
//!   mobile shell.
//! - Keep output deterministic for quick local sanity checks.

use cookbook_core::{DatabaseManager, NewRecipe, StoreConfig};
use futures_util::StreamExt;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    println!("cookbook_core ping={}", cookbook_core::ping());
    println!("cookbook_core version={}", cookbook_core::core_version());

    match store_round_trip().await {
        Ok(rows) => {
            println!("cookbook_core store=ok rows={rows}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cookbook_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn store_round_trip() -> Result<usize, Box<dyn std::error::Error>> {
    let manager = DatabaseManager::new();
    let dao = manager.get_instance(&StoreConfig::in_memory())?.recipe_dao();
    dao.insert(NewRecipe::new("Smoke", "Water, Salt", None)).await?;

    let mut all = dao.get_all();
    let rows = match all.next().await {
        Some(snapshot) => snapshot?.len(),
        None => 0,
    };
    all.cancel();
    Ok(rows)
}
