use std::time::Duration;

use pausable_delay::Delay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let delay = Delay::new();
    let done = delay.start("2s", || tracing::info!("Delay elapsed"))?;

    tokio::time::sleep(Duration::from_millis(500)).await;
    delay.pause();
    tracing::info!("Paused with {:?} remaining", delay.remaining());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let resumed = delay.resume();
    tracing::info!("Resumed with {:?} remaining", delay.remaining());

    resumed.await?;
    done.await?;
    Ok(())
}
