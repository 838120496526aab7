//! Time infrastructure: implements `Sleeper` on the tokio timer.

use std::time::Duration;

use crate::application::ports::Sleeper;

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
