use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::{NewsError, NewsService};
use crate::repository::UserRepository;

/// Handle to the background refresh task
pub struct RefresherHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl RefresherHandle {
    pub async fn stop(self) -> Result<(), NewsError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(NewsError::from)
    }
}

/// Refresh every user's cache entry once.
///
/// Failures are logged per user and do not stop the sweep. Returns the number
/// of users refreshed successfully.
pub async fn refresh_all(users: &UserRepository, news: &NewsService) -> usize {
    let mut refreshed = 0;
    for user in users.all().await {
        match news.refresh_user(user.id, &user.preferences).await {
            Ok(count) => {
                refreshed += 1;
                tracing::debug!(user_id = user.id, count, "periodic news update");
            }
            Err(err) => {
                warn!(username = %user.username, error = %err, "periodic news update failed");
            }
        }
    }
    refreshed
}

/// Spawn the periodic sweep; the first run happens one `period` after start
pub fn spawn_refresher(
    users: Arc<UserRepository>,
    news: Arc<NewsService>,
    period: Duration,
) -> RefresherHandle {
    let period = period.max(Duration::from_millis(1));
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
    let join = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    info!("news refresher shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let refreshed = refresh_all(&users, &news).await;
                    info!(refreshed, "periodic news update complete");
                }
            }
        }
    });

    RefresherHandle { cancel_tx, join }
}
