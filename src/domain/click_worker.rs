//! Background worker that persists queued click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::ip_hash::hash_ip;
use crate::utils::user_agent::parse_user_agent;

/// Extra attempts for a failed click log insert.
const INSERT_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Up to `concurrency` events are processed at once. When the channel closes
/// (graceful shutdown) the loop stops receiving and waits for in-flight events
/// before returning, so nothing already dequeued is lost.
pub async fn run_click_worker<C, L>(
    mut rx: mpsc::Receiver<ClickEvent>,
    clicks: Arc<C>,
    links: Arc<L>,
    concurrency: usize,
) where
    C: ClickRepository + 'static,
    L: LinkRepository + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let clicks = clicks.clone();
        let links = links.clone();
        in_flight.spawn(async move {
            process_click(event, clicks.as_ref(), links.as_ref()).await;
            drop(permit);
        });

        while in_flight.try_join_next().is_some() {}
    }

    let remaining = in_flight.len();
    if remaining > 0 {
        info!("Click queue closed, draining {} in-flight clicks", remaining);
    }
    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

/// Persists one click: appends the log row, then bumps the link's counter.
///
/// The two writes are independent. A failing counter update never undoes the
/// log row, and a failed log insert does not skip the counter, so the counter
/// tracks resolutions. Failures are logged, counted and swallowed.
pub async fn process_click<C, L>(event: ClickEvent, clicks: &C, links: &L)
where
    C: ClickRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    let link_id = event.link_id;
    let new_click = to_new_click(event);

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_millis(500))
        .map(jitter)
        .take(INSERT_RETRIES);

    let inserted = RetryIf::spawn(
        strategy,
        move || clicks.record_click(new_click.clone()),
        |e: &AppError| matches!(e, AppError::Internal { .. }),
    )
    .await;

    match inserted {
        Ok(log) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            debug!(link_id, click_id = log.id, "Click recorded");
        }
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            error!(link_id, "Failed to record click: {}", e);
        }
    }

    if let Err(e) = links.increment_click_count(link_id).await {
        metrics::counter!("click_counter_failed_total").increment(1);
        warn!(link_id, "Failed to increment click counter: {}", e);
    }
}

fn to_new_click(event: ClickEvent) -> NewClick {
    let agent = parse_user_agent(event.user_agent.as_deref());
    let ip = event.ip.as_deref().unwrap_or("unknown");

    NewClick {
        link_id: event.link_id,
        ip_hash: hash_ip(ip, event.occurred_at),
        user_agent: event.user_agent.unwrap_or_default(),
        device_type: agent.device_type,
        browser: agent.browser,
        os: agent.os,
        country: None,
        referrer: event.referrer,
        clicked_at: event.occurred_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ClickLog, DeviceType};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use serde_json::json;

    fn log_for(click: &NewClick) -> ClickLog {
        ClickLog {
            id: 1,
            link_id: click.link_id,
            ip_hash: click.ip_hash.clone(),
            user_agent: click.user_agent.clone(),
            device_type: click.device_type.as_str().to_string(),
            browser: click.browser.clone(),
            os: click.os.clone(),
            country: click.country.clone(),
            referrer: click.referrer.clone(),
            clicked_at: click.clicked_at,
        }
    }

    #[test]
    fn test_to_new_click_derives_fields() {
        let event = ClickEvent::new(5, Some("203.0.113.1".to_string()), None, Some("https://t.co/x"));
        let at = event.occurred_at;

        let click = to_new_click(event);

        assert_eq!(click.link_id, 5);
        assert_eq!(click.ip_hash, hash_ip("203.0.113.1", at));
        assert_eq!(click.device_type, DeviceType::Other);
        assert_eq!(click.browser, "unknown");
        assert_eq!(click.user_agent, "");
        assert_eq!(click.referrer.as_deref(), Some("https://t.co/x"));
        assert!(click.country.is_none());
    }

    #[tokio::test]
    async fn test_process_click_records_and_increments() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();

        clicks
            .expect_record_click()
            .withf(|c| c.link_id == 9)
            .times(1)
            .returning(|c| Ok(log_for(&c)));
        links
            .expect_increment_click_count()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|_| Ok(()));

        process_click(ClickEvent::new(9, None, None, None), &clicks, &links).await;
    }

    #[tokio::test]
    async fn test_insert_retried_on_internal_error() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();

        clicks
            .expect_record_click()
            .times(1 + INSERT_RETRIES)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        links
            .expect_increment_click_count()
            .times(1)
            .returning(|_| Ok(()));

        process_click(ClickEvent::new(1, None, None, None), &clicks, &links).await;
    }

    #[tokio::test]
    async fn test_validation_error_not_retried() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();

        clicks
            .expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::bad_request("Referenced link does not exist", json!({}))));
        links
            .expect_increment_click_count()
            .times(1)
            .returning(|_| Err(AppError::not_found("gone", json!({}))));

        process_click(ClickEvent::new(1, None, None, None), &clicks, &links).await;
    }

    #[tokio::test]
    async fn test_worker_drains_after_sender_dropped() {
        let mut clicks = MockClickRepository::new();
        let mut links = MockLinkRepository::new();

        clicks
            .expect_record_click()
            .times(5)
            .returning(|c| Ok(log_for(&c)));
        links
            .expect_increment_click_count()
            .times(5)
            .returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(16);
        for id in 0..5 {
            tx.send(ClickEvent::new(id, None, None, None)).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(clicks), Arc::new(links), 2).await;
    }
}
