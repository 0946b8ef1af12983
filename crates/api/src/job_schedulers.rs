use crate::event::send_event_reminders::SendEventRemindersUseCase;
use crate::shared::usecase::execute;
use actix_web::rt::time::{interval, sleep_until, Instant};
use callward_infra::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Drives the reminder core on a fixed wall-clock cadence, aligned to the
/// minute. Overlapping runs are a designed decision, not an accident: a
/// tick that fires while the previous run is still going is skipped, so at
/// most one polling pass is in flight at any time.
pub fn start_send_reminders_job(ctx: Context) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(ctx.config.reminder_interval_secs));
        let busy = Arc::new(AtomicBool::new(false));
        loop {
            minutely_interval.tick().await;
            if busy.swap(true, Ordering::SeqCst) {
                warn!("Previous reminder run still in progress, skipping this tick");
                continue;
            }
            let context = ctx.clone();
            let run_guard = busy.clone();
            actix_web::rt::spawn(async move {
                send_reminders(context).await;
                run_guard.store(false, Ordering::SeqCst);
            });
        }
    });
}

/// One full polling pass: run the reminder core and hand the complete
/// result list to the broadcaster as a single snapshot, so observers see a
/// consistent per-tick view instead of a per-event stream.
async fn send_reminders(context: Context) {
    match execute(SendEventRemindersUseCase, &context).await {
        Ok(results) => context.broadcaster.publish(results),
        Err(e) => error!("Reminder job run failed: {:?}", e),
    }
}
