use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, info};

use rmtes_core::{ConsumerClient, Handle, OmmConsumer, ReqMsg, Transport, TransportError};

/// Почему остановился цикл приёма
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    Shutdown,
    Deadline,
    ProviderClosed,
}

/// Подписаться и раздавать ответы клиенту, пока не сработает одно из условий остановки.
///
/// `run_for = None` - без ограничения по времени.
pub(crate) fn run_subscription<T: Transport>(
    consumer: &mut OmmConsumer<T>,
    req: ReqMsg,
    client: Box<dyn ConsumerClient>,
    tick: Duration,
    run_for: Option<Duration>,
    shutdown: &Arc<AtomicBool>,
) -> anyhow::Result<(Handle, StopReason)> {
    let item = req.name.clone().unwrap_or_default();
    let handle = consumer
        .register_client(req, client)
        .context("send item request")?;
    info!("Sent item request for {item} on {handle}");

    let deadline = run_for.map(|d| Instant::now() + d);

    let reason = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break StopReason::Deadline;
        }

        match consumer.dispatch(tick) {
            Ok(n) => debug!("dispatched {n} messages"),
            Err(TransportError::Disconnected) => break StopReason::ProviderClosed,
            Err(e) => return Err(e).context("dispatch"),
        }
    };

    Ok((handle, reason))
}
