//! Периодический планировщик: источник тиков отдельно от обработчика,
//! чтобы цикл провайдера тестировался без реального ожидания.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Шаг, которым режется сон, чтобы быстро увидеть shutdown
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Источник тиков
pub trait TickSource {
    /// Дождаться следующего тика. `None` - тиков больше не будет.
    fn next_tick(&mut self) -> Option<u64>;
}

/// Тики с фиксированным интервалом, опционально ограниченные по числу.
pub struct Ticker {
    interval: Duration,
    limit: Option<u64>,
    shutdown: Arc<AtomicBool>,
    next: u64,
}

impl Ticker {
    /// Первый тик сразу, следующие через `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            limit: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            next: 0,
        }
    }

    /// Не больше `n` тиков
    pub fn with_limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Остановиться, когда флаг станет `true`
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    fn stopped(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn sleep_interval(&self) {
        let mut slept = Duration::ZERO;
        while slept < self.interval && !self.stopped() {
            let step = (self.interval - slept).min(SLEEP_SLICE);
            thread::sleep(step);
            slept += step;
        }
    }
}

impl TickSource for Ticker {
    fn next_tick(&mut self) -> Option<u64> {
        if self.limit.is_some_and(|n| self.next >= n) || self.stopped() {
            return None;
        }
        if self.next > 0 {
            self.sleep_interval();
            if self.stopped() {
                return None;
            }
        }

        let tick = self.next;
        self.next += 1;
        Some(tick)
    }
}

/// Гоняет `handler` на каждом тике, пока источник не иссякнет или handler не вернёт ошибку.
///
/// Возвращает число обработанных тиков.
pub fn run_periodic<S, F, E>(source: &mut S, mut handler: F) -> Result<u64, E>
where
    S: TickSource + ?Sized,
    F: FnMut(u64) -> Result<(), E>,
{
    let mut count = 0;
    while let Some(tick) = source.next_tick() {
        handler(tick)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn limited_ticker_counts_from_zero() {
        let mut t = Ticker::new(Duration::ZERO).with_limit(3);
        let mut seen = Vec::new();

        let n = run_periodic(&mut t, |tick| {
            seen.push(tick);
            Ok::<_, ()>(())
        })
        .unwrap();

        assert_eq!(n, 3);
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(t.next_tick(), None);
    }

    #[test]
    fn handler_error_stops_the_loop() {
        let mut t = Ticker::new(Duration::ZERO).with_limit(10);
        let res = run_periodic(&mut t, |tick| if tick == 2 { Err("boom") } else { Ok(()) });
        assert_eq!(res, Err("boom"));
    }

    #[test]
    fn shutdown_flag_interrupts_sleep() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut t = Ticker::new(Duration::from_secs(30)).with_shutdown(shutdown.clone());

        assert_eq!(t.next_tick(), Some(0));

        let flag = shutdown.clone();
        let h = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            flag.store(true, Ordering::Relaxed);
        });

        let started = Instant::now();
        assert_eq!(t.next_tick(), None);
        assert!(started.elapsed() < Duration::from_secs(5));
        h.join().unwrap();
    }
}
