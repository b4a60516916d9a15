use crate::config::{ACCEPT_POLL, ConnId};
use crate::generator::UpdateGenerator;
use anyhow::Context;
use log::{info, warn};
use rmtes_core::dispatcher::ProviderState;
use rmtes_core::languages::Language;
use rmtes_core::registry::ItemRegistry;
use rmtes_core::scheduler::{Ticker, run_periodic};
use rmtes_core::session::{Session, SessionState};
use rmtes_core::{
    CoreError, OmmProvider, ProtocolError, TcpTransport, Transport, TransportError, ViewPolicy,
};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::thread;
use std::time::Duration;

/// Параметры ленты для одного соединения
#[derive(Debug, Clone)]
pub(crate) struct FeedConfig {
    pub(crate) view_policy: ViewPolicy,
    pub(crate) updates: u64,
    pub(crate) interval: Duration,
    pub(crate) dispatch_timeout: Duration,
}

/// Чем закончилась лента
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeedOutcome {
    /// Отправлены все Update
    Completed(u64),
    /// Потребитель отключился (до подписки или посреди ленты)
    Disconnected,
    /// Потребитель закрыл логин-поток
    LoggedOut,
    /// Остановлено по shutdown
    Shutdown,
}

pub(crate) fn bind_listener(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener =
        TcpListener::bind(addr).with_context(|| format!("bind TCP listener {}", addr))?;
    listener
        .set_nonblocking(true)
        .context("listener.set_nonblocking(true)")?;
    Ok(listener)
}

// accept loop: каждое соединение - свой поток и свой провайдер
pub(crate) fn run_listener(
    listener: TcpListener,
    languages: Arc<Vec<Language>>,
    cfg: FeedConfig,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut conn_handles: Vec<thread::JoinHandle<()>> = Vec::new();
    let mut next_id: ConnId = 1;

    loop {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut conn_handles)
            .into_iter()
            .partition(|h| h.is_finished());
        conn_handles = running;
        done.into_iter().for_each(join_conn);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                stream
                    .set_nonblocking(false)
                    .context("stream.set_nonblocking(false)")?;

                let cid = next_id;
                next_id += 1;
                info!("conn {cid}: accepted {addr}");

                let languages = languages.clone();
                let cfg = cfg.clone();
                let shutdown = shutdown.clone();

                let h = thread::spawn(move || {
                    match serve_connection(cid, stream, &languages, &cfg, shutdown) {
                        Ok(outcome) => info!("conn {cid}: finished ({outcome:?})"),
                        Err(e) => warn!("conn {cid}: ended with error: {e:#}"),
                    }
                });
                conn_handles.push(h);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }

    conn_handles.into_iter().for_each(join_conn);

    Ok(())
}

fn join_conn(h: thread::JoinHandle<()>) {
    if let Err(panic) = h.join() {
        warn!("connection thread panicked: {:?}", panic);
    }
}

fn serve_connection(
    cid: ConnId,
    stream: TcpStream,
    languages: &[Language],
    cfg: &FeedConfig,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<FeedOutcome> {
    let transport = TcpTransport::from_stream(stream).context("wrap accepted stream")?;
    let mut generator =
        UpdateGenerator::new(languages.to_vec()).context("languages table is empty")?;

    let registry = ItemRegistry::new(cfg.view_policy)
        .with_refresh_language(generator.refresh_language().clone());
    let state = ProviderState {
        session: Session::new(),
        registry,
    };
    let mut provider = OmmProvider::with_state(transport, state);

    run_feed(cid, &mut provider, &mut generator, cfg, &shutdown)
}

/// Цикл одного соединения: dispatch, пока не появится подписка, затем
/// `cfg.updates` раз "dispatch + Update" с паузой `cfg.interval`.
pub(crate) fn run_feed<T: Transport>(
    cid: ConnId,
    provider: &mut OmmProvider<T>,
    generator: &mut UpdateGenerator,
    cfg: &FeedConfig,
    shutdown: &Arc<AtomicBool>,
) -> anyhow::Result<FeedOutcome> {
    let handle = loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(FeedOutcome::Shutdown);
        }
        match provider.dispatch(cfg.dispatch_timeout) {
            Ok(_) => {}
            Err(TransportError::Disconnected) => return Ok(FeedOutcome::Disconnected),
            Err(e) => return Err(e).context("dispatch while waiting for item"),
        }
        if provider.session_state() == SessionState::Closed {
            return Ok(FeedOutcome::LoggedOut);
        }
        if let Some(h) = provider.item_handle() {
            break h;
        }
    };

    info!("conn {cid}: streaming {} updates on {handle}", cfg.updates);

    let mut ticker = Ticker::new(cfg.interval)
        .with_limit(cfg.updates)
        .with_shutdown(shutdown.clone());

    let res = run_periodic(&mut ticker, |tick| -> Result<(), CoreError> {
        provider.dispatch(cfg.dispatch_timeout)?;
        provider.emit_update(handle, generator.next_update(tick))
    });

    match res {
        Ok(n) if n < cfg.updates => Ok(FeedOutcome::Shutdown),
        Ok(n) => Ok(FeedOutcome::Completed(n)),
        Err(CoreError::Transport(TransportError::Disconnected)) => Ok(FeedOutcome::Disconnected),
        Err(CoreError::Protocol(ProtocolError::SessionClosed)) => Ok(FeedOutcome::LoggedOut),
        Err(e) => Err(e).context("update loop"),
    }
}
