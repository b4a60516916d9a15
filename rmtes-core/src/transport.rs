//! Транспорт под протоколом: отправка конверта и ожидание входящего с таймаутом.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::TransportError;
use crate::message::Envelope;

/// Примитивы, на которых стоят провайдер и потребитель
pub trait Transport {
    /// Отправить сообщение в поток `env.handle`
    fn submit(&mut self, env: &Envelope) -> Result<(), TransportError>;

    /// Ждать входящее не дольше `timeout`. `Ok(None)` - таймаут.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Envelope>, TransportError>;

    /// Забрать уже пришедшее, не блокируясь
    fn try_recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        self.recv_timeout(Duration::ZERO)
    }
}

/// In-process транспорт на паре каналов
pub struct ChannelTransport {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl ChannelTransport {
    /// Два соединённых конца: (провайдер, потребитель)
    pub fn pair() -> (ChannelTransport, ChannelTransport) {
        let (a_tx, a_rx) = crossbeam_channel::unbounded();
        let (b_tx, b_rx) = crossbeam_channel::unbounded();
        (
            ChannelTransport { tx: a_tx, rx: b_rx },
            ChannelTransport { tx: b_tx, rx: a_rx },
        )
    }
}

impl Transport for ChannelTransport {
    fn submit(&mut self, env: &Envelope) -> Result<(), TransportError> {
        self.tx
            .send(env.clone())
            .map_err(|_| TransportError::Disconnected)
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Envelope>, TransportError> {
        match self.rx.recv_timeout(timeout) {
            Ok(env) => Ok(Some(env)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    fn try_recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        match self.rx.try_recv() {
            Ok(env) => Ok(Some(env)),
            Err(crossbeam_channel::TryRecvError::Empty) => Ok(None),
            Err(crossbeam_channel::TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CloseMsg, DomainType, Handle, Msg};

    fn close_env() -> Envelope {
        Envelope::new(
            Handle::LOGIN,
            Msg::Close(CloseMsg {
                domain: DomainType::Login,
            }),
        )
    }

    #[test]
    fn pair_delivers_both_ways() {
        let (mut p, mut c) = ChannelTransport::pair();

        c.submit(&close_env()).unwrap();
        assert_eq!(p.recv_timeout(Duration::from_millis(100)).unwrap(), Some(close_env()));

        p.submit(&close_env()).unwrap();
        assert_eq!(c.try_recv().unwrap(), Some(close_env()));
        assert_eq!(c.try_recv().unwrap(), None);
    }

    #[test]
    fn timeout_is_none_and_dropped_peer_is_disconnected() {
        let (mut p, c) = ChannelTransport::pair();
        assert_eq!(p.recv_timeout(Duration::from_millis(10)).unwrap(), None);

        drop(c);
        assert!(matches!(
            p.recv_timeout(Duration::from_millis(10)),
            Err(TransportError::Disconnected)
        ));
        assert!(matches!(p.submit(&close_env()), Err(TransportError::Disconnected)));
    }
}
