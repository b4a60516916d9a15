use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, warn};

use crate::error::TransportError;
use crate::message::Envelope;
use crate::transport::Transport;
use crate::wire::{read_frame, write_frame};

const TCP_WRITE_TIMEOUT_S: u64 = 5;

/// Транспорт поверх одного TCP-соединения.
///
/// Чтение идёт в отдельном потоке: кадры декодируются и складываются в
/// канал, `recv_timeout` ждёт на канале. Запись - из вызывающего потока.
pub struct TcpTransport {
    stream: TcpStream,
    rx: Receiver<io::Result<Envelope>>,
    reader: Option<JoinHandle<()>>,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Подключиться к провайдеру
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self, TransportError> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        Self::from_stream(stream)
    }

    /// Обернуть уже установленное соединение (например, после accept)
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true).ok();
        stream
            .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
            .ok();

        let peer = stream.peer_addr()?;
        let read_half = stream.try_clone()?;
        let (tx, rx) = crossbeam_channel::unbounded();

        let reader = thread::spawn(move || run_reader(read_half, tx));

        Ok(Self {
            stream,
            rx,
            reader: Some(reader),
            peer,
        })
    }

    /// Адрес пира
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn run_reader(stream: TcpStream, tx: Sender<io::Result<Envelope>>) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(4096);

    loop {
        match read_frame(&mut reader, &mut buf) {
            Ok(Some(env)) => {
                if tx.send(Ok(env)).is_err() {
                    // транспорт уже дропнут
                    break;
                }
            }
            Ok(None) => {
                debug!("peer closed connection");
                break;
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

fn unwrap_frame(item: io::Result<Envelope>) -> Result<Option<Envelope>, TransportError> {
    item.map(Some).map_err(TransportError::Io)
}

impl Transport for TcpTransport {
    fn submit(&mut self, env: &Envelope) -> Result<(), TransportError> {
        write_frame(&mut self.stream, env)?;
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Envelope>, TransportError> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => unwrap_frame(item),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    fn try_recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        match self.rx.try_recv() {
            Ok(item) => unwrap_frame(item),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        // shutdown будит reader-поток, застрявший в read
        self.stream.shutdown(Shutdown::Both).ok();
        if let Some(h) = self.reader.take() {
            if let Err(panic) = h.join() {
                warn!("tcp reader thread panicked: {:?}", panic);
            }
        }
    }
}
