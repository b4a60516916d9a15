use std::net::{SocketAddr, TcpListener};
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use rmtes_core::message::{RefreshMsg, StatusMsg, UpdateMsg};
use rmtes_core::payload::FID_DSPLY_NMLL;
use rmtes_core::{
    ConsumerClient, FieldData, Handle, OmmConsumer, ReqMsg, TcpTransport, decode_rmtes,
};

#[test]
fn help_lists_flags() {
    Command::cargo_bin("rmtes-provider")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--languages-file"))
        .stdout(predicate::str::contains("--enforce-view"));
}

#[test]
fn missing_languages_file_fails() {
    Command::cargo_bin("rmtes-provider")
        .unwrap()
        .args(["--languages-file", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("languages file not found"));
}

#[test]
fn empty_languages_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("langs.txt");
    std::fs::write(&path, "# nothing here\n").unwrap();

    Command::cargo_bin("rmtes-provider")
        .unwrap()
        .arg("--languages-file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("languages table is empty"));
}

#[test]
fn busy_port_fails_to_bind() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    Command::cargo_bin("rmtes-provider")
        .unwrap()
        .args(["--bind", &addr.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bind TCP listener"));
}

struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_addr() -> SocketAddr {
    let l = TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap()
}

fn connect_with_retry(addr: SocketAddr) -> TcpTransport {
    let started = Instant::now();
    loop {
        match TcpTransport::connect(addr, Duration::from_millis(200)) {
            Ok(t) => return t,
            Err(e) if started.elapsed() > Duration::from_secs(10) => {
                panic!("provider did not come up: {e}")
            }
            Err(_) => thread::sleep(Duration::from_millis(50)),
        }
    }
}

struct Collect(crossbeam_channel::Sender<String>);

impl ConsumerClient for Collect {
    fn on_refresh(&mut self, _h: Handle, m: &RefreshMsg) {
        if let Some(FieldData::Rmtes(b)) = m.payload.get(FID_DSPLY_NMLL) {
            self.0.send(format!("refresh {}", decode_rmtes(b).unwrap())).unwrap();
        }
    }
    fn on_update(&mut self, _h: Handle, m: &UpdateMsg) {
        self.0.send(format!("update {}", m.payload.len())).unwrap();
    }
    fn on_status(&mut self, _h: Handle, _m: &StatusMsg) {
        self.0.send("status".to_string()).unwrap();
    }
}

#[test]
fn serves_refresh_and_updates_to_a_consumer() {
    let dir = tempfile::tempdir().unwrap();
    let langs = dir.path().join("langs.txt");
    std::fs::write(&langs, "Japanese | ロンドン証券取引所\n").unwrap();

    let addr = free_addr();
    let _child = KillOnDrop(
        StdCommand::new(cargo_bin("rmtes-provider"))
            .args([
                "--bind",
                &addr.to_string(),
                "--updates",
                "2",
                "--interval-ms",
                "0",
                "--dispatch-timeout-ms",
                "50",
            ])
            .arg("--languages-file")
            .arg(&langs)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap(),
    );

    let transport = connect_with_retry(addr);
    let mut consumer = OmmConsumer::connect(transport, "user", Duration::from_secs(5)).unwrap();
    let (tx, rx) = crossbeam_channel::unbounded();
    consumer
        .register_client(
            ReqMsg::market_price("/LSEG.L", "DIRECT_FEED"),
            Box::new(Collect(tx)),
        )
        .unwrap();

    let mut got = Vec::new();
    // после двух Update провайдер закрывает соединение
    while consumer.dispatch(Duration::from_millis(100)).is_ok() {
        got.extend(rx.try_iter());
    }
    got.extend(rx.try_iter());

    assert_eq!(got, vec!["refresh ロンドン証券取引所", "update 6", "update 6"]);
}
