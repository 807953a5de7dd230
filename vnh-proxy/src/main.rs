mod subscriber;

use crate::subscriber::StderrSubscriber;
use crossbeam::channel;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use vnh_proxy::codec::{decode_packet_in, encode_packet_out};
use vnh_proxy::config::ProxyConfig;
use vnh_proxy::dispatcher::EventDispatcher;
use vnh_proxy::error::ConfigError;
use vnh_proxy::injector::{ChannelInjector, PacketOut};
use vnh_proxy::utils::runner::run_dispatcher;
use vnh_proxy::PacketIn;

fn main() {
    let config = match ProxyConfig::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Cli(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(2);
        }
    };

    let subscriber = StderrSubscriber::new(config.log_level);
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    info!(
        vnh_file = %config.vnh_file.display(),
        mode = ?config.mapper_mode,
        workers = config.workers,
        "Starting ARP proxy"
    );

    let (event_sender, event_receiver) = channel::unbounded::<PacketIn>();
    let (out_sender, out_receiver) = channel::unbounded::<PacketOut>();

    // Packet-in lines from the controller shim
    let reader = thread::spawn(move || {
        let stdin = io::stdin();
        for (index, line) in stdin.lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("stdin closed: {}", err);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match decode_packet_in(&line) {
                Ok(event) => {
                    if event_sender.send(event).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("skipping input line {}: {}", index + 1, err),
            }
        }
    });

    // Packet-out lines back to the shim
    let writer = thread::spawn(move || {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        for packet_out in out_receiver.iter() {
            let line = match encode_packet_out(&packet_out) {
                Ok(line) => line,
                Err(err) => {
                    warn!("dropping packet-out: {}", err);
                    continue;
                }
            };
            if let Err(err) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
                error!("stdout closed: {}", err);
                break;
            }
        }
    });

    let dispatcher = Arc::new(EventDispatcher::new(
        config.build_mapper(),
        ChannelInjector::new(out_sender),
    ));

    let stats = match run_dispatcher(dispatcher, event_receiver, config.workers) {
        Ok(stats) => stats,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    // The dispatcher only returns once stdin is exhausted and every reply has been queued
    if reader.join().is_err() || writer.join().is_err() {
        error!("stdio thread panicked");
        process::exit(1);
    }

    info!(
        events = stats.events,
        replies = stats.replies,
        "Input exhausted, ARP proxy stopped"
    );
}
