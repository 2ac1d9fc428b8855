use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use clap::Parser;
use log::{debug, error, info, warn};
use webmusic::adapters::ExampleAdapter;
use webmusic::bridge::{Bridge, ChannelTransport, HostCommand, HostEvent};
use webmusic::config::BridgeConfig;
use webmusic::data::ObjectType;
use webmusic::logging;

/// Run the bridge against the simulated example site
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON configuration file
    #[clap(long)]
    config: Option<String>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    /// Override the poll interval in milliseconds
    #[clap(long)]
    interval_ms: Option<u64>,
}

fn print_event(event: &HostEvent) {
    match event {
        HostEvent::PropertiesChanged { object_type, changes } => {
            println!("[{}] properties changed:", object_type);
            for (name, value) in changes.iter() {
                println!("    {} = {}", name, value);
            }
        }
        HostEvent::Seeked { position } => println!("[player] seeked to {} us", position),
        HostEvent::PlaylistChanged(playlist) => println!("[playlist] {} changed", playlist.name),
        HostEvent::TrackListReplaced { tracks, current } => {
            println!("[tracklist] replaced with {} tracks, current {:?}", tracks.len(), current)
        }
        HostEvent::Warning { object_type, text } => println!("[{}] warning: {}", object_type, text),
        HostEvent::Debug { object_type, text } => debug!("[{}] {}", object_type, text),
        HostEvent::Call(envelope) | HostEvent::Signal(envelope) => println!("{}", envelope),
    }
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match BridgeConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => BridgeConfig::default(),
    };
    if let Some(interval) = args.interval_ms {
        config.poll_interval_ms = interval;
    }

    if let Err(e) = logging::initialize_logging(config.logging.as_ref(), args.debug) {
        eprintln!("{}", e);
    }

    info!("WebMusic bridge demo starting");

    let (transport, outbound) = ChannelTransport::new();
    let bridge = Arc::new(Bridge::new(Arc::new(transport), config));

    let adapter = match ExampleAdapter::install(&bridge) {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Could not install example site: {}", e);
            std::process::exit(1);
        }
    };

    // Host side: print everything the bridge sends
    let printer = thread::spawn(move || {
        for message in outbound.iter() {
            match HostEvent::decode(&message) {
                Ok(event) => print_event(&event),
                Err(e) => warn!("Undecodable message {}: {}", message, e),
            }
        }
    });

    if let Err(e) = bridge.start_adapter(Box::new(adapter)) {
        error!("Could not start poll task: {}", e);
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    println!("Bridge running. Press Ctrl+C to exit.");

    // Host side: query a few properties the way a desktop shell would
    let commands = HostCommand::new();
    for (object_type, name) in [
        (ObjectType::Api, "version"),
        (ObjectType::Api, "objects"),
        (ObjectType::Playlist, "count"),
    ] {
        if let Ok(message) = commands.get_property(object_type, name) {
            println!("{}.{} = {}", object_type, name, bridge.receive(&message));
        }
    }

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    bridge.shutdown();
    drop(bridge);
    if printer.join().is_err() {
        warn!("Printer thread ended abnormally");
    }
    info!("Exiting application");
}
