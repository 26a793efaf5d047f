//! Process-wide debug sink.
//!
//! A boolean-gated forwarder: with `-v` every `log::debug!` record from the
//! front-end goes to standard output, otherwise the sink is switched off at
//! the level filter and calls cost a single comparison.

use log::{LevelFilter, Log, Metadata, Record};

struct StdoutSink;

impl Log for StdoutSink {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        println!("[DEBUG] {}", record.args());
    }

    fn flush(&self) {}
}

static SINK: StdoutSink = StdoutSink;

pub fn init(verbose: bool) {
    // Ignore a second init; the level filter is what actually gates output.
    let _ = log::set_logger(&SINK);
    log::set_max_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    });
}
