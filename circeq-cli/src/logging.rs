//! Logging setup, styled like DIMACS comment lines so CLI output stays greppable.
use std::env;
use std::io::Write;

use env_logger::{fmt, Builder, Target};
use log::{info, Level, LevelFilter, Record};

pub fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(env_var) = env::var("CIRCEQ_LOG") {
        builder.parse_filters(&env_var);
    }

    builder.init();
}

pub fn banner() {
    info!("This is circeq {}", env!("CARGO_PKG_VERSION"));
}
