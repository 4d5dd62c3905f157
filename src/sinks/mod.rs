pub mod stdout;

pub use stdout::NdjsonStdoutSink;
