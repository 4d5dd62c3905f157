use std::{io, marker::PhantomData, time::SystemTime};

use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::ser::Formatter;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Emits each record as one JSON line on stdout.
///
/// Every line is flushed as soon as it is written: the agents feed
/// line-oriented pipe readers that must see a reading the moment it
/// exists. There is no batching and no retry; a failed write (typically
/// a broken pipe when the reader goes away) ends the run and an
/// external supervisor restarts the process.
pub struct NdjsonStdoutSink<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> NdjsonStdoutSink<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NdjsonStdoutSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// `serde_json`'s compact form writes `","` and `":"`. The gateway-side
/// consumers of these lines parse and archive them with a space after
/// each structural comma and colon, so the emitted bytes keep it.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

/// One record as its emitted line: spaced-separator JSON, newline
/// terminated.
pub fn encode_line<T: Serialize>(payload: &T) -> Result<Vec<u8>, PipelineError> {
    let mut line = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut line, SpacedFormatter);
    payload
        .serialize(&mut ser)
        .map_err(|e| PipelineError::Sink(format!("failed to encode record: {e}")))?;
    line.push(b'\n');
    Ok(line)
}

fn write_error(e: std::io::Error) -> PipelineError {
    tracing::error!(error = %e, "stdout write failed, giving up");
    metrics::counter!("stdout_sink_errors_total").increment(1);
    PipelineError::Sink(format!("stdout write failed: {e}"))
}

impl<T> NdjsonStdoutSink<T>
where
    T: Serialize,
{
    async fn write_lines<W, S>(&self, writer: &mut W, mut input: S) -> Result<(), PipelineError>
    where
        W: AsyncWrite + Unpin + Send,
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin,
    {
        while let Some(item) = input.next().await {
            let env = item?;
            let line = encode_line(&env.payload)?;

            writer.write_all(&line).await.map_err(write_error)?;
            writer.flush().await.map_err(write_error)?;

            metrics::counter!("stdout_lines_written_total").increment(1);
            if let Ok(dur) = SystemTime::now().duration_since(env.generated_at) {
                metrics::histogram!("emit_end_to_end_latency_seconds").record(dur.as_secs_f64());
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl<T> Sink<T> for NdjsonStdoutSink<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut out = tokio::io::stdout();
        self.write_lines(&mut out, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceStatus, MeterReading};
    use time::macros::datetime;
    use uuid::Uuid;

    fn reading(energy: u32) -> Envelope<MeterReading> {
        Envelope {
            payload: MeterReading {
                timestamp: "2024-06-01 08:30:15.123456".to_string(),
                start: "2024-06-01 08:30:15.123456".to_string(),
                end: "2024-06-01 08:30:15.123456".to_string(),
                energy,
                energy_cumul: 150,
                power_max: 30,
                power_min: 20,
            },
            generated_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn writes_one_json_line_per_record() {
        let sink = NdjsonStdoutSink::new();
        let input = futures::stream::iter(vec![Ok(reading(23)), Ok(reading(26))]);
        let mut buf: Vec<u8> = Vec::new();

        sink.write_lines(&mut buf, input).await.unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["energyCumul"], 150);
            assert_eq!(parsed["powerMax"], 30);
            assert_eq!(parsed["powerMin"], 20);
        }
    }

    #[tokio::test]
    async fn meter_line_matches_the_documented_shape() {
        let sink = NdjsonStdoutSink::new();
        let input = futures::stream::iter(vec![Ok(reading(24))]);
        let mut buf: Vec<u8> = Vec::new();

        sink.write_lines(&mut buf, input).await.unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            concat!(
                "{\"timestamp\": \"2024-06-01 08:30:15.123456\",",
                " \"start\": \"2024-06-01 08:30:15.123456\",",
                " \"end\": \"2024-06-01 08:30:15.123456\",",
                " \"energy\": 24, \"energyCumul\": 150,",
                " \"powerMax\": 30, \"powerMin\": 20}\n",
            )
        );
    }

    #[tokio::test]
    async fn status_line_matches_the_documented_shape() {
        let id = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
        let env = Envelope {
            payload: DeviceStatus::heartbeat(id, datetime!(2021-01-01 00:00:00 UTC)),
            generated_at: SystemTime::now(),
        };

        let sink = NdjsonStdoutSink::new();
        let mut buf: Vec<u8> = Vec::new();
        sink.write_lines(&mut buf, futures::stream::iter(vec![Ok(env)]))
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            concat!(
                "{\"timestamp\": \"1609459200\",",
                " \"id\": \"3fa85f64-5717-4562-b3fc-2c963f66afa6\",",
                " \"type\": \"ZWave smart plug\", \"status\": \"active\"}\n",
            )
        );
    }

    #[test]
    fn separators_space_structure_not_values() {
        #[derive(Serialize)]
        struct Sample {
            note: &'static str,
            tags: Vec<&'static str>,
        }

        let line = encode_line(&Sample {
            note: "a,b:c",
            tags: vec!["x", "y"],
        })
        .unwrap();

        // Only structural separators gain the space; punctuation inside
        // values stays untouched.
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "{\"note\": \"a,b:c\", \"tags\": [\"x\", \"y\"]}\n"
        );
    }

    #[tokio::test]
    async fn upstream_errors_stop_the_run() {
        let sink = NdjsonStdoutSink::new();
        let input = futures::stream::iter(vec![
            Ok(reading(24)),
            Err(PipelineError::Source("clock went away".to_string())),
        ]);
        let mut buf: Vec<u8> = Vec::new();

        let res = sink.write_lines(&mut buf, input).await;
        assert!(matches!(res, Err(PipelineError::Source(_))));

        // The record before the failure still made it out.
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
