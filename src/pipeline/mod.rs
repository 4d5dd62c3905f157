use std::{pin::Pin, time::SystemTime};

use futures::Stream;

/// One generated record on its way to the output stream.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub generated_at: SystemTime,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("sink error: {0}")]
    Sink(String),
}

/// Producer side of an emitter pipeline. Synthetic sources yield an
/// unbounded stream; `stream()` returning does not mean the data ends.
#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, K> {
    pub source: S,
    pub sink: K,
}

impl<S, K> Pipeline<S, K> {
    /// Drives the sink with the source's stream. For the simulated
    /// agents the stream is infinite, so this returns only on error.
    pub async fn run<T>(self) -> Result<(), PipelineError>
    where
        T: Send + 'static,
        S: Source<T> + Send + Sync + 'static,
        K: Sink<T> + Send + Sync + 'static,
    {
        let stream = self.source.stream().await;
        self.sink.run(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedSource {
        payloads: Vec<u32>,
    }

    #[async_trait::async_trait]
    impl Source<u32> for ScriptedSource {
        async fn stream(
            &self,
        ) -> Pin<Box<dyn Stream<Item = Result<Envelope<u32>, PipelineError>> + Send>> {
            let items: Vec<_> = self
                .payloads
                .iter()
                .map(|p| {
                    Ok(Envelope {
                        payload: *p,
                        generated_at: SystemTime::now(),
                    })
                })
                .collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct CountingSink {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Sink<u32> for CountingSink {
        async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<u32>, PipelineError>> + Send + Unpin + 'static,
        {
            while let Some(item) = input.next().await {
                item?;
                self.seen.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn pipeline_feeds_every_record_to_the_sink() {
        let seen = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline {
            source: ScriptedSource {
                payloads: vec![1, 2, 3],
            },
            sink: CountingSink { seen: seen.clone() },
        };

        pipeline.run().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn pipeline_surfaces_sink_errors() {
        struct FailingSink;

        #[async_trait::async_trait]
        impl Sink<u32> for FailingSink {
            async fn run<S>(&self, _input: S) -> Result<(), PipelineError>
            where
                S: Stream<Item = Result<Envelope<u32>, PipelineError>> + Send + Unpin + 'static,
            {
                Err(PipelineError::Sink("write failed".to_string()))
            }
        }

        let pipeline = Pipeline {
            source: ScriptedSource { payloads: vec![1] },
            sink: FailingSink,
        };

        let res = pipeline.run().await;
        assert!(matches!(res, Err(PipelineError::Sink(_))));
    }
}
