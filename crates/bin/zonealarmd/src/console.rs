//! Line-oriented console: one JSON request per input line, one JSON
//! response per output line.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use zonealarm_app::dispatcher::Dispatcher;
use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

/// Serve requests from `reader` until it reaches end of input.
///
/// Blank lines are ignored.
///
/// # Errors
///
/// Returns an error when reading a line or writing a response fails.
pub async fn run<R, W, B, S, C, T>(
    reader: R,
    mut writer: W,
    dispatcher: Arc<Mutex<Dispatcher<B, S, C, T>>>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    B: ByteStore,
    S: AlarmSink,
    C: ClockSource,
    T: TimeSync,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = dispatcher.lock().await.dispatch_json(line).await;
        let mut out = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    tracing::debug!("console input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use tokio::io::BufReader;
    use zonealarm_adapter_clock::{HostTimeSync, SystemClock};
    use zonealarm_app::firing_bus::InProcessFiringBus;
    use zonealarm_app::memory_store::InMemoryByteStore;
    use zonealarm_app::scheduler::Scheduler;

    use super::*;

    type TestDispatcher =
        Dispatcher<InMemoryByteStore, Arc<InProcessFiringBus>, SystemClock, HostTimeSync>;

    fn dispatcher() -> Arc<Mutex<TestDispatcher>> {
        let offset = chrono::FixedOffset::east_opt(0).unwrap();
        let scheduler = Scheduler::new(InMemoryByteStore::new(), SystemClock::new(offset, false));
        Arc::new(Mutex::new(Dispatcher::new(
            scheduler,
            HostTimeSync::new(offset),
        )))
    }

    async fn run_lines(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        run(BufReader::new(input.as_bytes()), &mut output, dispatcher())
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn should_answer_each_line_in_order() {
        let input = concat!(
            r#"{"command":"add","callback":1,"type":"day","days":["mon"],"time":"07:00","action":"ON"}"#,
            "\n",
            r#"{"command":"list"}"#,
            "\n",
        );

        let responses = run_lines(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0], json!({"status": "success", "id": 0}));
        assert_eq!(responses[1]["command"], "list");
        assert_eq!(responses[1]["alarms"][0]["time"], "07:00");
    }

    #[tokio::test]
    async fn should_skip_blank_lines() {
        let responses = run_lines("\n   \n{\"command\":\"list\"}\n\n").await;
        assert_eq!(responses.len(), 1);
    }

    #[tokio::test]
    async fn should_report_protocol_errors_inline() {
        let responses = run_lines("not json\n{\"command\":\"reboot\"}\n").await;
        assert_eq!(responses[0]["message"], "Invalid JSON");
        assert_eq!(responses[1]["message"], "Unknown command");
    }

    #[tokio::test]
    async fn should_report_unset_clock_until_set() {
        let input = concat!(
            r#"{"command":"time"}"#,
            "\n",
            r#"{"command":"set","time":"2025-06-16 08:30:00"}"#,
            "\n",
        );

        let responses = run_lines(input).await;

        assert_eq!(responses[0]["status"], "error");
        assert_eq!(responses[1]["status"], "success");
    }
}
