// src/logging.rs
//
// Step-record sinks for rosace.
// - StepSink: trait consumed by the run loop
// - NoopSink: discards all records
// - FileSink: writes one JSON line per step for offline analysis or a
//   downstream push transport

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::sim::StepRecord;

/// Abstract sink for per-step simulation records.
pub trait StepSink {
    fn log_step(&mut self, record: &StepRecord) -> io::Result<()>;

    /// Flush any buffered output. Default is a no-op.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StepSink for NoopSink {
    fn log_step(&mut self, _record: &StepRecord) -> io::Result<()> {
        // intentionally no-op
        Ok(())
    }
}

/// JSONL file sink.
///
/// Each step record is written as a single JSON object on its own
/// line, in exactly the shape a remote viewer would receive.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`, truncating any existing
    /// file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl StepSink for FileSink {
    fn log_step(&mut self, record: &StepRecord) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::Simulation;

    #[test]
    fn file_sink_writes_one_line_per_step() {
        let dir = std::env::temp_dir();
        let path = dir.join("rosace_sink_test.jsonl");

        let mut sim = Simulation::new(Config::default());
        {
            let mut sink = FileSink::create(&path).expect("create sink");
            for _ in 0..5 {
                let record = sim.step();
                sink.log_step(&record).expect("write record");
            }
            sink.flush().expect("flush");
        }

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).expect("valid json");
            assert!(parsed.get("agent_a").is_some());
            assert!(parsed.get("agent_b").is_some());
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn noop_sink_accepts_records() {
        let mut sim = Simulation::new(Config::default());
        let mut sink = NoopSink;
        let record = sim.step();
        sink.log_step(&record).expect("noop never fails");
    }
}
