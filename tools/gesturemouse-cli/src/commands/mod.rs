pub mod check;
pub mod config;
pub mod replay;
pub mod simulate;
pub mod track;

use std::path::Path;

use clap::ValueEnum;

use gesturemouse_common::error::GestureResult;
use gesturemouse_hand_model::action::ActionStreamHeader;
use gesturemouse_input_dispatch::sinks::LogSink;
use gesturemouse_input_dispatch::writer::ActionWriter;
use gesturemouse_input_dispatch::InputSink;

/// Where dispatched actions go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SinkKind {
    /// JSONL action stream to `--output` or stdout
    #[default]
    Jsonl,
    /// Tracing events on stderr
    Log,
}

/// Open the selected sink. `output` only applies to the JSONL sink.
pub fn open_sink(
    kind: SinkKind,
    output: Option<&Path>,
    header: &ActionStreamHeader,
) -> GestureResult<Box<dyn InputSink>> {
    Ok(match (kind, output) {
        (SinkKind::Jsonl, Some(path)) => Box::new(ActionWriter::create(path, header)?),
        (SinkKind::Jsonl, None) => Box::new(ActionWriter::stdout(header)?),
        (SinkKind::Log, _) => Box::new(LogSink::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sink_by_kind() {
        let header = ActionStreamHeader::new(1920, 1080);
        let log = open_sink(SinkKind::Log, None, &header).unwrap();
        assert_eq!(log.name(), "log");

        let dir = std::env::temp_dir().join("gesturemouse_test_open_sink");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("actions.jsonl");
        let file = open_sink(SinkKind::Jsonl, Some(&path), &header).unwrap();
        assert_eq!(file.name(), "jsonl-file");
        drop(file);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("# "));
        std::fs::remove_dir_all(&dir).ok();
    }
}
