use crate::error::TunerError;
use crate::game::session::GameReport;
use crate::genetics::GenerationSummary;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// How reports are written out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned tables for reading in a terminal.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Tuner(#[from] TunerError),
    #[error("unable to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

fn write_one<T>(item: &T, format: OutputFormat, writer: &mut impl Write) -> Result<(), WriteError>
where
    T: Serialize + std::fmt::Display,
{
    match format {
        OutputFormat::Text => writeln!(writer, "{}", item)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, item)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// A public function to write a single game `report` to a writer.
pub fn write_report(
    report: &GameReport,
    format: OutputFormat,
    mut writer: impl Write,
) -> Result<(), WriteError> {
    write_one(report, format, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// A public function that drains `generations`, writing each summary as soon as it is produced.
/// Stops at the first failed generation. Returns how many summaries were written.
pub fn write_generations<I>(
    generations: I,
    format: OutputFormat,
    mut writer: impl Write,
) -> Result<usize, WriteError>
where
    I: IntoIterator<Item = Result<GenerationSummary, TunerError>>,
{
    let mut written = 0;
    for summary in generations {
        write_one(&summary?, format, &mut writer)?;
        writer.flush()?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::session::StopReason;

    fn report() -> GameReport {
        GameReport {
            name: String::from("AI Player"),
            balance: 5230,
            cash_in: 10_240,
            cash_out: 10_010,
            cash_ratio: Some(10_240.0 / 10_010.0),
            hands_played: 1000,
            stop: StopReason::HandLimit,
        }
    }

    #[test]
    fn test_text_report() {
        let mut out = Vec::new();
        write_report(&report(), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("AI Player"));
        assert!(text.contains("5230"));
        assert!(text.contains("hand limit reached"));
        assert!(text.contains("1.023"));
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        write_report(&report(), OutputFormat::Json, &mut out).unwrap();
        write_report(&report(), OutputFormat::Json, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["balance"], 5230);
        assert_eq!(value["stop"], "HandLimit");
    }

    #[test]
    fn test_generation_errors_stop_the_writer() {
        let failing: Vec<Result<GenerationSummary, TunerError>> =
            vec![Err(TunerError::Game(crate::error::GameError::NoPlayers))];
        let result = write_generations(failing, OutputFormat::Text, Vec::new());
        assert!(matches!(result, Err(WriteError::Tuner(_))));
    }
}
