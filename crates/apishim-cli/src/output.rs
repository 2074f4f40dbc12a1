//! Output formatting for command results

use crate::cli::OutputFormat;
use crate::error::Result;
use apishim_schemas::ValidationError;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// Writes command results in the selected format
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Informational message; human format only
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write structured data; human format falls back to pretty JSON
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Human => serde_json::to_string_pretty(value)?,
        };
        self.writeln(formatted.trim_end())
    }

    /// Human rendering of a validation failure
    pub fn validation_error(&mut self, error: &ValidationError) -> Result<()> {
        if !self.is_human() {
            return self.data(error);
        }

        let location = if self.use_color {
            error.path.cyan().to_string()
        } else {
            error.path.clone()
        };
        self.writeln(&format!("  at {}: {}", location, error.message))?;
        for violation in &error.schema_violations {
            self.writeln(&format!(
                "    - {} (expected {}, got {})",
                violation.rule, violation.expected, violation.actual
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_human_messages() {
        let buffer = Buffer::default();
        let mut out =
            OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(buffer.clone()));
        out.info("loading").unwrap();
        out.success("done").unwrap();
        out.validation_error(&ValidationError::rule(
            "$.v1_calls",
            "at least one V1 call is required",
            "min_items",
            "1",
            "0",
        ))
        .unwrap();

        let text = buffer.text();
        assert!(text.contains("INFO: loading"));
        assert!(text.contains("done"));
        assert!(text.contains("at $.v1_calls: at least one V1 call is required"));
        assert!(text.contains("min_items"));
    }

    #[test]
    fn test_json_suppresses_messages() {
        let buffer = Buffer::default();
        let mut out =
            OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));
        out.info("hidden").unwrap();
        out.data(&serde_json::json!({"id": "policy"})).unwrap();

        let text = buffer.text();
        assert!(!text.contains("hidden"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["id"], "policy");
    }
}
