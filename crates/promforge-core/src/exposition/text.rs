//! Line-oriented text renderer.

use std::collections::HashSet;
use std::fmt::Write as _;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{MetricsError, Result};

use super::writer::{MetricType, MetricsWriter, SampleValue};

/// Escape a label value for embedding between double quotes.
fn escape_label_value(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape help text (backslash and newline only, per the text format).
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Text exposition writer over any async byte sink.
///
/// Lines are staged into a `BytesMut` and handed to the sink on `flush`, so
/// one family's header and samples always reach the sink together.
pub struct TextMetricsWriter<W> {
    sink: W,
    buf: BytesMut,
    started_families: HashSet<String>,
}

impl<W> TextMetricsWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buf: BytesMut::with_capacity(1024),
            started_families: HashSet::new(),
        }
    }

    /// Give back the sink. Any unflushed bytes are discarded.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MetricsWriter for TextMetricsWriter<W> {
    fn write_family_header(
        &mut self,
        name: &str,
        help: &str,
        metric_type: MetricType,
    ) -> Result<()> {
        if !self.started_families.insert(name.to_string()) {
            return Err(MetricsError::DuplicateFamilyHeader(name.to_string()));
        }

        if help.is_empty() {
            let _ = writeln!(self.buf, "# HELP {name}");
        } else {
            let _ = writeln!(self.buf, "# HELP {name} {}", escape_help(help));
        }
        let _ = writeln!(self.buf, "# TYPE {name} {}", metric_type.as_str());
        Ok(())
    }

    fn write_sample(
        &mut self,
        name: &str,
        suffix: &str,
        label_names: &[String],
        label_values: &[String],
        extra_label: Option<(&str, &str)>,
        value: SampleValue,
        timestamp: Option<i64>,
    ) -> Result<()> {
        if label_names.len() != label_values.len() {
            return Err(MetricsError::LabelArityMismatch {
                expected: label_names.len(),
                actual: label_values.len(),
            });
        }

        let _ = write!(self.buf, "{name}{suffix}");

        let has_labels = !label_names.is_empty() || extra_label.is_some();
        if has_labels {
            let _ = write!(self.buf, "{{");
            let mut first = true;
            for (ln, lv) in label_names.iter().zip(label_values.iter()) {
                if !first {
                    let _ = write!(self.buf, ",");
                }
                first = false;
                let _ = write!(self.buf, "{ln}=\"{}\"", escape_label_value(lv));
            }
            if let Some((ln, lv)) = extra_label {
                if !first {
                    let _ = write!(self.buf, ",");
                }
                let _ = write!(self.buf, "{ln}=\"{}\"", escape_label_value(lv));
            }
            let _ = write!(self.buf, "}}");
        }

        let _ = write!(self.buf, " {value}");
        if let Some(ts) = timestamp {
            let _ = write!(self.buf, " {ts}");
        }
        let _ = writeln!(self.buf);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            self.sink.write_all(&self.buf).await?;
            self.buf.clear();
        }
        self.sink.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.flush().await?;
        self.started_families.clear();
        Ok(())
    }
}
