//! Non-fatal diagnostics reported while normalizing and laying out content.

use serde::Serialize;

/// A degraded-but-handled condition.
///
/// None of these abort a pass; they describe what was dropped, skipped or
/// simplified so callers can surface authoring problems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "snake_case")]
pub enum LayoutDiagnostic {
    /// An image record was removed before scanning.
    ImageDropped {
        /// Index in the raw image list.
        record_index: usize,
        /// Why it was removed.
        reason: &'static str,
    },
    /// An image record was not an object. Its fields cannot be read, so an
    /// `ImageDropped` for the same record always follows.
    ImageRecordMalformed {
        /// Index in the raw image list.
        record_index: usize,
    },
    /// A document entry was not a known block and produced nothing.
    BlockSkipped {
        /// Index in the raw document.
        block_index: usize,
        /// The `type` tag found, or `"<missing>"`.
        kind: Box<str>,
    },
    /// A pair request could not be honoured; the image was placed alone.
    PairingDowngraded {
        /// Index in the normalized image list.
        image_index: usize,
        /// Why pairing was not possible.
        reason: &'static str,
    },
    /// Images placed after the last block because no paragraph slot was left.
    FlushPlaced {
        /// First flushed image (normalized index).
        first_image_index: usize,
        /// Number of images placed during the flush phase.
        count: usize,
    },
}

/// Receiver for [`LayoutDiagnostic`]s.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: LayoutDiagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(LayoutDiagnostic),
{
    fn report(&mut self, diagnostic: LayoutDiagnostic) {
        self(diagnostic)
    }
}

/// Sink that forwards every diagnostic to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&mut self, diagnostic: LayoutDiagnostic) {
        log_diagnostic(&diagnostic);
    }
}

/// Emit one diagnostic through `log` at the level it deserves.
pub fn log_diagnostic(diagnostic: &LayoutDiagnostic) {
    match diagnostic {
        LayoutDiagnostic::ImageDropped {
            record_index,
            reason,
        } => log::debug!("dropping image record {}: {}", record_index, reason),
        LayoutDiagnostic::ImageRecordMalformed { record_index } => {
            log::warn!(
                "image record {} is malformed; falling back to defaults",
                record_index
            )
        }
        LayoutDiagnostic::BlockSkipped { block_index, kind } => {
            log::debug!("skipping block {} of unknown kind '{}'", block_index, kind)
        }
        LayoutDiagnostic::PairingDowngraded {
            image_index,
            reason,
        } => log::debug!(
            "image {} requested pairing but was placed alone: {}",
            image_index,
            reason
        ),
        LayoutDiagnostic::FlushPlaced {
            first_image_index,
            count,
        } => log::debug!(
            "placed {} trailing image(s) starting at {} after the last block",
            count,
            first_image_index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |d: LayoutDiagnostic| seen.push(d);
            sink.report(LayoutDiagnostic::ImageRecordMalformed { record_index: 3 });
        }
        assert_eq!(
            seen,
            vec![LayoutDiagnostic::ImageRecordMalformed { record_index: 3 }]
        );
    }

    #[test]
    fn diagnostics_serialize_with_diagnostic_tag() {
        let value = serde_json::to_value(LayoutDiagnostic::PairingDowngraded {
            image_index: 1,
            reason: "no following image",
        })
        .expect("serialize diagnostic");
        assert_eq!(value["diagnostic"], "pairing_downgraded");
        assert_eq!(value["image_index"], 1);
    }

    #[test]
    fn skipped_block_keeps_its_kind_field() {
        let value = serde_json::to_value(LayoutDiagnostic::BlockSkipped {
            block_index: 4,
            kind: "embed".into(),
        })
        .expect("serialize diagnostic");
        assert_eq!(
            value,
            serde_json::json!({"diagnostic": "block_skipped", "block_index": 4, "kind": "embed"})
        );
    }
}
