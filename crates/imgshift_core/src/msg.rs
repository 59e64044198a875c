#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User dropped or picked file(s).
    FilesDropped(Vec<crate::SourceCandidate>),
    /// User changed the format dropdown; `None` is the unset entry.
    FormatSelected(Option<crate::TargetFormat>),
    /// User clicked Convert.
    ConvertClicked,
    /// Engine finished a conversion run.
    ConversionFinished {
        run_id: crate::RunId,
        outcome: crate::ConversionOutcome,
    },
    /// Engine finished saving the artifact of a run.
    DeliveryFinished {
        run_id: crate::RunId,
        outcome: crate::DeliveryOutcome,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
