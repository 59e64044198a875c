use imgshift_core::{AppViewModel, DeliveryReceipt, DeliveryStatus, WorkflowState};
use serde::Serialize;

pub fn render(view: &AppViewModel) -> Vec<String> {
    let file_line = match &view.file_name {
        Some(name) => format!("File:    {name}"),
        None => "File:    none (open <path> to pick an image)".to_string(),
    };

    let options = view
        .format_options
        .iter()
        .map(|option| {
            if option.selected {
                format!("[{}]", option.label)
            } else {
                option.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        file_line,
        format!("Format:  {options}"),
        format!(
            "Convert: {}",
            if view.convert_enabled { "enabled" } else { "disabled" }
        ),
        format!("State:   {}", workflow_label(view.workflow)),
    ];

    if let Some(failure) = &view.last_failure {
        lines.push(format!("Error:   {failure}"));
    }
    match &view.delivery {
        Some(DeliveryStatus::Pending) => lines.push("Saving:  in progress".to_string()),
        Some(DeliveryStatus::Saved(receipt)) => {
            let elapsed = view
                .last_elapsed
                .map(|d| format!(" in {} ms", d.as_millis()))
                .unwrap_or_default();
            lines.push(format!(
                "Saved:   {} ({}, {} bytes){}",
                receipt.location.display(),
                receipt.media_type,
                receipt.byte_len,
                elapsed
            ));
        }
        Some(DeliveryStatus::Faulted(fault)) => lines.push(format!("Error:   {fault}")),
        None => {}
    }
    lines
}

fn workflow_label(workflow: WorkflowState) -> &'static str {
    match workflow {
        WorkflowState::Idle => "idle",
        WorkflowState::FileReady => "file ready",
        WorkflowState::FormatReady => "ready",
        WorkflowState::Converting => "converting",
        WorkflowState::Delivered => "delivered",
        WorkflowState::Failed => "failed",
    }
}

#[derive(Debug, Serialize)]
struct ReceiptJson<'a> {
    file_name: &'a str,
    media_type: &'a str,
    location: String,
    bytes: u64,
    elapsed_ms: Option<u64>,
}

pub fn receipt_json(view: &AppViewModel, receipt: &DeliveryReceipt) -> serde_json::Result<String> {
    serde_json::to_string(&ReceiptJson {
        file_name: &receipt.file_name,
        media_type: &receipt.media_type,
        location: receipt.location.display().to_string(),
        bytes: receipt.byte_len,
        elapsed_ms: view.last_elapsed.map(|d| d.as_millis() as u64),
    })
}
