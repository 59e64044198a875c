use std::path::PathBuf;
use std::sync::Once;

use imgshift_core::{
    update, AppState, Effect, MissingInputs, Msg, Prompt, SourceCandidate, TargetFormat,
    WorkflowState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(imgshift_logging::initialize_for_tests);
}

fn candidate(name: &str, mime: &str) -> SourceCandidate {
    SourceCandidate {
        name: name.to_string(),
        mime_hint: mime.to_string(),
        path: PathBuf::from("/tmp/input").join(name),
    }
}

fn drop_file(state: AppState, name: &str) -> AppState {
    let (state, effects) = update(state, Msg::FilesDropped(vec![candidate(name, "image/jpeg")]));
    assert!(effects.is_empty());
    state
}

fn select(state: AppState, format: Option<TargetFormat>) -> AppState {
    let (state, effects) = update(state, Msg::FormatSelected(format));
    assert!(effects.is_empty());
    state
}

#[test]
fn acquiring_file_moves_idle_to_file_ready() {
    init_logging();
    let mut state = drop_file(AppState::new(), "photo.jpeg");

    let view = state.view();
    assert_eq!(view.workflow, WorkflowState::FileReady);
    assert_eq!(view.file_name.as_deref(), Some("photo.jpeg"));
    assert!(!view.convert_enabled);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn readiness_is_a_conjunction_in_either_order() {
    init_logging();
    let file_first = select(drop_file(AppState::new(), "a.jpg"), Some(TargetFormat::Png));
    assert_eq!(file_first.workflow(), WorkflowState::FormatReady);

    let format_first = select(AppState::new(), Some(TargetFormat::Png));
    assert_eq!(format_first.workflow(), WorkflowState::Idle);
    let format_first = drop_file(format_first, "a.jpg");
    assert_eq!(format_first.workflow(), WorkflowState::FormatReady);
    assert!(format_first.view().convert_enabled);
}

#[test]
fn empty_drop_is_silently_ignored() {
    init_logging();
    let state = drop_file(AppState::new(), "keep.png");
    let (next, effects) = update(state.clone(), Msg::FilesDropped(Vec::new()));

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn multiple_files_and_non_images_are_rejected() {
    init_logging();
    let state = drop_file(AppState::new(), "keep.png");

    let (next, effects) = update(
        state.clone(),
        Msg::FilesDropped(vec![
            candidate("a.png", "image/png"),
            candidate("b.png", "image/png"),
        ]),
    );
    assert_eq!(next, state);
    assert!(effects.is_empty());

    let (next, effects) = update(
        state.clone(),
        Msg::FilesDropped(vec![candidate("notes.txt", "text/plain")]),
    );
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn convert_without_inputs_prompts_and_keeps_state() {
    init_logging();
    let cases = [
        (AppState::new(), MissingInputs::FileAndFormat),
        (drop_file(AppState::new(), "a.jpg"), MissingInputs::Format),
        (select(AppState::new(), Some(TargetFormat::Gif)), MissingInputs::File),
    ];

    for (state, missing) in cases {
        let before = state.workflow();
        let (next, effects) = update(state.clone(), Msg::ConvertClicked);

        assert_eq!(next, state);
        assert_eq!(next.workflow(), before);
        assert_eq!(effects, vec![Effect::Prompt(Prompt::MissingInputs(missing))]);
    }
}

#[test]
fn unsetting_format_disarms_convert() {
    init_logging();
    let state = select(drop_file(AppState::new(), "a.jpg"), Some(TargetFormat::Webp));
    let state = select(state, None);

    assert_eq!(state.workflow(), WorkflowState::FileReady);
    let (_, effects) = update(state, Msg::ConvertClicked);
    assert_eq!(
        effects,
        vec![Effect::Prompt(Prompt::MissingInputs(MissingInputs::Format))]
    );
}

#[test]
fn convert_with_both_inputs_starts_conversion() {
    init_logging();
    for format in TargetFormat::ALL {
        let state = select(drop_file(AppState::new(), "photo.jpeg"), Some(format));
        let source = state.source().cloned().unwrap();

        let (next, effects) = update(state, Msg::ConvertClicked);

        assert_eq!(next.workflow(), WorkflowState::Converting);
        assert!(!next.view().convert_enabled);
        assert_eq!(
            effects,
            vec![Effect::StartConversion {
                run_id: 1,
                source,
                format,
            }]
        );
    }
}

#[test]
fn format_options_list_unset_and_all_formats() {
    let state = select(AppState::new(), Some(TargetFormat::Webp));
    let options = state.view().format_options;

    let labels: Vec<_> = options.iter().map(|o| o.label).collect();
    assert_eq!(labels, vec!["Select format", "JPG", "PNG", "WEBP", "GIF"]);
    let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].value, Some(TargetFormat::Webp));
}

#[test]
fn reselecting_same_format_changes_nothing() {
    let mut state = select(drop_file(AppState::new(), "a.jpg"), Some(TargetFormat::Png));
    assert!(state.consume_dirty());

    let (mut next, effects) = update(state.clone(), Msg::FormatSelected(Some(TargetFormat::Png)));
    assert_eq!(next, state);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
