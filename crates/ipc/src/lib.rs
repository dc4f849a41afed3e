//! IPC message protocol for maskpaint
//!
//! Defines the message types exchanged between the mask editor core and the
//! host UI, and the persisted stroke format used to resume a session.

mod commands;
mod error;
mod messages;
mod types;

pub use commands::*;
pub use error::IpcError;
pub use messages::*;
pub use types::*;

/// Parse a host command from JSON.
pub fn command_from_json(json: &str) -> Result<EditorCommand, IpcError> {
    let command: EditorCommand = serde_json::from_str(json)?;
    if let EditorCommand::LoadStrokes { strokes } = &command {
        validate_strokes(strokes)?;
    }
    Ok(command)
}

/// Parse a script of host commands (a JSON array).
pub fn commands_from_json(json: &str) -> Result<Vec<EditorCommand>, IpcError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(IpcError::InvalidFormat(
            "expected a JSON array of commands".into(),
        ));
    };
    items
        .into_iter()
        .map(|item| -> Result<EditorCommand, IpcError> {
            let command: EditorCommand = serde_json::from_value(item)?;
            if let EditorCommand::LoadStrokes { strokes } = &command {
                validate_strokes(strokes)?;
            }
            Ok(command)
        })
        .collect()
}

/// Serialize an editor event for the host.
pub fn event_to_json(event: &EditorEvent) -> Result<String, IpcError> {
    Ok(serde_json::to_string(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let command = command_from_json(r#"{"type": "PointerDown", "data": {"x": 60, "y": 0}}"#)
            .unwrap();
        assert_eq!(command, EditorCommand::PointerDown { x: 60.0, y: 0.0 });

        let command = command_from_json(r#"{"type": "Undo"}"#).unwrap();
        assert_eq!(command, EditorCommand::Undo);

        let command =
            command_from_json(r#"{"type": "SetTool", "data": {"tool": "eraser"}}"#).unwrap();
        assert_eq!(command, EditorCommand::SetTool { tool: Tool::Eraser });
    }

    #[test]
    fn test_commands_script() {
        let script = r#"[
            {"type": "SetWidth", "data": {"width": 10}},
            {"type": "PointerDown", "data": {"x": 1, "y": 2}},
            {"type": "PointerUp"},
            {"type": "Confirm"}
        ]"#;
        let commands = commands_from_json(script).unwrap();
        assert_eq!(commands.len(), 4);
        assert!(commands[2].mutates_paths());
        assert!(!commands[3].mutates_paths());
    }

    #[test]
    fn test_script_must_be_array() {
        assert!(matches!(
            commands_from_json(r#"{"type": "Undo"}"#),
            Err(IpcError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_strokes_is_validated() {
        let json = r#"{"type": "LoadStrokes", "data": {"strokes": [
            {"points": [], "tool": "pen", "color": [1,1,1,1], "width": 4}
        ]}}"#;
        assert!(matches!(
            command_from_json(json),
            Err(IpcError::InvalidStroke { index: 0, .. })
        ));
    }

    #[test]
    fn test_saved_event_serializes() {
        let event = EditorEvent::Saved(SaveResult {
            mask_data_url: "data:image/jpeg;base64,AAAA".into(),
            strokes: vec![],
            uploaded_mask_url: None,
            warnings: vec![SaveWarning::new(WarningKind::Upload, "offline")],
        });
        let json = event_to_json(&event).unwrap();
        assert!(json.contains("\"type\":\"Saved\""));
        assert!(json.contains("\"kind\":\"upload\""));
    }
}
