use log::info;

use rmtes_core::field_list::decode_field_list;
use rmtes_core::message::{RefreshMsg, StatusMsg, UpdateMsg};
use rmtes_core::{ConsumerClient, FieldDictionary, FieldList, Handle};

const NOT_SET: &str = "<not set>";

/// Клиент, который печатает каждое сообщение в лог (info).
pub(crate) struct DisplayClient {
    dict: FieldDictionary,
}

impl DisplayClient {
    pub(crate) fn new(dict: FieldDictionary) -> Self {
        Self { dict }
    }
}

impl ConsumerClient for DisplayClient {
    fn on_refresh(&mut self, _handle: Handle, msg: &RefreshMsg) {
        log_lines(&format_refresh(msg, &self.dict));
    }

    fn on_update(&mut self, _handle: Handle, msg: &UpdateMsg) {
        log_lines(&format_update(msg, &self.dict));
    }

    fn on_status(&mut self, _handle: Handle, msg: &StatusMsg) {
        log_lines(&format_status(msg));
    }
}

fn log_lines(lines: &[String]) {
    for l in lines {
        info!("{l}");
    }
}

fn header(kind: &str, name: Option<&str>, service: Option<&str>) -> Vec<String> {
    vec![
        format!("{kind} Message:"),
        format!("Item Name: {}", name.unwrap_or(NOT_SET)),
        format!("Service Name: {}", service.unwrap_or(NOT_SET)),
    ]
}

pub(crate) fn format_refresh(msg: &RefreshMsg, dict: &FieldDictionary) -> Vec<String> {
    let mut out = header("Refresh", msg.name.as_deref(), msg.service_name.as_deref());
    out.push(format!("Item State: {}", msg.state));
    out.extend(format_fields(&msg.payload, dict));
    out
}

pub(crate) fn format_update(msg: &UpdateMsg, dict: &FieldDictionary) -> Vec<String> {
    let mut out = header("Update", msg.name.as_deref(), msg.service_name.as_deref());
    out.extend(format_fields(&msg.payload, dict));
    out
}

pub(crate) fn format_status(msg: &StatusMsg) -> Vec<String> {
    let mut out = header("Status", msg.name.as_deref(), msg.service_name.as_deref());
    if let Some(state) = &msg.state {
        out.push(format!("Item State: {state}"));
    }
    out
}

/// Одна строка на поле. Поле, которое не декодировалось, печатается с ошибкой,
/// остальные не страдают.
pub(crate) fn format_fields(fields: &FieldList, dict: &FieldDictionary) -> Vec<String> {
    decode_field_list(fields, dict)
        .into_iter()
        .map(|e| {
            let value = match &e.value {
                Ok(v) => v.to_string(),
                Err(err) => format!("<{err}>"),
            };
            format!(
                "Fid {} Name = {} DataType: {} Value: {}",
                e.field_id, e.name, e.kind, value
            )
        })
        .collect()
}
