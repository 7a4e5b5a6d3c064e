use crate::{HistoryIcon, HistoryItem, Level};

fn item(level: Level, snapshot: i64) -> HistoryItem {
    HistoryItem {
        level,
        text: format!("text {snapshot}"),
        title: "Clock".into(),
        snapshot,
        icon: None,
    }
}

fn item_with_icon(snapshot: i64) -> HistoryItem {
    HistoryItem {
        icon: Some(HistoryIcon {
            name: "clock".into(),
            element: "<svg viewBox=\"0 0 24 24\"><path d=\"M0 0h24v24H0z\"/></svg>".into(),
        }),
        ..item(Level::Low, snapshot)
    }
}
