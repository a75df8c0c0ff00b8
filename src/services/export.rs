use crate::models::mood::MoodEntry;

const CSV_HEADER: &str = "Date,Mood Level,Mood,Tags,Notes";

/// CSV with fixed columns; rows follow the input order.
pub fn mood_entries_to_csv(entries: &[MoodEntry]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for entry in entries {
        let tags = entry
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let row = [
            entry.date.to_string(),
            entry.mood.to_string(),
            entry.label().to_string(),
            tags,
            entry.notes.clone(),
        ];
        let row: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
