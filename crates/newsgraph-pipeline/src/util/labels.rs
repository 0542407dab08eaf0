/// Cuts `label` to at most `max_chars` characters (not bytes).
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        Some((idx, _)) => label[..idx].to_string(),
        None => label.to_string(),
    }
}
