/// Extract the first top-level JSON object from free-form model text.
///
/// Models often wrap their JSON in prose or markdown fences; the span from
/// the first `{` to the last `}` is what gets deserialized.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
