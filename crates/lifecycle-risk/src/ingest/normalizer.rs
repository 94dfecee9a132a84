/// Stable identity for extracts that carry no `district_id` column:
/// `"<state>/<district>"`, lowercased, with runs of non-alphanumerics collapsed
/// to a single hyphen.
pub(crate) fn district_key(state: &str, district_name: &str) -> String {
    format!("{}/{}", slug(state), slug(district_name))
}

fn slug(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
