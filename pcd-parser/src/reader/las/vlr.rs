/// Splits a text VLR payload of `key[value]` fragments into pairs, sorted
/// by key.
///
/// Values may contain commas, so fragments without an opening bracket are
/// glued back onto their left neighbour. Payloads without any comma are not
/// key/value text and yield nothing.
pub fn parse_vlr_payload(data: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(data);
    let text = text.trim_end_matches('\0');

    let mut fragments: Vec<String> = text.split(',').map(str::to_string).collect();
    if fragments.len() < 2 {
        log::debug!("skipping VLR payload without fields ({} bytes)", data.len());
        return Vec::new();
    }

    for i in (0..fragments.len()).rev() {
        let cleaned = fragments[i].replace(&[']', '"'][..], "");
        if i > 0 && !cleaned.contains('[') {
            let merged = format!("{},{}", fragments[i - 1], cleaned);
            fragments[i - 1] = merged;
            fragments.remove(i);
        } else {
            fragments[i] = cleaned;
        }
    }
    fragments.sort();

    fragments
        .into_iter()
        .map(|fragment| match fragment.split_once('[') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (fragment, String::new()),
        })
        .collect()
}
