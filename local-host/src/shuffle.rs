/// Sorts intermediate pairs by key and groups runs of equal keys.
///
/// The sort is stable, so values within one key keep their emission order.
/// Each group's values are handed downstream as an owned Vec; consumers
/// iterate it single-pass.
pub fn group(mut pairs: Vec<(String, String)>) -> Vec<(String, Vec<String>)> {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.last_mut() {
            Some((last, values)) if *last == key => values.push(value),
            _ => grouped.push((key, vec![value])),
        }
    }
    grouped
}
