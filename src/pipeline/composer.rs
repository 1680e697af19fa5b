use std::collections::HashMap;

use super::scanner::Record;

/// One output row: fields merged from the records at the same index of every list.
pub type CompositeItem = HashMap<String, String>;

/// Number of items that can be composed: the shortest list caps the output.
pub fn item_count(lists: &[Vec<Record>]) -> usize {
    lists.iter().map(Vec::len).min().unwrap_or(0)
}

/// Zip the per-pattern record lists positionally. On shared field names the
/// later pattern wins.
pub fn compose(lists: &[Vec<Record>]) -> Vec<CompositeItem> {
    let limit = item_count(lists);
    (0..limit)
        .map(|i| {
            let mut item = CompositeItem::new();
            for list in lists {
                for (key, value) in &list[i].fields {
                    item.insert(key.clone(), value.clone());
                }
            }
            item
        })
        .collect()
}
