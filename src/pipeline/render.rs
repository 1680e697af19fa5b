use std::collections::HashMap;

use crate::config::{Directive, Replacement};

use super::composer::CompositeItem;

/// Everything needed to turn a composite item into text.
#[derive(Debug, Clone, Copy)]
pub struct Template<'a> {
    pub directives: &'a [Directive],
    pub defaults: &'a HashMap<String, String>,
    pub replace: &'a HashMap<String, Vec<Replacement>>,
}

impl Template<'_> {
    /// Item value, else configured default, else empty; then replacements in order.
    pub fn resolve(&self, item: &CompositeItem, field: &str) -> String {
        let mut value = item
            .get(field)
            .or_else(|| self.defaults.get(field))
            .cloned()
            .unwrap_or_default();
        if let Some(reps) = self.replace.get(field) {
            for rep in reps {
                value = value.replace(&rep.from, &rep.to);
            }
        }
        value
    }

    pub fn render_item(&self, item: &CompositeItem) -> String {
        let rows: Vec<String> = self
            .directives
            .iter()
            .map(|d| {
                let value = self.resolve(item, d.field());
                match d {
                    Directive::Labeled(name) => format!("{} = {}", name, value),
                    Directive::PassThrough(_) => value,
                }
            })
            .collect();
        format!("[ {}\n]", rows.join("\n"))
    }

    /// All items, separated by a blank line.
    pub fn render_all(&self, items: &[CompositeItem]) -> String {
        items
            .iter()
            .map(|item| self.render_item(item))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
