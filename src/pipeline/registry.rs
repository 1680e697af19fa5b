use anyhow::{bail, Result};
use regex::Regex;

use crate::config::PatternSpec;

/// A configured extraction rule with its compiled matcher.
#[derive(Debug)]
pub struct Pattern {
    pub tag: String,
    pub regex: Regex,
    /// Field names for capture groups 1..=N.
    pub captures: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Default)]
pub struct Registry {
    patterns: Vec<Pattern>,
}

impl Registry {
    /// Compile every pattern up front. All failures are reported together.
    pub fn build(specs: &[PatternSpec]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(specs.len());
        let mut problems = Vec::new();

        for (i, spec) in specs.iter().enumerate() {
            let regex = match Regex::new(&spec.regex) {
                Ok(r) => r,
                Err(e) => {
                    problems.push(format!("#{} ({}): {}", i, spec.tag, e));
                    continue;
                }
            };
            let groups = regex.captures_len() - 1;
            if spec.map.len() > groups {
                problems.push(format!(
                    "#{} ({}): map names {} fields but regex has {} capture groups",
                    i,
                    spec.tag,
                    spec.map.len(),
                    groups
                ));
                continue;
            }
            patterns.push(Pattern {
                tag: spec.tag.clone(),
                regex,
                captures: spec.map.clone(),
                unique: spec.unique,
            });
        }

        if !problems.is_empty() {
            bail!("invalid input patterns:\n  {}", problems.join("\n  "));
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}
