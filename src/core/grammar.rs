/// Phrasing grammar: weighted sentence templates, RON loading, and expansion.
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::variety::VarietyPass;

/// Nested rule references deeper than this are treated as a cycle.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("rule '{0}' has no alternatives")]
    EmptyRule(String),
    #[error("rule '{0}' does not apply to the current tags")]
    NotApplicable(String),
    #[error("field not bound: call.{0}")]
    UnboundField(String),
    #[error("rule expansion nested too deeply at '{0}'")]
    TooDeep(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Reference to another grammar rule: `{rule_name}`.
    RuleRef(String),
    /// A value supplied by the narrator for this call: `{call.field}`.
    Field(String),
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// Syntax:
    /// - `{call.field}` → `Field`
    /// - `{rule_name}` → `RuleRef`
    /// - `{{` / `}}` → literal braces
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    if !literal.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
                    }
                    let mut content = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(GrammarError::TemplateParse(
                                    "nested braces are not allowed".to_string(),
                                ))
                            }
                            other => content.push(other),
                        }
                    }
                    if !closed {
                        return Err(GrammarError::TemplateParse("unclosed brace".to_string()));
                    }
                    segments.push(Self::parse_segment(content.trim())?);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(GrammarError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ))
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(TemplateSegment::Literal(literal));
        }
        Ok(Template { segments })
    }

    fn parse_segment(content: &str) -> Result<TemplateSegment, GrammarError> {
        if content.is_empty() {
            return Err(GrammarError::TemplateParse("empty braces".to_string()));
        }
        if let Some(field) = content.strip_prefix("call.") {
            if field.is_empty() {
                return Err(GrammarError::TemplateParse(
                    "empty call field name".to_string(),
                ));
            }
            return Ok(TemplateSegment::Field(field.to_string()));
        }
        Ok(TemplateSegment::RuleRef(content.to_string()))
    }

    /// Names of every `{call.field}` this template uses.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A weighted text alternative within a grammar rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: u32,
    pub template: Template,
}

/// A grammar rule with tag preconditions and weighted alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub name: String,
    pub requires: Vec<String>,
    pub excludes: Vec<String>,
    pub alternatives: Vec<Alternative>,
}

impl GrammarRule {
    /// True when every required tag is present and no excluded tag is.
    pub fn applies(&self, tags: &FxHashSet<String>) -> bool {
        self.requires.iter().all(|t| tags.contains(t))
            && !self.excludes.iter().any(|t| tags.contains(t))
    }
}

/// Per-call inputs to expansion: situation tags and bound field values.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub tags: FxHashSet<String>,
    pub fields: FxHashMap<String, String>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn bind(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

/// A set of named grammar rules.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrammarSet {
    pub rules: HashMap<String, GrammarRule>,
}

// The RON file shape differs from the parsed types, hence the raw structs.

#[derive(Debug, Deserialize)]
struct RonAlternative {
    weight: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Rule")]
struct RonRule {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    alternatives: Vec<RonAlternative>,
}

impl GrammarSet {
    /// Load a grammar set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GrammarSet, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a grammar set from a RON string.
    pub fn parse_ron(input: &str) -> Result<GrammarSet, GrammarError> {
        let raw: HashMap<String, RonRule> = ron::from_str(input)?;
        let mut rules = HashMap::with_capacity(raw.len());

        for (name, ron_rule) in raw {
            let alternatives = ron_rule
                .alternatives
                .into_iter()
                .map(|alt| {
                    Ok(Alternative {
                        weight: alt.weight,
                        template: Template::parse(&alt.text)?,
                    })
                })
                .collect::<Result<Vec<_>, GrammarError>>()?;
            rules.insert(
                name.clone(),
                GrammarRule {
                    name,
                    requires: ron_rule.requires,
                    excludes: ron_rule.excludes,
                    alternatives,
                },
            );
        }

        Ok(GrammarSet { rules })
    }

    /// Merge another grammar set into this one. Rules from `other`
    /// override rules in `self` with the same name.
    pub fn merge(&mut self, other: GrammarSet) {
        self.rules.extend(other.rules);
    }

    /// Expand `rule` into text.
    ///
    /// Alternatives are drawn by weight through `rng`; `variety` steers the
    /// draw away from the alternative used last time for the same rule.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        rule: &str,
        ctx: &SelectionContext,
        rng: &mut R,
        variety: &mut VarietyPass,
    ) -> Result<String, GrammarError> {
        let mut out = String::new();
        self.expand_into(rule, ctx, rng, variety, 0, &mut out)?;
        Ok(out)
    }

    fn expand_into<R: Rng + ?Sized>(
        &self,
        name: &str,
        ctx: &SelectionContext,
        rng: &mut R,
        variety: &mut VarietyPass,
        depth: usize,
        out: &mut String,
    ) -> Result<(), GrammarError> {
        if depth >= MAX_DEPTH {
            return Err(GrammarError::TooDeep(name.to_string()));
        }
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| GrammarError::RuleNotFound(name.to_string()))?;
        if !rule.applies(&ctx.tags) {
            return Err(GrammarError::NotApplicable(name.to_string()));
        }

        let index = variety.choose(rule, rng)?;
        for segment in &rule.alternatives[index].template.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Field(field) => {
                    let value = ctx
                        .fields
                        .get(field)
                        .ok_or_else(|| GrammarError::UnboundField(field.clone()))?;
                    out.push_str(value);
                }
                TemplateSegment::RuleRef(child) => {
                    self.expand_into(child, ctx, rng, variety, depth + 1, out)?
                }
            }
        }
        Ok(())
    }
}

/// Draw an alternative index by weight, skipping `skip` when given.
pub(crate) fn weighted_pick<R: Rng + ?Sized>(
    rule: &GrammarRule,
    skip: Option<usize>,
    rng: &mut R,
) -> Result<usize, GrammarError> {
    let weights: Vec<u32> = rule
        .alternatives
        .iter()
        .enumerate()
        .map(|(i, alt)| if Some(i) == skip { 0 } else { alt.weight })
        .collect();
    let dist =
        WeightedIndex::new(&weights).map_err(|_| GrammarError::EmptyRule(rule.name.clone()))?;
    Ok(dist.sample(rng))
}
