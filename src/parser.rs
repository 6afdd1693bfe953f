use std::io::{BufRead, Read};

use crate::error::{HstsError, Result};
use crate::loader::LoadOptions;
use crate::normalize::AsciiEncoder;
use crate::store::{RuleStore, SealedRules};
use crate::types::{Flags, RuleCounts, Section};

const BEGIN_ICANN: &str = "===BEGIN ICANN DOMAINS===";
const END_ICANN: &str = "===END ICANN DOMAINS===";
const BEGIN_PRIVATE: &str = "===BEGIN PRIVATE DOMAINS===";
const END_PRIVATE: &str = "===END PRIVATE DOMAINS===";

/// Longest suffix accepted from a rule line (maximum DNS name length).
pub const MAX_SUFFIX_LEN: usize = 253;

/// Initial store size; the public suffix list holds a few thousand rules.
const EXPECTED_RULES: usize = 8 * 1024;

/// A single rule parsed from a rule line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule<'a> {
    /// Suffix without `!` or `*.` prefix
    pub suffix: &'a str,
    /// Rule flags including the section tag
    pub flags: Flags,
}

/// Result of compiling a text rule stream
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: SealedRules,
    pub counts: RuleCounts,
    /// Whether any rule contained non-ASCII labels
    pub international: bool,
}

/// Tracks which list section the parser is in.
///
/// Only a transition out of "no section" is honored; markers seen inside a
/// section other than its own end marker are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionTracker {
    current: Option<Section>,
}

impl SectionTracker {
    pub fn current(&self) -> Option<Section> {
        self.current
    }

    /// Update state from a comment's text (without the leading `//`).
    pub fn observe_comment(&mut self, comment: &str) {
        self.current = match self.current {
            None if comment.contains(BEGIN_ICANN) => Some(Section::Icann),
            None if comment.contains(BEGIN_PRIVATE) => Some(Section::Private),
            Some(Section::Icann) if comment.contains(END_ICANN) => None,
            Some(Section::Private) if comment.contains(END_PRIVATE) => None,
            state => state,
        };
    }
}

#[inline]
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Parse one rule token (the text up to the first whitespace).
///
/// Returns `None` for unsupported forms such as a bare `*` or an empty
/// suffix; those are skipped rather than treated as errors.
pub fn parse_rule(token: &str, section: Option<Section>) -> Option<ParsedRule<'_>> {
    let section_flag = section.map(Section::flag).unwrap_or_default();

    let (suffix, flags) = if let Some(rest) = token.strip_prefix('!') {
        (rest, Flags::EXCEPTION | section_flag)
    } else if let Some(rest) = token.strip_prefix('*') {
        // "*.foo.bar" also makes "foo.bar" itself a public suffix
        let rest = rest.strip_prefix('.')?;
        (rest, Flags::WILDCARD | Flags::PLAIN | section_flag)
    } else {
        (token, Flags::PLAIN | section_flag)
    };

    if suffix.is_empty() || suffix.len() > MAX_SUFFIX_LEN {
        return None;
    }
    Some(ParsedRule { suffix, flags })
}

/// Incremental text rule compiler.
pub struct TextCompiler<'e> {
    store: RuleStore,
    sections: SectionTracker,
    counts: RuleCounts,
    international: bool,
    encoder: &'e dyn AsciiEncoder,
}

impl<'e> TextCompiler<'e> {
    pub fn new(encoder: &'e dyn AsciiEncoder) -> Result<Self> {
        Ok(Self {
            store: RuleStore::with_capacity(EXPECTED_RULES)?,
            sections: SectionTracker::default(),
            counts: RuleCounts::default(),
            international: false,
            encoder,
        })
    }

    /// Feed one line of the rule file.
    ///
    /// Only allocation failure is an error; unsupported rules are skipped.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_start_matches(is_space);
        if line.is_empty() {
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix("//") {
            self.sections.observe_comment(comment);
            return Ok(());
        }

        let token = line.split(is_space).next().unwrap_or(line);
        let Some(rule) = parse_rule(token, self.sections.current()) else {
            tracing::debug!(rule = token, "skipping unsupported rule");
            return Ok(());
        };

        if rule.flags.is_exception() {
            self.counts.exceptions += 1;
        } else {
            self.counts.suffixes += 1;
            if rule.flags.is_wildcard() {
                self.counts.wildcards += 1;
            }
        }

        let merged = self.store.insert(rule.suffix, rule.flags)?;

        if !rule.suffix.is_ascii() {
            self.international = true;
            if let Some(ascii) = self.encoder.to_ascii(rule.suffix) {
                if ascii != rule.suffix {
                    self.store.insert(&ascii, merged)?;
                }
            }
        }
        Ok(())
    }

    /// Seal the store for querying.
    pub fn finish(self) -> CompiledRules {
        tracing::debug!(
            rules = self.store.len(),
            suffixes = self.counts.suffixes,
            exceptions = self.counts.exceptions,
            wildcards = self.counts.wildcards,
            "compiled text rules"
        );
        CompiledRules {
            rules: self.store.seal(),
            counts: self.counts,
            international: self.international,
        }
    }
}

/// Compile a PSL-style rule stream.
///
/// The total bytes read are bounded by `options.max_size`. A line that is
/// not valid UTF-8 fails the whole load.
pub fn compile_rules<R: BufRead>(
    mut reader: R,
    options: &LoadOptions,
    encoder: &dyn AsciiEncoder,
) -> Result<CompiledRules> {
    let limit = options.max_size;
    let mut compiler = TextCompiler::new(encoder)?;
    let mut line = Vec::new();
    let mut total = 0usize;
    let mut line_num = 0usize;

    loop {
        line.clear();
        // Never buffer more than one byte past the remaining budget
        let budget = ((limit - total) as u64).saturating_add(1);
        let n = reader.by_ref().take(budget).read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        total += n;
        if total > limit {
            tracing::warn!(limit, "rule file exceeds size ceiling");
            return Err(HstsError::TooLarge { limit });
        }
        line_num += 1;

        let text = std::str::from_utf8(&line).map_err(|e| {
            HstsError::Format(format!("line {}: invalid UTF-8: {}", line_num, e))
        })?;
        compiler.push_line(text)?;
    }

    Ok(compiler.finish())
}

/// Compile rules from an in-memory string.
pub fn compile_str(text: &str, encoder: &dyn AsciiEncoder) -> Result<CompiledRules> {
    compile_rules(text.as_bytes(), &LoadOptions::default(), encoder)
}
