//! Section-count normalization across drafts of one document.
//!
//! Independent transcriptions of a sectioned document do not always agree on
//! where sections start. Alignment pairs blocks by position, so a draft that
//! merged two sections would be compared against the wrong text from then on.
//! [`SectionNormalizer`] splits under-sectioned drafts to match the most
//! granular one, locating split points by token alignment.

use layered_drafts::{tokenize, Token};
use layered_drafts_alignment::ProfileAligner;
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{DocumentShape, Section, SectionedDocument};

/// Splits sections of under-sectioned drafts.
#[derive(Debug, Clone, Default)]
pub struct SectionNormalizer {
    aligner: ProfileAligner,
}

impl SectionNormalizer {
    pub fn new(aligner: ProfileAligner) -> Self {
        Self { aligner }
    }

    /// Bring every document up to the section count of the first document
    /// with the most sections. Documents that already have that many (or
    /// more) are returned unchanged.
    pub fn normalize(&self, documents: &[SectionedDocument]) -> Vec<SectionedDocument> {
        let target = match documents
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.sections()
                    .len()
                    .cmp(&b.sections().len())
                    .then(ib.cmp(ia))
            }) {
            Some((_, target)) => target,
            None => return Vec::new(),
        };
        let target_count = target.sections().len();

        documents
            .iter()
            .enumerate()
            .map(|(idx, document)| {
                if document.sections().len() >= target_count {
                    return document.clone();
                }
                let sections = self.split_to_match(document.sections(), target.sections());
                if sections.len() != target_count {
                    warn!(
                        document = idx,
                        sections = sections.len(),
                        target = target_count,
                        "section count still differs after normalization"
                    );
                } else {
                    debug!(document = idx, target = target_count, "normalized section count");
                }
                document.with_sections(sections)
            })
            .collect()
    }

    fn split_to_match(&self, current: &[Section], target: &[Section]) -> Vec<Section> {
        let current_tokens: Vec<Vec<Token>> =
            current.iter().map(|s| tokenize(&s.body).into_tokens()).collect();
        let target_tokens: Vec<Vec<Token>> =
            target.iter().map(|s| tokenize(&s.body).into_tokens()).collect();

        // (section, token within section) for every token of the concatenation.
        let current_index: Vec<(usize, usize)> = current_tokens
            .iter()
            .enumerate()
            .flat_map(|(s, tokens)| (0..tokens.len()).map(move |t| (s, t)))
            .collect();
        let current_flat: Vec<&str> = current_tokens
            .iter()
            .flatten()
            .map(|t| t.cleaned.as_str())
            .collect();
        let target_flat: Vec<&str> = target_tokens
            .iter()
            .flatten()
            .map(|t| t.cleaned.as_str())
            .collect();

        let mut target_starts = Vec::new();
        let mut offset = 0;
        for tokens in &target_tokens {
            if offset > 0 && !tokens.is_empty() {
                target_starts.push(offset);
            }
            offset += tokens.len();
        }

        let pairs = self.aligner.align_pair(&current_flat, &target_flat);
        let mut cuts: Vec<Vec<usize>> = vec![Vec::new(); current.len()];
        for start in target_starts {
            let Some(position) = pairs.iter().position(|(_, t)| *t == Some(start)) else {
                continue;
            };
            let Some(global) = pairs[position..].iter().find_map(|(c, _)| *c) else {
                continue;
            };
            let (section, local) = current_index[global];
            if local > 0 {
                cuts[section].push(local);
            }
        }

        let mut sections = Vec::new();
        for ((section, tokens), mut locals) in current.iter().zip(&current_tokens).zip(cuts) {
            locals.sort_unstable();
            locals.dedup();
            sections.extend(split_section(section, &locals, tokens));
        }
        for (i, section) in sections.iter_mut().enumerate() {
            section.id = Value::from(i + 1);
        }
        sections
    }
}

fn split_section(section: &Section, cuts: &[usize], tokens: &[Token]) -> Vec<Section> {
    let mut bounds: Vec<usize> = cuts.iter().filter_map(|&k| tokens.get(k)).map(|t| t.start).collect();
    bounds.push(section.body.len());

    let mut pieces = Vec::with_capacity(bounds.len());
    let mut from = 0;
    for to in bounds {
        let body = section.body[from..to].trim();
        let header = if pieces.is_empty() { section.header.clone() } else { None };
        pieces.push(Section::new(Value::Null, header, body));
        from = to;
    }
    pieces
}

/// Re-split sectioned documents so they agree on section count.
///
/// The input is returned unchanged unless every document is sectioned JSON
/// and the counts differ.
pub fn normalize_documents(documents: &[String]) -> Vec<String> {
    let mut parsed = Vec::with_capacity(documents.len());
    for text in documents {
        match DocumentShape::parse(text) {
            DocumentShape::Sectioned(document) => parsed.push(document),
            DocumentShape::FlatText(_) => return documents.to_vec(),
        }
    }
    let counts: Vec<usize> = parsed.iter().map(|d| d.sections().len()).collect();
    if counts.windows(2).all(|w| w[0] == w[1]) {
        return documents.to_vec();
    }

    SectionNormalizer::default()
        .normalize(&parsed)
        .iter()
        .zip(documents)
        .zip(counts)
        .map(|((normalized, text), count)| {
            if normalized.sections().len() == count {
                text.clone()
            } else {
                normalized.render(&[])
            }
        })
        .collect()
}
