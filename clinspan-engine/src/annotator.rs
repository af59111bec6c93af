//! The annotator: text in, resolved annotations out
//!
//! Wires the reference tokenizer, sentencizer, phrase spotters and negation
//! tagger in front of the resolution stage of `clinspan-core`.

use crate::config::{AnnotatorConfig, PipelineOptions};
use crate::error::{EngineError, Result};
use crate::resources::Resources;
use crate::spotting::{NegationPatternSet, NegationTagger, PhraseSpotter};
use crate::text::{DelimiterSentencizer, Sentencizer, SimpleTokenizer, Tokenizer};
use crate::vitals::{detect_vitals, Vitals};
use clinspan_core::{
    negation_index, resolve_demographics, AnnotationResolver, ConceptMap, ConditionHierarchy,
    DemographicHit, DemographicLexicon, DemographicRule, Document, NegatedEntity,
    SectionHeaderMap, SectionSpan, SentenceFacts, SentenceGroup, Span, Summary,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything found in one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Sentence boundaries
    pub sentences: Vec<Span>,
    /// Section partition
    pub sections: Vec<SectionSpan>,
    /// Surviving conditions per sentence
    pub conditions: Vec<SentenceFacts>,
    /// Concept-grouped condition summary
    pub condition_summary: Summary,
    /// Demographic hits per sentence
    pub demographics: Vec<SentenceGroup<DemographicHit>>,
    /// Concept-grouped demographic summary
    pub demographic_summary: Summary,
    /// Age, blood pressure and saturation values, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    /// Conditions removed by negation, when requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub negated: Vec<NegatedEntity>,
}

impl Annotation {
    /// Number of surviving conditions
    pub fn condition_count(&self) -> usize {
        self.conditions.iter().map(|s| s.codes.len()).sum()
    }
}

/// Annotation pipeline over loaded resources
///
/// Immutable once built; share it across threads by reference.
#[derive(Clone)]
pub struct Annotator {
    tokenizer: Arc<dyn Tokenizer>,
    sentencizer: Arc<dyn Sentencizer>,
    sections: Arc<SectionHeaderMap>,
    resolver: Arc<AnnotationResolver>,
    condition_spotter: Arc<PhraseSpotter>,
    demographic_spotter: Arc<PhraseSpotter>,
    lexicon: Arc<DemographicLexicon>,
    negation: Arc<NegationTagger>,
    options: PipelineOptions,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("condition_phrases", &self.condition_spotter.len())
            .field("demographic_concepts", &self.lexicon.len())
            .field("section_headers", &self.sections.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Annotator {
    /// Start building an annotator
    pub fn builder() -> AnnotatorBuilder {
        AnnotatorBuilder::new()
    }

    /// Load a configuration file and every resource it names
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = AnnotatorConfig::from_file(path)?;
        AnnotatorBuilder::from_config(&config)?.build()
    }

    /// Pipeline switches in effect
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The resolution stage
    pub fn resolver(&self) -> &AnnotationResolver {
        &self.resolver
    }

    /// Annotate one document
    pub fn annotate(&self, text: &str) -> Result<Annotation> {
        let tokens = self.tokenizer.tokenize(text);
        let sentences = self.sentencizer.sentences(text, &tokens);
        let document = Document::new(text, tokens, sentences)?;
        Ok(self.annotate_document(&document))
    }

    /// Annotate an already tokenized and sentence-split document
    pub fn annotate_document(&self, document: &Document) -> Annotation {
        let text = document.text();
        let tokens = document.tokens();
        let sentences = document.sentences();

        let sections = self.sections.resolve(text);
        let negation = negation_index(sentences, &self.negation.find(tokens));

        let hits = self.condition_spotter.find(text, tokens);
        let mut conditions = self.resolver.resolve_conditions(sentences, &sections, &hits, &negation);

        let demographic_hits = self.demographic_spotter.find(text, tokens);
        let demographics = resolve_demographics(
            &self.lexicon,
            sentences,
            &demographic_hits,
            self.options.negate_demographics.then_some(&negation),
        );

        let vitals = self.options.detect_vitals.then(|| {
            let spans: Vec<Span> = conditions
                .groups
                .iter()
                .flat_map(|g| g.items.iter().flat_map(|e| e.token_spans()))
                .collect();
            detect_vitals(text, tokens, sentences, &spans)
        });

        if !self.options.keep_negated {
            conditions.negated.clear();
        }

        log::debug!(
            "annotated {} bytes: {} sentence(s), {} section(s), {} scope(s)",
            text.len(),
            sentences.len(),
            sections.len(),
            negation.len()
        );

        Annotation {
            sentences: sentences.to_vec(),
            sections,
            conditions: conditions.facts,
            condition_summary: conditions.summary,
            demographics: demographics.groups,
            demographic_summary: demographics.summary,
            vitals,
            negated: conditions.negated,
        }
    }

    /// Annotate many documents, in parallel when the `parallel` feature is
    /// enabled. Results keep input order.
    pub fn annotate_batch<S>(&self, texts: &[S]) -> Vec<Result<Annotation>>
    where
        S: AsRef<str> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            texts.par_iter().map(|text| self.annotate(text.as_ref())).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            texts.iter().map(|text| self.annotate(text.as_ref())).collect()
        }
    }
}

/// Builder for [`Annotator`]
pub struct AnnotatorBuilder {
    hierarchy: Option<ConditionHierarchy>,
    concepts: ConceptMap,
    sections: SectionHeaderMap,
    demographic_rules: Vec<DemographicRule>,
    negation_patterns: Option<NegationPatternSet>,
    tokenizer: Arc<dyn Tokenizer>,
    sentencizer: Arc<dyn Sentencizer>,
    options: PipelineOptions,
}

impl Default for AnnotatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotatorBuilder {
    /// Create a builder with the reference text tools and default options
    pub fn new() -> Self {
        Self {
            hierarchy: None,
            concepts: ConceptMap::new(),
            sections: SectionHeaderMap::empty(),
            demographic_rules: Vec::new(),
            negation_patterns: None,
            tokenizer: Arc::new(SimpleTokenizer),
            sentencizer: Arc::new(DelimiterSentencizer::default()),
            options: PipelineOptions::default(),
        }
    }

    /// Builder preloaded with every resource `config` names
    pub fn from_config(config: &AnnotatorConfig) -> Result<Self> {
        let resources = Resources::load(&config.resources)?;
        Ok(Self::new().resources(resources).options(config.pipeline.clone()))
    }

    /// Use a full set of loaded resources
    pub fn resources(self, resources: Resources) -> Self {
        self.hierarchy(resources.hierarchy)
            .concepts(resources.concepts)
            .sections(resources.sections)
            .demographic_rules(resources.demographic_rules)
            .negation_patterns(resources.negation_patterns)
    }

    /// Set the condition knowledge base (required)
    pub fn hierarchy(mut self, hierarchy: ConditionHierarchy) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    /// Set concept display names
    pub fn concepts(mut self, concepts: ConceptMap) -> Self {
        self.concepts = concepts;
        self
    }

    /// Set the section header map
    pub fn sections(mut self, sections: SectionHeaderMap) -> Self {
        self.sections = sections;
        self
    }

    /// Set demographic rules
    pub fn demographic_rules(mut self, rules: Vec<DemographicRule>) -> Self {
        self.demographic_rules = rules;
        self
    }

    /// Replace the built-in negation patterns
    pub fn negation_patterns(mut self, patterns: NegationPatternSet) -> Self {
        self.negation_patterns = Some(patterns);
        self
    }

    /// Replace the tokenizer
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Replace the sentencizer
    pub fn sentencizer(mut self, sentencizer: impl Sentencizer + 'static) -> Self {
        self.sentencizer = Arc::new(sentencizer);
        self
    }

    /// Set every pipeline switch at once
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the ignored section types
    pub fn ignored_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.ignored_sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// Drop demographic hits inside negation scopes
    pub fn negate_demographics(mut self, enabled: bool) -> Self {
        self.options.negate_demographics = enabled;
        self
    }

    /// Run the vital-sign detectors
    pub fn detect_vitals(mut self, enabled: bool) -> Self {
        self.options.detect_vitals = enabled;
        self
    }

    /// Report negated conditions
    pub fn keep_negated(mut self, enabled: bool) -> Self {
        self.options.keep_negated = enabled;
        self
    }

    /// Build the annotator
    pub fn build(self) -> Result<Annotator> {
        let hierarchy = self
            .hierarchy
            .ok_or(EngineError::MissingResource("condition knowledge base"))?;
        let negation_patterns = match self.negation_patterns {
            Some(patterns) => patterns,
            None => NegationPatternSet::builtin()?,
        };

        let condition_spotter = PhraseSpotter::new(hierarchy.vocabulary(), self.tokenizer.as_ref());
        let lexicon = DemographicLexicon::from_rules(self.demographic_rules, &self.concepts);
        let demographic_spotter = PhraseSpotter::new(lexicon.vocabulary(), self.tokenizer.as_ref());

        log::info!(
            "annotator ready: {} condition phrase(s), {} demographic concept(s), {} negation pattern(s)",
            condition_spotter.len(),
            lexicon.len(),
            negation_patterns.len()
        );

        let resolver = AnnotationResolver::new(hierarchy, self.concepts)
            .with_ignored_sections(self.options.ignored_sections.iter().cloned());

        Ok(Annotator {
            tokenizer: self.tokenizer,
            sentencizer: self.sentencizer,
            sections: Arc::new(self.sections),
            resolver: Arc::new(resolver),
            condition_spotter: Arc::new(condition_spotter),
            demographic_spotter: Arc::new(demographic_spotter),
            lexicon: Arc::new(lexicon),
            negation: Arc::new(NegationTagger::new(negation_patterns)),
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinspan_core::HierarchyEntry;

    fn annotator() -> AnnotatorBuilder {
        let hierarchy = ConditionHierarchy::from_entries(vec![
            HierarchyEntry::new("S1", 320128, 1, "hypertension"),
            HierarchyEntry::new("S1", 320128, 2, "essential"),
            HierarchyEntry::new("S2", 77670, 1, "chest pain"),
        ])
        .unwrap();
        let concepts: ConceptMap = vec![
            (320128, "Essential hypertension".to_string()),
            (77670, "Chest pain".to_string()),
        ]
        .into_iter()
        .collect();
        Annotator::builder().hierarchy(hierarchy).concepts(concepts)
    }

    #[test]
    fn test_build_requires_knowledge_base() {
        let err = Annotator::builder().build().unwrap_err();
        assert!(matches!(err, EngineError::MissingResource(_)));
    }

    #[test]
    fn test_annotate_resolves_and_negates() {
        let annotator = annotator().keep_negated(true).build().unwrap();
        let annotation = annotator
            .annotate("Essential hypertension noted. Denies chest pain.")
            .unwrap();

        assert_eq!(annotation.sentences.len(), 2);
        assert_eq!(annotation.condition_count(), 1);
        assert_eq!(annotation.conditions[0].codes[0].triggers, "Essential, hypertension");
        assert_eq!(annotation.negated.len(), 1);
        assert_eq!(annotation.negated[0].entity.tag, "Chest pain");
        assert!(annotation.vitals.is_none());
    }

    #[test]
    fn test_negated_hidden_by_default() {
        let annotator = annotator().build().unwrap();
        let annotation = annotator.annotate("No chest pain.").unwrap();
        assert_eq!(annotation.condition_count(), 0);
        assert!(annotation.negated.is_empty());
    }

    #[test]
    fn test_negation_stays_in_sentence() {
        // "is ... negative" matches across three sentences
        let hierarchy = ConditionHierarchy::from_entries(vec![
            HierarchyEntry::new("S1", 254761, 1, "cough"),
            HierarchyEntry::new("S2", 437663, 1, "fever"),
        ])
        .unwrap();
        let annotator = Annotator::builder()
            .hierarchy(hierarchy)
            .keep_negated(true)
            .build()
            .unwrap();
        let annotation = annotator.annotate("Fever is resolved. Cough. Negative for flu.").unwrap();

        assert_eq!(annotation.sentences.len(), 3);
        let kept: Vec<i64> = annotation
            .conditions
            .iter()
            .flat_map(|s| s.codes.iter().map(|c| c.concept_id))
            .collect();
        assert_eq!(kept, vec![254761]);
        assert_eq!(annotation.negated.len(), 1);
        assert_eq!(annotation.negated[0].entity.concept_id, 437663);
    }

    #[test]
    fn test_batch_keeps_order() {
        let annotator = annotator().build().unwrap();
        let results = annotator.annotate_batch(&["chest pain", "", "hypertension"]);
        let counts: Vec<_> = results.into_iter().map(|r| r.unwrap().condition_count()).collect();
        assert_eq!(counts, vec![1, 0, 1]);
    }
}
